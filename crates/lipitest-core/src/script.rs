//! Script registry and Unicode block table.
//!
//! Maps a script name to the inclusive code point range its characters are
//! expected to occupy. A forward transliteration is considered valid when
//! every non-whitespace character it produced falls inside that range.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Name of the Latin-based source convention.
pub const IAST: &str = "IAST";

/// Inclusive code point range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct UnicodeBlock {
    pub low: u32,
    pub high: u32,
}

impl UnicodeBlock {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, c: char) -> bool {
        (self.low..=self.high).contains(&(c as u32))
    }

    /// True iff `text` is non-empty and every non-whitespace character is in range.
    ///
    /// An empty forward result is never valid, so a failed or silent
    /// transliteration does not count as staying within the block.
    pub fn covers(&self, text: &str) -> bool {
        !text.is_empty()
            && text
                .chars()
                .filter(|c| !c.is_whitespace())
                .all(|c| self.contains(c))
    }
}

impl From<[u32; 2]> for UnicodeBlock {
    fn from([low, high]: [u32; 2]) -> Self {
        Self { low, high }
    }
}

impl From<UnicodeBlock> for [u32; 2] {
    fn from(b: UnicodeBlock) -> Self {
        [b.low, b.high]
    }
}

const BUILTIN_BLOCKS: &[(&str, UnicodeBlock)] = &[
    ("Devanagari", UnicodeBlock::new(0x0900, 0x097F)),
    ("Bengali", UnicodeBlock::new(0x0980, 0x09FF)),
    ("Gurmukhi", UnicodeBlock::new(0x0A00, 0x0A7F)),
    ("Gujarati", UnicodeBlock::new(0x0A80, 0x0AFF)),
    ("Oriya", UnicodeBlock::new(0x0B00, 0x0B7F)),
    ("Tamil", UnicodeBlock::new(0x0B80, 0x0BFF)),
    ("Telugu", UnicodeBlock::new(0x0C00, 0x0C7F)),
    ("Kannada", UnicodeBlock::new(0x0C80, 0x0CFF)),
    ("Malayalam", UnicodeBlock::new(0x0D00, 0x0D7F)),
    ("Sharada", UnicodeBlock::new(0x11180, 0x111DF)),
];

/// Script name → Unicode block lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTable {
    blocks: BTreeMap<String, UnicodeBlock>,
}

impl Default for ScriptTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScriptTable {
    /// The static table of Brahmic blocks.
    pub fn builtin() -> Self {
        Self {
            blocks: BUILTIN_BLOCKS
                .iter()
                .map(|(name, block)| ((*name).to_string(), *block))
                .collect(),
        }
    }

    /// Builtin table with `overrides` merged on top.
    ///
    /// Ranges with `low > high` or beyond the Unicode code space are rejected.
    pub fn with_overrides(overrides: &BTreeMap<String, UnicodeBlock>) -> Result<Self> {
        let mut table = Self::builtin();
        for (name, block) in overrides {
            if block.low > block.high || block.high > 0x10FFFF {
                bail!(
                    "invalid Unicode block for {name}: [{:#X}, {:#X}]",
                    block.low,
                    block.high
                );
            }
            let key = table.canonical_name(name).unwrap_or(name).to_string();
            table.blocks.insert(key, *block);
        }
        Ok(table)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, script: &str) -> Option<UnicodeBlock> {
        self.blocks.get(script).copied().or_else(|| {
            self.blocks
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(script))
                .map(|(_, b)| *b)
        })
    }

    /// Registered spelling of `script`, if known.
    pub fn canonical_name(&self, script: &str) -> Option<&str> {
        self.blocks
            .keys()
            .find(|name| name.eq_ignore_ascii_case(script))
            .map(String::as_str)
    }

    /// Lookup that fails for scripts missing from the table.
    pub fn require(&self, script: &str) -> Result<UnicodeBlock> {
        match self.get(script) {
            Some(block) => Ok(block),
            None => bail!(
                "unknown script '{script}' (known: {})",
                self.names().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }
}
