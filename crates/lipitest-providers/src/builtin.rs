//! Local IAST ↔ Brahmic converter.
//!
//! The Brahmic blocks from Devanagari to Malayalam share one layout: a
//! letter sits at the same offset from its block start in every script. The
//! converter therefore works on Devanagari offsets and shifts them into the
//! requested block. Offsets a script leaves unassigned (e.g. Bengali has no
//! separate `va`) fail with [`ProviderError::UnmappedCharacter`].

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use tracing::instrument;

use lipitest_core::classify::is_unassigned;
use lipitest_core::error::ProviderError;
use lipitest_core::script::IAST;
use lipitest_core::traits::{TransliterateRequest, TransliterationProvider};

/// Scripts sharing the Devanagari layout, with their block start.
pub const SCRIPT_BASES: &[(&str, u32)] = &[
    ("Devanagari", 0x0900),
    ("Bengali", 0x0980),
    ("Gurmukhi", 0x0A00),
    ("Gujarati", 0x0A80),
    ("Oriya", 0x0B00),
    ("Telugu", 0x0C00),
    ("Kannada", 0x0C80),
    ("Malayalam", 0x0D00),
];

const VIRAMA: u32 = 0x4D;
const DIGIT_ZERO: u32 = 0x66;
const DANDA: char = '\u{0964}';
const DOUBLE_DANDA: char = '\u{0965}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Consonant(u32),
    /// Independent form, and dependent sign (`None` for the inherent `a`).
    Vowel(u32, Option<u32>),
    /// Anusvāra, visarga, candrabindu, avagraha.
    Mark(u32),
    Digit(u32),
    Danda,
    DoubleDanda,
}

/// IAST spellings, precomposed first so they win the reverse lookup.
const IAST_UNITS: &[(&str, Unit)] = &[
    ("a", Unit::Vowel(0x05, None)),
    ("ā", Unit::Vowel(0x06, Some(0x3E))),
    ("i", Unit::Vowel(0x07, Some(0x3F))),
    ("ī", Unit::Vowel(0x08, Some(0x40))),
    ("u", Unit::Vowel(0x09, Some(0x41))),
    ("ū", Unit::Vowel(0x0A, Some(0x42))),
    ("ṛ", Unit::Vowel(0x0B, Some(0x43))),
    ("ṝ", Unit::Vowel(0x60, Some(0x44))),
    ("ḷ", Unit::Vowel(0x0C, Some(0x62))),
    ("ḹ", Unit::Vowel(0x61, Some(0x63))),
    ("e", Unit::Vowel(0x0F, Some(0x47))),
    ("ai", Unit::Vowel(0x10, Some(0x48))),
    ("o", Unit::Vowel(0x13, Some(0x4B))),
    ("au", Unit::Vowel(0x14, Some(0x4C))),
    ("k", Unit::Consonant(0x15)),
    ("kh", Unit::Consonant(0x16)),
    ("g", Unit::Consonant(0x17)),
    ("gh", Unit::Consonant(0x18)),
    ("ṅ", Unit::Consonant(0x19)),
    ("c", Unit::Consonant(0x1A)),
    ("ch", Unit::Consonant(0x1B)),
    ("j", Unit::Consonant(0x1C)),
    ("jh", Unit::Consonant(0x1D)),
    ("ñ", Unit::Consonant(0x1E)),
    ("ṭ", Unit::Consonant(0x1F)),
    ("ṭh", Unit::Consonant(0x20)),
    ("ḍ", Unit::Consonant(0x21)),
    ("ḍh", Unit::Consonant(0x22)),
    ("ṇ", Unit::Consonant(0x23)),
    ("t", Unit::Consonant(0x24)),
    ("th", Unit::Consonant(0x25)),
    ("d", Unit::Consonant(0x26)),
    ("dh", Unit::Consonant(0x27)),
    ("n", Unit::Consonant(0x28)),
    ("p", Unit::Consonant(0x2A)),
    ("ph", Unit::Consonant(0x2B)),
    ("b", Unit::Consonant(0x2C)),
    ("bh", Unit::Consonant(0x2D)),
    ("m", Unit::Consonant(0x2E)),
    ("y", Unit::Consonant(0x2F)),
    ("r", Unit::Consonant(0x30)),
    ("l", Unit::Consonant(0x32)),
    ("v", Unit::Consonant(0x35)),
    ("ś", Unit::Consonant(0x36)),
    ("ṣ", Unit::Consonant(0x37)),
    ("s", Unit::Consonant(0x38)),
    ("h", Unit::Consonant(0x39)),
    ("m̐", Unit::Mark(0x01)),
    ("ṃ", Unit::Mark(0x02)),
    ("ḥ", Unit::Mark(0x03)),
    ("'", Unit::Mark(0x3D)),
    ("0", Unit::Digit(0)),
    ("1", Unit::Digit(1)),
    ("2", Unit::Digit(2)),
    ("3", Unit::Digit(3)),
    ("4", Unit::Digit(4)),
    ("5", Unit::Digit(5)),
    ("6", Unit::Digit(6)),
    ("7", Unit::Digit(7)),
    ("8", Unit::Digit(8)),
    ("9", Unit::Digit(9)),
    ("||", Unit::DoubleDanda),
    ("|", Unit::Danda),
    // decomposed spellings
    ("a\u{304}", Unit::Vowel(0x06, Some(0x3E))),
    ("i\u{304}", Unit::Vowel(0x08, Some(0x40))),
    ("u\u{304}", Unit::Vowel(0x0A, Some(0x42))),
    ("r\u{323}", Unit::Vowel(0x0B, Some(0x43))),
    ("r\u{323}\u{304}", Unit::Vowel(0x60, Some(0x44))),
    ("l\u{323}", Unit::Vowel(0x0C, Some(0x62))),
    ("l\u{323}\u{304}", Unit::Vowel(0x61, Some(0x63))),
    ("n\u{307}", Unit::Consonant(0x19)),
    ("n\u{303}", Unit::Consonant(0x1E)),
    ("t\u{323}", Unit::Consonant(0x1F)),
    ("t\u{323}h", Unit::Consonant(0x20)),
    ("d\u{323}", Unit::Consonant(0x21)),
    ("d\u{323}h", Unit::Consonant(0x22)),
    ("n\u{323}", Unit::Consonant(0x23)),
    ("s\u{301}", Unit::Consonant(0x36)),
    ("s\u{323}", Unit::Consonant(0x37)),
    ("m\u{323}", Unit::Mark(0x02)),
    ("h\u{323}", Unit::Mark(0x03)),
];

/// Spellings ordered longest first for greedy matching.
static GREEDY_UNITS: LazyLock<Vec<(&'static str, Unit)>> = LazyLock::new(|| {
    let mut units = IAST_UNITS.to_vec();
    units.sort_by_key(|(s, _)| std::cmp::Reverse(s.chars().count()));
    units
});

/// What a Devanagari offset decodes to.
#[derive(Debug, Clone, Copy)]
enum Decoded {
    Consonant(&'static str),
    Sign(&'static str),
    Standalone(&'static str),
    Virama,
}

static DECODE: LazyLock<HashMap<u32, Decoded>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert(VIRAMA, Decoded::Virama);
    for &(latin, unit) in IAST_UNITS {
        match unit {
            Unit::Consonant(o) => {
                map.entry(o).or_insert(Decoded::Consonant(latin));
            }
            Unit::Vowel(independent, sign) => {
                map.entry(independent).or_insert(Decoded::Standalone(latin));
                if let Some(s) = sign {
                    map.entry(s).or_insert(Decoded::Sign(latin));
                }
            }
            Unit::Mark(o) => {
                map.entry(o).or_insert(Decoded::Standalone(latin));
            }
            Unit::Digit(_) | Unit::Danda | Unit::DoubleDanda => {}
        }
    }
    map
});

/// Block start for a script sharing the Devanagari layout.
pub fn script_base(script: &str) -> Option<u32> {
    SCRIPT_BASES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(script))
        .map(|(_, base)| *base)
}

fn target_char(base: u32, offset: u32, source: char, script: &str) -> Result<char, ProviderError> {
    char::from_u32(base + offset)
        .filter(|c| !is_unassigned(*c))
        .ok_or_else(|| ProviderError::UnmappedCharacter {
            ch: source,
            script: script.to_string(),
        })
}

fn passes_through(c: char) -> bool {
    c.is_whitespace() || (c.is_ascii_punctuation() && c != '|' && c != '\'')
}

/// Convert IAST text into `script`.
pub fn encode(text: &str, script: &str) -> Result<String, ProviderError> {
    let base = script_base(script).ok_or_else(|| ProviderError::Unsupported {
        system: "builtin".into(),
        source_script: IAST.into(),
        target_script: script.into(),
    })?;
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len() * 3);
    let mut after_consonant = false;
    let mut rest = lower.as_str();

    while let Some(first) = rest.chars().next() {
        let Some((spelling, unit)) = GREEDY_UNITS.iter().find(|(s, _)| rest.starts_with(s)) else {
            if !passes_through(first) {
                return Err(ProviderError::UnmappedCharacter {
                    ch: first,
                    script: script.to_string(),
                });
            }
            if after_consonant {
                out.push(target_char(base, VIRAMA, first, script)?);
                after_consonant = false;
            }
            out.push(first);
            rest = &rest[first.len_utf8()..];
            continue;
        };
        rest = &rest[spelling.len()..];

        match *unit {
            Unit::Consonant(o) => {
                if after_consonant {
                    out.push(target_char(base, VIRAMA, first, script)?);
                }
                out.push(target_char(base, o, first, script)?);
                after_consonant = true;
            }
            Unit::Vowel(independent, sign) => {
                if after_consonant {
                    if let Some(s) = sign {
                        out.push(target_char(base, s, first, script)?);
                    }
                } else {
                    out.push(target_char(base, independent, first, script)?);
                }
                after_consonant = false;
            }
            other => {
                if after_consonant {
                    out.push(target_char(base, VIRAMA, first, script)?);
                    after_consonant = false;
                }
                match other {
                    Unit::Mark(o) => out.push(target_char(base, o, first, script)?),
                    Unit::Digit(d) => out.push(target_char(base, DIGIT_ZERO + d, first, script)?),
                    Unit::Danda => out.push(DANDA),
                    Unit::DoubleDanda => out.push(DOUBLE_DANDA),
                    Unit::Consonant(_) | Unit::Vowel(..) => unreachable!("handled above"),
                }
            }
        }
    }
    if after_consonant {
        let last = text.chars().last().unwrap_or(' ');
        out.push(target_char(base, VIRAMA, last, script)?);
    }
    Ok(out)
}

/// Emit a held consonant with its inherent vowel.
fn flush(out: &mut String, pending: &mut Option<&str>) {
    if let Some(c) = pending.take() {
        out.push_str(c);
        out.push('a');
    }
}

/// Convert text in `script` back into IAST.
pub fn decode(text: &str, script: &str) -> Result<String, ProviderError> {
    let base = script_base(script).ok_or_else(|| ProviderError::Unsupported {
        system: "builtin".into(),
        source_script: script.into(),
        target_script: IAST.into(),
    })?;
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<&str> = None;

    for c in text.chars() {
        // daṇḍas sit inside the Devanagari block but are shared by every script
        if matches!(c, DANDA | DOUBLE_DANDA) {
            flush(&mut out, &mut pending);
            out.push_str(if c == DANDA { "|" } else { "||" });
            continue;
        }
        let code = c as u32;
        if !(base..base + 0x80).contains(&code) {
            flush(&mut out, &mut pending);
            match c {
                c if passes_through(c) => out.push(c),
                c => {
                    return Err(ProviderError::UnmappedCharacter {
                        ch: c,
                        script: IAST.to_string(),
                    })
                }
            }
            continue;
        }

        let offset = code - base;
        if (DIGIT_ZERO..DIGIT_ZERO + 10).contains(&offset) {
            flush(&mut out, &mut pending);
            out.push(char::from(b'0' + (offset - DIGIT_ZERO) as u8));
            continue;
        }
        match DECODE.get(&offset).copied() {
            Some(Decoded::Consonant(latin)) => {
                flush(&mut out, &mut pending);
                pending = Some(latin);
            }
            Some(Decoded::Sign(vowel)) => {
                if let Some(consonant) = pending.take() {
                    out.push_str(consonant);
                }
                out.push_str(vowel);
            }
            Some(Decoded::Virama) => {
                if let Some(consonant) = pending.take() {
                    out.push_str(consonant);
                }
            }
            Some(Decoded::Standalone(latin)) => {
                flush(&mut out, &mut pending);
                out.push_str(latin);
            }
            None => {
                return Err(ProviderError::UnmappedCharacter {
                    ch: c,
                    script: IAST.to_string(),
                })
            }
        }
    }
    flush(&mut out, &mut pending);
    Ok(out)
}

/// Offline provider backed by [`encode`] and [`decode`].
pub struct BuiltinProvider {
    name: String,
}

impl Default for BuiltinProvider {
    fn default() -> Self {
        Self::new("builtin")
    }
}

impl BuiltinProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    fn unsupported(&self, request: &TransliterateRequest) -> ProviderError {
        ProviderError::Unsupported {
            system: self.name.clone(),
            source_script: request.source_script.clone(),
            target_script: request.target_script.clone(),
        }
    }
}

#[async_trait]
impl TransliterationProvider for BuiltinProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_scripts(&self) -> Vec<String> {
        SCRIPT_BASES.iter().map(|(name, _)| name.to_string()).collect()
    }

    #[instrument(skip(self, request), fields(from = %request.source_script, to = %request.target_script))]
    async fn transliterate(&self, request: &TransliterateRequest) -> anyhow::Result<String> {
        let from_iast = request.source_script.eq_ignore_ascii_case(IAST);
        let to_iast = request.target_script.eq_ignore_ascii_case(IAST);
        let result = match (from_iast, to_iast) {
            (true, false) if script_base(&request.target_script).is_some() => {
                encode(&request.text, &request.target_script)
            }
            (false, true) if script_base(&request.source_script).is_some() => {
                decode(&request.text, &request.source_script)
            }
            _ => Err(self.unsupported(request)),
        };
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_sample_words_to_devanagari() {
        assert_eq!(encode("dharmaḥ", "Devanagari").unwrap(), "धर्मः");
        assert_eq!(encode("prajñā", "Devanagari").unwrap(), "प्रज्ञा");
        assert_eq!(encode("śāstra", "Devanagari").unwrap(), "शास्त्र");
        assert_eq!(encode("yogaḥ", "Devanagari").unwrap(), "योगः");
        assert_eq!(encode("rāmaḥ", "Devanagari").unwrap(), "रामः");
    }

    #[test]
    fn diphthongs_aspirates_and_marks() {
        assert_eq!(encode("kaurava", "Devanagari").unwrap(), "कौरव");
        assert_eq!(encode("bhaiṣajya", "Devanagari").unwrap(), "भैषज्य");
        assert_eq!(encode("saṃskṛtam", "Devanagari").unwrap(), "संस्कृतम्");
        assert_eq!(encode("so'ham", "Devanagari").unwrap(), "सोऽहम्");
        assert_eq!(encode("oṃ", "Devanagari").unwrap(), "ओं");
    }

    #[test]
    fn punctuation_digits_and_danda() {
        assert_eq!(encode("rāma 108 |", "Devanagari").unwrap(), "राम १०८ ।");
        assert_eq!(encode("iti ||", "Devanagari").unwrap(), "इति ॥");
        assert_eq!(encode("rāmaḥ, kṛṣṇaḥ", "Devanagari").unwrap(), "रामः, कृष्णः");
    }

    #[test]
    fn decomposed_input_matches_precomposed() {
        assert_eq!(
            encode("ra\u{304}mah\u{323}", "Devanagari").unwrap(),
            encode("rāmaḥ", "Devanagari").unwrap()
        );
    }

    #[test]
    fn shifts_into_other_blocks() {
        assert_eq!(encode("dharmaḥ", "Telugu").unwrap(), "ధర్మః");
        assert_eq!(encode("rāma", "Kannada").unwrap(), "ರಾಮ");
        assert_eq!(encode("yoga", "Gujarati").unwrap(), "યોગ");
    }

    #[test]
    fn unassigned_target_is_an_error() {
        // Bengali has no separate va letter
        let err = encode("veda", "Bengali").unwrap_err();
        assert!(matches!(err, ProviderError::UnmappedCharacter { ch: 'v', .. }));
    }

    #[test]
    fn unknown_latin_letters_are_errors() {
        let err = encode("zebra", "Devanagari").unwrap_err();
        assert!(matches!(err, ProviderError::UnmappedCharacter { ch: 'z', .. }));
    }

    #[test]
    fn decodes_back_to_iast() {
        assert_eq!(decode("धर्मः", "Devanagari").unwrap(), "dharmaḥ");
        assert_eq!(decode("संस्कृतम्", "Devanagari").unwrap(), "saṃskṛtam");
        assert_eq!(decode("सोऽहम् ॥", "Devanagari").unwrap(), "so'ham ||");
        assert_eq!(decode("ధర్మః", "Telugu").unwrap(), "dharmaḥ");
        assert_eq!(decode("१०८", "Devanagari").unwrap(), "108");
    }

    #[test]
    fn dandas_decode_in_every_script() {
        assert_eq!(decode("इति ।", "Devanagari").unwrap(), "iti |");
        assert_eq!(decode("इति॥", "Devanagari").unwrap(), "iti||");
        assert_eq!(decode("ఇతి ॥", "Telugu").unwrap(), "iti ||");
    }

    #[test]
    fn decode_rejects_foreign_letters() {
        let err = decode("धर्मx", "Devanagari").unwrap_err();
        assert!(matches!(err, ProviderError::UnmappedCharacter { ch: 'x', .. }));
        assert!(decode("ধর্ম", "Devanagari").is_err());
    }

    #[test]
    fn sample_corpus_round_trips() {
        for word in ["dharmaḥ", "prajñā", "śāstra", "yogaḥ", "rāmaḥ", "kṛṣṇa", "bhagavadgītā", "iti ||", "iti |"] {
            for (script, _) in SCRIPT_BASES {
                let Ok(native) = encode(word, script) else {
                    continue;
                };
                assert_eq!(decode(&native, script).unwrap(), word, "{word} via {script}");
            }
        }
    }

    #[tokio::test]
    async fn provider_rejects_unsupported_pairs() {
        let provider = BuiltinProvider::default();
        let err = provider
            .transliterate(&TransliterateRequest::new("x", "IAST", "Tamil"))
            .await
            .unwrap_err();
        let err = err.downcast::<ProviderError>().unwrap();
        assert!(matches!(err, ProviderError::Unsupported { .. }));
        assert!(err.is_permanent());

        assert!(provider
            .transliterate(&TransliterateRequest::new("क", "Devanagari", "Telugu"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn provider_converts_both_directions() {
        let provider = BuiltinProvider::default();
        let forward = provider
            .transliterate(&TransliterateRequest::new("yogaḥ", "IAST", "devanagari"))
            .await
            .unwrap();
        assert_eq!(forward, "योगः");
        let back = provider
            .transliterate(&TransliterateRequest::new(forward, "Devanagari", "IAST"))
            .await
            .unwrap();
        assert_eq!(back, "yogaḥ");
        assert_eq!(provider.supported_scripts().len(), 8);
    }
}
