//! Unicode character classification.
//!
//! Wraps the Unicode Character Database lookups used by loss analysis:
//! general category (as the standard two-letter code), punctuation class
//! membership and the character's display name.

use serde::{Deserialize, Serialize};
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Name reported for code points without a Unicode name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Classification of a single character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharInfo {
    pub ch: char,
    /// Unicode display name, or [`UNKNOWN_NAME`].
    pub name: String,
    /// Two-letter general category code, e.g. `"Lo"` or `"Ps"`.
    pub category: String,
    /// Member of the tracked punctuation class, see [`is_punctuation_class`].
    pub is_punctuation: bool,
}

/// Two-letter code of a character's general category.
pub fn category_code(c: char) -> &'static str {
    use GeneralCategory::*;
    match c.general_category() {
        UppercaseLetter => "Lu",
        LowercaseLetter => "Ll",
        TitlecaseLetter => "Lt",
        ModifierLetter => "Lm",
        OtherLetter => "Lo",
        NonspacingMark => "Mn",
        SpacingMark => "Mc",
        EnclosingMark => "Me",
        DecimalNumber => "Nd",
        LetterNumber => "Nl",
        OtherNumber => "No",
        ConnectorPunctuation => "Pc",
        DashPunctuation => "Pd",
        OpenPunctuation => "Ps",
        ClosePunctuation => "Pe",
        InitialPunctuation => "Pi",
        FinalPunctuation => "Pf",
        OtherPunctuation => "Po",
        MathSymbol => "Sm",
        CurrencySymbol => "Sc",
        ModifierSymbol => "Sk",
        OtherSymbol => "So",
        SpaceSeparator => "Zs",
        LineSeparator => "Zl",
        ParagraphSeparator => "Zp",
        Control => "Cc",
        Format => "Cf",
        Surrogate => "Cs",
        PrivateUse => "Co",
        _ => "Cn",
    }
}

/// Whether `c` belongs to the tracked punctuation class.
///
/// The class is open, close, initial, final, connector and other
/// punctuation. Dash punctuation (`Pd`) is deliberately not a member.
pub fn is_punctuation_class(c: char) -> bool {
    matches!(
        c.general_category(),
        GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::ConnectorPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Unicode display name of `c`, or [`UNKNOWN_NAME`].
pub fn char_name(c: char) -> String {
    unicode_names2::name(c)
        .map(|n| n.to_string())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Whether the code point is unassigned in the character database.
pub fn is_unassigned(c: char) -> bool {
    c.general_category() == GeneralCategory::Unassigned
}

/// Full classification of `c`.
pub fn classify(c: char) -> CharInfo {
    CharInfo {
        ch: c,
        name: char_name(c),
        category: category_code(c).to_string(),
        is_punctuation: is_punctuation_class(c),
    }
}
