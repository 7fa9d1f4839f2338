//! Fixed vocabularies used to classify card text.

/// Phrases that mark a servings / timing line rather than an ingredient
pub const METADATA_KEYWORDS: &[&str] = &[
    "makes",
    "yield",
    "serves",
    "serving",
    "preparation time",
    "prep time",
    "cook time",
    "total time",
    "difficulty",
];

const UNIT_WORDS: &[&str] = &[
    "tsp", "tsps", "tbsp", "tbsps", "cup", "cups", "ml", "oz", "lb", "lbs", "kg", "g",
];

const SIZE_AND_PREP_WORDS: &[&str] = &["medium", "large", "small", "chopped", "sliced", "diced"];

const FRACTION_GLYPHS: &[char] = &[
    '½', '⅓', '⅔', '¼', '¾', '⅕', '⅖', '⅗', '⅘', '⅙', '⅚', '⅛', '⅜', '⅝', '⅞',
];

/// Case-insensitive substring match against [`METADATA_KEYWORDS`]
pub fn is_metadata_text(text: &str) -> bool {
    matched_metadata_keyword(text).is_some()
}

/// The first metadata keyword found in `text`
pub fn matched_metadata_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_ascii_lowercase();
    METADATA_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lower.contains(keyword))
}

/// Whether `text` reads like an ingredient quantity: a digit, a fraction
/// glyph, a unit word or a size/prep adjective.
pub fn looks_like_ingredient(text: &str) -> bool {
    if text
        .chars()
        .any(|c| c.is_ascii_digit() || FRACTION_GLYPHS.contains(&c))
    {
        return true;
    }

    // Unit words are matched as whole alphabetic runs so "g" in "egg" doesn't count
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .any(|word| UNIT_WORDS.contains(&word) || SIZE_AND_PREP_WORDS.contains(&word))
}
