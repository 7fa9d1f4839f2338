use crate::layout::keywords::matched_metadata_keyword;
use crate::model::{CardRecipe, RecipeAnalysis, SectionType};

impl RecipeAnalysis {
    /// Reads the recipe content off the analyzed layout.
    ///
    /// Ingredients are read down the left column first, then down the right
    /// one. Metadata lines found in the title area are picked up as well.
    pub fn to_recipe(&self) -> CardRecipe {
        let mut title_parts = Vec::new();
        let mut metadata = Vec::new();

        if let Some(section) = self.section(SectionType::Title) {
            for text in section.texts() {
                match metadata_entry(text) {
                    Some(entry) => metadata.push(entry),
                    None => title_parts.push(text.trim()),
                }
            }
        }

        if let Some(section) = self.section(SectionType::Metadata) {
            metadata.extend(section.texts().filter_map(metadata_entry));
        }

        let left = self.ingredient_rows.iter().map(|r| r.left_text());
        let right = self.ingredient_rows.iter().map(|r| r.right_text());
        let ingredients = left.chain(right).filter(|t| !t.is_empty()).collect();

        let instructions = self
            .section(SectionType::Instructions)
            .map(|s| join_words(s.texts()))
            .unwrap_or_default();

        CardRecipe {
            title: join_words(title_parts.into_iter()),
            metadata,
            ingredients,
            instructions,
        }
    }
}

/// Splits a metadata line such as `"Prep time: 15 min"` into a normalised key
/// and the remaining text.
pub fn metadata_entry(text: &str) -> Option<(String, String)> {
    let keyword = matched_metadata_keyword(text)?;

    let key = match keyword {
        "serves" | "serving" => "servings",
        "makes" | "yield" => "yield",
        "preparation time" | "prep time" => "prep time",
        other => other,
    };

    // ASCII lowercasing keeps byte offsets, so `start` indexes `text` too
    let lower = text.to_ascii_lowercase();
    let value = match lower.find(keyword) {
        Some(start) => {
            let mut rest = &text[start + keyword.len()..];
            // "servings" leaves a stray "s" after matching "serving"
            if keyword == "serving" {
                rest = rest.strip_prefix(|c: char| c == 's' || c == 'S').unwrap_or(rest);
            }
            rest.trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-')
        }
        None => text.trim(),
    };

    Some((key.to_string(), value.to_string()))
}

fn join_words<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
