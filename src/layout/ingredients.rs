use log::debug;

use super::keywords::{is_metadata_text, looks_like_ingredient};
use crate::config::LayoutThresholds;
use crate::model::TextBlock;

/// Picks ingredient lines straight from the text when segmentation found no
/// ingredients section.
///
/// Ingredients must sit below every metadata line. A first pass keeps short
/// lines that read like quantities; if that finds too few, any line in the
/// middle of the card is accepted as well. Blocks come back in ingestion
/// order.
pub fn select_ingredient_blocks(blocks: &[TextBlock], t: &LayoutThresholds) -> Vec<TextBlock> {
    let is_metadata: Vec<bool> = blocks.iter().map(|b| is_metadata_text(b.text())).collect();

    let metadata_floor = blocks
        .iter()
        .zip(&is_metadata)
        .filter(|(_, meta)| **meta)
        .map(|(b, _)| b.bounding_box.min_y())
        .min_by(f64::total_cmp);

    let below_metadata =
        |b: &TextBlock| metadata_floor.map_or(true, |floor| b.bounding_box.max_y() < floor);

    let mut selected = vec![false; blocks.len()];
    for (i, block) in blocks.iter().enumerate() {
        if is_metadata[i] {
            continue;
        }
        let mid_y = block.bounding_box.mid_y();
        let text = block.text();
        selected[i] = mid_y >= t.ingredient_min_y
            && mid_y <= t.ingredient_max_y
            && below_metadata(block)
            && looks_like_ingredient(text)
            && text.chars().count() < t.ingredient_max_chars;
    }

    let matched = selected.iter().filter(|s| **s).count();
    if matched < t.ingredient_min_candidates {
        debug!("Only {} pattern matches, widening ingredient search", matched);
        for (i, block) in blocks.iter().enumerate() {
            if selected[i] || is_metadata[i] {
                continue;
            }
            let mid_y = block.bounding_box.mid_y();
            selected[i] =
                mid_y >= t.widened_min_y && mid_y <= t.widened_max_y && below_metadata(block);
        }
    }

    let ingredients: Vec<TextBlock> = blocks
        .iter()
        .zip(&selected)
        .filter(|(_, s)| **s)
        .map(|(b, _)| b.clone())
        .collect();

    debug!(
        "Heuristic selected {} ingredient blocks (metadata floor {:?})",
        ingredients.len(),
        metadata_floor
    );

    ingredients
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, RecognizedText};

    fn block(index: usize, text: &str, mid_y: f64) -> TextBlock {
        TextBlock::from_recognized(
            index,
            RecognizedText::new(BoundingBox::new(0.1, mid_y - 0.01, 0.3, 0.02), text, 0.9),
        )
    }

    fn texts(blocks: &[TextBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.text()).collect()
    }

    #[test]
    fn test_pattern_pass() {
        let blocks = vec![
            block(0, "2 cups flour", 0.7),
            block(1, "½ tsp salt", 0.65),
            block(2, "3 eggs", 0.6),
            block(3, "1 lb butter", 0.55),
            block(4, "onion, chopped", 0.5),
            block(5, "Preheat the oven", 0.45),
            // Outside the band
            block(6, "12 servings of fun", 0.95),
            block(7, "4 hours", 0.1),
        ];

        let selected = select_ingredient_blocks(&blocks, &LayoutThresholds::default());
        assert_eq!(
            texts(&selected),
            vec!["2 cups flour", "½ tsp salt", "3 eggs", "1 lb butter", "onion, chopped"]
        );
    }

    #[test]
    fn test_long_lines_are_not_ingredients() {
        let blocks = vec![
            block(0, "2 cups flour", 0.7),
            block(1, "3 eggs", 0.68),
            block(2, "1 cup milk", 0.66),
            block(3, "2 tbsp sugar", 0.64),
            block(4, "1 tsp vanilla", 0.62),
            block(5, "Mix 2 cups of the flour with the eggs first", 0.6),
        ];

        let selected = select_ingredient_blocks(&blocks, &LayoutThresholds::default());
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|b| b.index != 5));
    }

    #[test]
    fn test_ingredients_must_be_below_metadata() {
        let blocks = vec![
            block(0, "Serves 6", 0.6),
            block(1, "2 apples", 0.7),
            block(2, "1 cup sugar", 0.5),
            block(3, "3 eggs", 0.45),
            block(4, "2 tbsp butter", 0.42),
            block(5, "1 lemon", 0.41),
            block(6, "4 oz cream", 0.35),
        ];

        let selected = select_ingredient_blocks(&blocks, &LayoutThresholds::default());
        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|b| b.index != 0 && b.index != 1));
    }

    #[test]
    fn test_widening_pass_adds_plain_lines() {
        let blocks = vec![
            block(0, "2 eggs", 0.7),
            block(1, "butter", 0.6),
            block(2, "salt and pepper", 0.5),
            // Widened band is 0.4..=0.85
            block(3, "parsley", 0.35),
            block(4, "Cook time 10 min", 0.88),
        ];

        let selected = select_ingredient_blocks(&blocks, &LayoutThresholds::default());
        assert_eq!(texts(&selected), vec!["2 eggs", "butter", "salt and pepper"]);
    }

    #[test]
    fn test_no_duplicates_after_widening() {
        let blocks = vec![block(0, "2 eggs", 0.6), block(1, "1 cup milk", 0.5)];
        let selected = select_ingredient_blocks(&blocks, &LayoutThresholds::default());
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(select_ingredient_blocks(&[], &LayoutThresholds::default()).is_empty());
    }
}
