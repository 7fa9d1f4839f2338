//! Layout inference for recipe cards.
//!
//! Given the recognized text and the ruled-line candidates of one card, the
//! stages here work out where the sections are, where the column divider
//! sits and which ingredient lines share a row:
//!
//! 1. [`lines`] sorts line candidates into horizontal rules and a divider
//! 2. [`divider`] falls back to a whitespace gap when no divider is drawn
//! 3. [`sections`] splits the text into title, metadata, ingredients and
//!    instructions
//! 4. [`ingredients`] picks ingredient lines by pattern when no ingredients
//!    section emerged
//! 5. [`rows`] groups ingredient lines into rows across both columns
//!
//! All stages are pure functions over data already collected.

pub mod divider;
pub mod ingredients;
pub mod keywords;
pub mod lines;
pub mod rows;
pub mod sections;

use log::info;

use crate::config::LayoutThresholds;
use crate::model::{ImageSize, LineCandidate, RecipeAnalysis, SectionType, TextBlock};

pub use divider::resolve_divider;
pub use ingredients::select_ingredient_blocks;
pub use lines::{classify_lines, ClassifiedLines};
pub use rows::{column_layout, column_of, group_rows, Column};
pub use sections::segment_sections;

/// Runs every layout stage and assembles the result
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    thresholds: LayoutThresholds,
}

impl LayoutEngine {
    pub fn new(thresholds: LayoutThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &LayoutThresholds {
        &self.thresholds
    }

    /// Infers the layout of one card.
    ///
    /// `image_size` is the size the detectors saw, `original_image_size` the
    /// size before any upscaling.
    pub fn analyze(
        &self,
        blocks: Vec<TextBlock>,
        line_candidates: &[LineCandidate],
        image_size: ImageSize,
        original_image_size: ImageSize,
    ) -> RecipeAnalysis {
        let t = &self.thresholds;

        let lines = classify_lines(line_candidates, t);
        let divider_x = resolve_divider(&blocks, lines.divider.as_ref(), t);
        let sections = segment_sections(&blocks, &lines.horizontal, t);
        let layout = column_layout(divider_x, image_size, t);

        let ingredient_blocks = match sections
            .iter()
            .find(|s| s.section_type == SectionType::Ingredients)
        {
            Some(section) => section.blocks.clone(),
            None => select_ingredient_blocks(&blocks, t),
        };

        let ingredient_rows = group_rows(&ingredient_blocks, &layout, t);

        info!(
            "Analyzed card: {} blocks, {} sections, {} ingredient rows, divider {:?}",
            blocks.len(),
            sections.len(),
            ingredient_rows.len(),
            divider_x
        );

        RecipeAnalysis {
            sections,
            column_layout: layout,
            ingredient_rows,
            image_size,
            original_image_size,
        }
    }
}
