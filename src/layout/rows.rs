use log::debug;

use crate::config::LayoutThresholds;
use crate::model::{BoundingBox, ColumnLayout, ImageSize, IngredientRow, TextBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

/// Column bounds for a resolved divider, or the default split without one
pub fn column_layout(
    divider_x: Option<f64>,
    image_size: ImageSize,
    t: &LayoutThresholds,
) -> ColumnLayout {
    let split = divider_x.unwrap_or(t.default_column_split);
    ColumnLayout {
        divider_x,
        left_column_bounds: BoundingBox::new(0.0, 0.0, split, 1.0),
        right_column_bounds: BoundingBox::new(split, 0.0, 1.0 - split, 1.0),
        image_size,
    }
}

/// Which column a block belongs to, judged by its horizontal midpoint
pub fn column_of(block: &TextBlock, layout: &ColumnLayout, t: &LayoutThresholds) -> Column {
    let split = layout.divider_x.unwrap_or(t.default_column_split);
    if block.bounding_box.mid_x() < split {
        Column::Left
    } else {
        Column::Right
    }
}

/// Groups ingredient blocks into rows spanning both columns.
///
/// Blocks whose vertical midpoints are closer than the row threshold share a
/// row. Rows come out topmost first and each side of a row is in reading
/// order. Every input block lands in exactly one row.
pub fn group_rows(
    blocks: &[TextBlock],
    layout: &ColumnLayout,
    t: &LayoutThresholds,
) -> Vec<IngredientRow> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by(|&a, &b| {
        blocks[b]
            .bounding_box
            .mid_y()
            .total_cmp(&blocks[a].bounding_box.mid_y())
    });

    let average_height =
        blocks.iter().map(|b| b.bounding_box.height).sum::<f64>() / blocks.len() as f64;
    let threshold = (average_height * t.row_height_factor).max(t.min_row_threshold);
    debug!("Row threshold {:.4} over {} blocks", threshold, blocks.len());

    let mut assigned = vec![false; blocks.len()];
    let mut rows = Vec::new();

    for &seed in &order {
        if assigned[seed] {
            continue;
        }
        let seed_y = blocks[seed].bounding_box.mid_y();

        let members: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| {
                !assigned[i] && (blocks[i].bounding_box.mid_y() - seed_y).abs() < threshold
            })
            .collect();
        for &i in &members {
            assigned[i] = true;
        }

        rows.push(build_row(blocks, &members, layout, t));
    }

    rows.sort_by(|a, b| b.y_position.total_cmp(&a.y_position));

    debug!("Grouped ingredients into {} rows", rows.len());
    rows
}

fn build_row(
    blocks: &[TextBlock],
    members: &[usize],
    layout: &ColumnLayout,
    t: &LayoutThresholds,
) -> IngredientRow {
    let bottom = members
        .iter()
        .map(|&i| blocks[i].bounding_box.min_y())
        .fold(f64::INFINITY, f64::min);
    let top = members
        .iter()
        .map(|&i| blocks[i].bounding_box.max_y())
        .fold(f64::NEG_INFINITY, f64::max);

    let (mut left, mut right): (Vec<TextBlock>, Vec<TextBlock>) = members
        .iter()
        .map(|&i| blocks[i].clone())
        .partition(|b| column_of(b, layout, t) == Column::Left);

    left.sort_by(|a, b| a.bounding_box.min_x().total_cmp(&b.bounding_box.min_x()));
    right.sort_by(|a, b| a.bounding_box.min_x().total_cmp(&b.bounding_box.min_x()));

    IngredientRow {
        y_position: bottom,
        height: top - bottom,
        left_column: left,
        right_column: right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecognizedText;
    use std::collections::HashSet;

    fn block(index: usize, text: &str, x: f64, mid_y: f64) -> TextBlock {
        TextBlock::from_recognized(
            index,
            RecognizedText::new(BoundingBox::new(x, mid_y - 0.01, 0.15, 0.02), text, 0.9),
        )
    }

    fn layout(divider: Option<f64>) -> ColumnLayout {
        column_layout(divider, ImageSize::new(1000, 1400), &LayoutThresholds::default())
    }

    #[test]
    fn test_column_bounds_with_divider() {
        let l = layout(Some(0.45));
        assert_eq!(l.left_column_bounds.x, 0.0);
        assert_eq!(l.left_column_bounds.width, 0.45);
        assert_eq!(l.right_column_bounds.x, 0.45);
        assert!((l.right_column_bounds.width - 0.55).abs() < 1e-12);
        assert!((l.right_column_bounds.max_x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_column_bounds_without_divider() {
        let l = layout(None);
        assert!(l.divider_x.is_none());
        assert_eq!(l.left_column_bounds.x, 0.0);
        assert_eq!(l.left_column_bounds.width, 0.6);
        assert_eq!(l.right_column_bounds.x, 0.6);
        assert!((l.right_column_bounds.width - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_column_assignment_default_split() {
        let t = LayoutThresholds::default();
        let l = layout(None);
        // Midpoint 0.575
        assert_eq!(column_of(&block(0, "a", 0.5, 0.5), &l, &t), Column::Left);
        // Midpoint 0.625
        assert_eq!(column_of(&block(1, "b", 0.55, 0.5), &l, &t), Column::Right);
    }

    #[test]
    fn test_two_rows_two_columns() {
        let blocks = vec![
            block(0, "1 cup flour", 0.1, 0.4),
            block(1, "2 eggs", 0.6, 0.402),
            block(2, "1 tsp salt", 0.1, 0.6),
            block(3, "3 tbsp oil", 0.6, 0.598),
        ];

        let rows = group_rows(&blocks, &layout(Some(0.5)), &LayoutThresholds::default());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].left_text(), "1 tsp salt");
        assert_eq!(rows[0].right_text(), "3 tbsp oil");
        assert_eq!(rows[1].left_text(), "1 cup flour");
        assert_eq!(rows[1].right_text(), "2 eggs");
        assert!(rows[0].y_position > rows[1].y_position);
    }

    #[test]
    fn test_row_geometry() {
        let blocks = vec![
            TextBlock::from_recognized(
                0,
                RecognizedText::new(BoundingBox::new(0.1, 0.50, 0.2, 0.03), "a", 0.9),
            ),
            TextBlock::from_recognized(
                1,
                RecognizedText::new(BoundingBox::new(0.6, 0.49, 0.2, 0.02), "b", 0.9),
            ),
        ];

        let rows = group_rows(&blocks, &layout(Some(0.5)), &LayoutThresholds::default());
        assert_eq!(rows.len(), 1);
        assert!((rows[0].y_position - 0.49).abs() < 1e-9);
        assert!((rows[0].height - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_sides_sorted_left_to_right() {
        let blocks = vec![
            block(0, "flour", 0.3, 0.5),
            block(1, "2 cups", 0.05, 0.5),
            block(2, "sugar", 0.8, 0.5),
            block(3, "1 cup", 0.55, 0.5),
        ];

        let rows = group_rows(&blocks, &layout(Some(0.5)), &LayoutThresholds::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].left_text(), "2 cups flour");
        assert_eq!(rows[0].right_text(), "1 cup sugar");
    }

    #[test]
    fn test_minimum_threshold_for_tiny_text() {
        // Average height 0.002, so the 0.015 floor applies
        let blocks = vec![
            TextBlock::from_recognized(
                0,
                RecognizedText::new(BoundingBox::new(0.1, 0.500, 0.1, 0.002), "a", 0.9),
            ),
            TextBlock::from_recognized(
                1,
                RecognizedText::new(BoundingBox::new(0.1, 0.510, 0.1, 0.002), "b", 0.9),
            ),
            TextBlock::from_recognized(
                2,
                RecognizedText::new(BoundingBox::new(0.1, 0.530, 0.1, 0.002), "c", 0.9),
            ),
        ];

        let rows = group_rows(&blocks, &layout(None), &LayoutThresholds::default());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].left_text(), "c");
        assert_eq!(rows[1].block_count(), 2);
    }

    #[test]
    fn test_every_block_in_exactly_one_row() {
        let mut blocks = Vec::new();
        for i in 0..12 {
            let x = if i % 2 == 0 { 0.1 } else { 0.6 };
            let y = 0.8 - (i / 2) as f64 * 0.05 + (i % 3) as f64 * 0.004;
            blocks.push(block(i, &format!("{} g item", i), x, y));
        }

        let rows = group_rows(&blocks, &layout(None), &LayoutThresholds::default());

        let mut seen = HashSet::new();
        for row in &rows {
            for b in row.left_column.iter().chain(&row.right_column) {
                assert!(seen.insert(b.index), "block {} appears twice", b.index);
            }
        }
        assert_eq!(seen.len(), blocks.len());

        for pair in rows.windows(2) {
            assert!(pair[0].y_position >= pair[1].y_position);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_rows(&[], &layout(None), &LayoutThresholds::default()).is_empty());
    }
}
