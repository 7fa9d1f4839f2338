use log::debug;

use crate::config::LayoutThresholds;
use crate::model::{BoundingBox, DetectedLine, LineCandidate, Orientation, Point};

/// Ruled lines found on the card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedLines {
    /// Horizontal rules, topmost first
    pub horizontal: Vec<DetectedLine>,
    /// The most confident vertical divider, if any candidate qualified
    pub divider: Option<DetectedLine>,
}

/// Sorts raw line candidates into horizontal rules and a column divider.
///
/// Candidates matching neither shape are dropped. An empty input yields an
/// empty result.
pub fn classify_lines(candidates: &[LineCandidate], t: &LayoutThresholds) -> ClassifiedLines {
    let mut horizontal: Vec<DetectedLine> = candidates
        .iter()
        .filter(|c| is_horizontal(&c.bounding_box, t))
        .map(horizontal_midline)
        .collect();

    // Stable, so equal Y keeps detection order
    horizontal.sort_by(|a, b| b.position().total_cmp(&a.position()));

    let mut divider: Option<DetectedLine> = None;
    for candidate in candidates
        .iter()
        .filter(|c| is_divider(&c.bounding_box, t))
    {
        // Strictly greater, so the first of equally confident candidates wins
        if divider.map_or(true, |d| candidate.confidence > d.confidence) {
            divider = Some(vertical_midline(candidate));
        }
    }

    debug!(
        "Classified {} candidates: {} horizontal, divider {:?}",
        candidates.len(),
        horizontal.len(),
        divider.map(|d| d.position())
    );

    ClassifiedLines {
        horizontal,
        divider,
    }
}

fn is_horizontal(b: &BoundingBox, t: &LayoutThresholds) -> bool {
    b.aspect_ratio() > t.horizontal_min_aspect_ratio && b.width > t.horizontal_min_width
}

fn is_divider(b: &BoundingBox, t: &LayoutThresholds) -> bool {
    let mid_x = b.mid_x();
    b.aspect_ratio() < t.vertical_max_aspect_ratio
        && b.height > t.vertical_min_height
        && mid_x > t.divider_min_x
        && mid_x < t.divider_max_x
}

fn horizontal_midline(c: &LineCandidate) -> DetectedLine {
    let b = &c.bounding_box;
    let y = b.mid_y();
    DetectedLine {
        start: Point { x: b.min_x(), y },
        end: Point { x: b.max_x(), y },
        orientation: Orientation::Horizontal,
        confidence: c.confidence,
    }
}

fn vertical_midline(c: &LineCandidate) -> DetectedLine {
    let b = &c.bounding_box;
    let x = b.mid_x();
    DetectedLine {
        start: Point { x, y: b.min_y() },
        end: Point { x, y: b.max_y() },
        orientation: Orientation::Vertical,
        confidence: c.confidence,
    }
}
