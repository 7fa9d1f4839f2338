use log::debug;

use crate::config::LayoutThresholds;
use crate::model::{DetectedLine, TextBlock};

/// Resolves the X position of the column divider.
///
/// A drawn divider always wins. Without one, the widest whitespace gap
/// between text midpoints near the center of the card is taken, provided it
/// is wide enough to be a real column gap.
pub fn resolve_divider(
    blocks: &[TextBlock],
    geometric: Option<&DetectedLine>,
    t: &LayoutThresholds,
) -> Option<f64> {
    if let Some(line) = geometric {
        debug!("Using drawn divider at x={:.3}", line.position());
        return Some(line.position());
    }

    let guess = divider_from_text_gap(blocks, t);
    match guess {
        Some(x) => debug!("Guessed divider from text gap at x={:.3}", x),
        None => debug!("No divider found; single column or default split"),
    }
    guess
}

fn divider_from_text_gap(blocks: &[TextBlock], t: &LayoutThresholds) -> Option<f64> {
    if blocks.len() < t.gap_min_blocks {
        return None;
    }

    let mut midpoints: Vec<f64> = blocks.iter().map(|b| b.bounding_box.mid_x()).collect();
    midpoints.sort_by(f64::total_cmp);

    let mut widest: Option<(f64, f64)> = None;
    for pair in midpoints.windows(2) {
        let gap = pair[1] - pair[0];
        let center = (pair[0] + pair[1]) / 2.0;
        if center <= t.gap_min_x || center >= t.gap_max_x {
            continue;
        }
        if widest.map_or(true, |(w, _)| gap > w) {
            widest = Some((gap, center));
        }
    }

    widest
        .filter(|(gap, _)| *gap > t.gap_min_width)
        .map(|(_, center)| center)
}
