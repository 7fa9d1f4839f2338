use std::collections::HashSet;

use log::debug;

use super::keywords::is_metadata_text;
use crate::config::LayoutThresholds;
use crate::model::{DetectedLine, Section, SectionType, TextBlock};

/// Partitions the card's text into sections using its horizontal rules.
///
/// `horizontal` must be ordered topmost first, as returned by
/// [`classify_lines`](super::lines::classify_lines). Sections come out in
/// reading order (title, metadata, ingredients, instructions) and empty ones
/// are never emitted. Rules beyond the top two are not used.
pub fn segment_sections(
    blocks: &[TextBlock],
    horizontal: &[DetectedLine],
    t: &LayoutThresholds,
) -> Vec<Section> {
    let sections = match horizontal {
        [] => segment_by_bands(blocks, t),
        [rule] => segment_below_header(blocks, rule.position(), t),
        [first, second, ..] => {
            let upper = first.position().max(second.position());
            let lower = first.position().min(second.position());
            segment_between_rules(blocks, upper, lower, t)
        }
    };

    debug!(
        "Segmented {} blocks into sections {:?}",
        blocks.len(),
        sections
            .iter()
            .map(|s| (s.section_type, s.blocks.len()))
            .collect::<Vec<_>>()
    );

    sections
}

/// No rules at all: fixed vertical bands
fn segment_by_bands(blocks: &[TextBlock], t: &LayoutThresholds) -> Vec<Section> {
    let mut title = Vec::new();
    let mut ingredients = Vec::new();
    let mut instructions = Vec::new();

    for block in blocks {
        let mid_y = block.bounding_box.mid_y();
        if mid_y > t.title_band_min_y {
            title.push(block.clone());
        } else if mid_y >= t.instructions_band_max_y {
            ingredients.push(block.clone());
        } else {
            instructions.push(block.clone());
        }
    }

    [
        Section::from_blocks(SectionType::Title, title),
        Section::from_blocks(SectionType::Ingredients, ingredients),
        Section::from_blocks(SectionType::Instructions, instructions),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// One rule: it closes the header of the card. No title is produced; the
/// header's topmost cluster is tested for metadata and everything else on
/// the card is an ingredient candidate.
fn segment_below_header(blocks: &[TextBlock], rule_y: f64, t: &LayoutThresholds) -> Vec<Section> {
    let candidates: Vec<&TextBlock> = blocks.iter().collect();
    let header: Vec<&TextBlock> = blocks
        .iter()
        .filter(|b| b.bounding_box.max_y() > rule_y)
        .collect();

    let metadata = if header.is_empty() {
        metadata_cluster(&candidates, t)
    } else {
        metadata_cluster(&header, t)
    };

    split_metadata(candidates, &metadata)
}

/// Two rules: title above the upper one, ingredients between, instructions
/// below the lower one.
fn segment_between_rules(
    blocks: &[TextBlock],
    upper_y: f64,
    lower_y: f64,
    t: &LayoutThresholds,
) -> Vec<Section> {
    let title: Vec<TextBlock> = blocks
        .iter()
        .filter(|b| b.bounding_box.min_y() > upper_y)
        .cloned()
        .collect();

    let candidates: Vec<&TextBlock> = blocks
        .iter()
        .filter(|b| {
            let mid_y = b.bounding_box.mid_y();
            mid_y > lower_y && mid_y < upper_y
        })
        .collect();

    let instructions: Vec<TextBlock> = blocks
        .iter()
        .filter(|b| b.bounding_box.max_y() < lower_y)
        .cloned()
        .collect();

    let metadata = metadata_cluster(&candidates, t);

    let mut sections: Vec<Section> = Section::from_blocks(SectionType::Title, title)
        .into_iter()
        .collect();
    sections.extend(split_metadata(candidates, &metadata));
    sections.extend(Section::from_blocks(SectionType::Instructions, instructions));
    sections
}

/// Indices of the topmost Y-cluster of `candidates` if any block in it is a
/// metadata line, otherwise empty.
fn metadata_cluster(candidates: &[&TextBlock], t: &LayoutThresholds) -> HashSet<usize> {
    let Some(top) = candidates
        .iter()
        .map(|b| b.bounding_box.max_y())
        .max_by(f64::total_cmp)
    else {
        return HashSet::new();
    };

    let cluster: Vec<&&TextBlock> = candidates
        .iter()
        .filter(|b| top - b.bounding_box.max_y() <= t.metadata_cluster_tolerance)
        .collect();

    if cluster.iter().any(|b| is_metadata_text(b.text())) {
        cluster.iter().map(|b| b.index).collect()
    } else {
        HashSet::new()
    }
}

/// Emits a metadata section for the blocks in `metadata` and an ingredients
/// section for the rest.
fn split_metadata(candidates: Vec<&TextBlock>, metadata: &HashSet<usize>) -> Vec<Section> {
    let (meta, ingredients): (Vec<&TextBlock>, Vec<&TextBlock>) = candidates
        .into_iter()
        .partition(|b| metadata.contains(&b.index));

    [
        Section::from_blocks(SectionType::Metadata, meta.into_iter().cloned().collect()),
        Section::from_blocks(
            SectionType::Ingredients,
            ingredients.into_iter().cloned().collect(),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
