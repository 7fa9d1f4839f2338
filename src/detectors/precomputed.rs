use async_trait::async_trait;
use image::DynamicImage;
use log::debug;
use serde::Deserialize;
use std::path::Path;

use super::RectangleDetector;
use crate::config::RectangleConstraints;
use crate::error::DetectorError;
use crate::model::{BoundingBox, LineCandidate};

/// Line candidates detected ahead of time, e.g. by a platform shape detector
/// on the device, and handed over as JSON.
///
/// The file is an array of `{"x", "y", "width", "height", "confidence"}`
/// objects in unit-normalized bottom-left-origin coordinates.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedRectangles {
    candidates: Vec<LineCandidate>,
}

#[derive(Debug, Deserialize)]
struct RawCandidate {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl PrecomputedRectangles {
    pub fn new(candidates: Vec<LineCandidate>) -> Self {
        Self { candidates }
    }

    pub fn from_json(json: &str) -> Result<Self, DetectorError> {
        let raw: Vec<RawCandidate> = serde_json::from_str(json)?;
        Ok(Self::new(
            raw.into_iter()
                .map(|r| {
                    LineCandidate::new(BoundingBox::new(r.x, r.y, r.width, r.height), r.confidence)
                })
                .collect(),
        ))
    }

    pub async fn from_file(path: &Path) -> Result<Self, DetectorError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

fn satisfies(candidate: &LineCandidate, constraints: &RectangleConstraints) -> bool {
    let b = &candidate.bounding_box;
    let aspect = b.aspect_ratio();
    aspect >= constraints.min_aspect_ratio
        && aspect <= constraints.max_aspect_ratio
        && b.width.max(b.height) >= constraints.min_size
        && candidate.confidence >= constraints.min_confidence
}

#[async_trait]
impl RectangleDetector for PrecomputedRectangles {
    fn detector_name(&self) -> &str {
        "precomputed"
    }

    async fn detect_rectangles(
        &self,
        _image: &DynamicImage,
        constraints: &RectangleConstraints,
    ) -> Result<Vec<LineCandidate>, DetectorError> {
        let mut matching: Vec<LineCandidate> = self
            .candidates
            .iter()
            .filter(|c| satisfies(c, constraints))
            .copied()
            .collect();

        // Most confident first, like a detector capped at max_observations
        matching.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        matching.truncate(constraints.max_observations);

        debug!(
            "{} of {} precomputed candidates match constraints",
            matching.len(),
            self.candidates.len()
        );
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn blank() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
    }

    const CANDIDATES: &str = r#"[
        {"x": 0.05, "y": 0.8, "width": 0.9, "height": 0.01, "confidence": 0.9},
        {"x": 0.495, "y": 0.1, "width": 0.01, "height": 0.6, "confidence": 0.7},
        {"x": 0.2, "y": 0.2, "width": 0.2, "height": 0.2}
    ]"#;

    #[tokio::test]
    async fn test_horizontal_constraints() {
        let detector = PrecomputedRectangles::from_json(CANDIDATES).unwrap();
        let found = detector
            .detect_rectangles(&blank(), &RectangleConstraints::horizontal())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!((found[0].bounding_box.y - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_vertical_constraints() {
        let detector = PrecomputedRectangles::from_json(CANDIDATES).unwrap();
        let found = detector
            .detect_rectangles(&blank(), &RectangleConstraints::vertical())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence, 0.7);
    }

    #[tokio::test]
    async fn test_max_observations_keeps_most_confident() {
        let detector = PrecomputedRectangles::new(vec![
            LineCandidate::new(BoundingBox::new(0.0, 0.2, 0.9, 0.01), 0.3),
            LineCandidate::new(BoundingBox::new(0.0, 0.5, 0.9, 0.01), 0.9),
            LineCandidate::new(BoundingBox::new(0.0, 0.8, 0.9, 0.01), 0.6),
        ]);
        let constraints = RectangleConstraints {
            max_observations: 2,
            ..RectangleConstraints::horizontal()
        };

        let found = detector
            .detect_rectangles(&blank(), &constraints)
            .await
            .unwrap();
        let confidences: Vec<f32> = found.iter().map(|c| c.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.6]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PrecomputedRectangles::from_json("{not json"),
            Err(DetectorError::Json(_))
        ));
    }

    #[test]
    fn test_default_confidence() {
        let detector = PrecomputedRectangles::from_json(CANDIDATES).unwrap();
        assert_eq!(detector.candidates[2].confidence, 1.0);
    }
}
