mod google_vision;
mod precomputed;

pub use google_vision::GoogleVisionDetector;
pub use precomputed::PrecomputedRectangles;

use async_trait::async_trait;
use image::DynamicImage;
use log::warn;

use crate::config::RectangleConstraints;
use crate::error::DetectorError;
use crate::model::{LineCandidate, RecognizedText};

/// Turns pixels into recognized strings with unit-normalized boxes
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Get the detector name (e.g., "google_vision")
    fn detector_name(&self) -> &str;

    /// Recognize the text on `image`. Every returned block must carry at
    /// least one candidate string.
    async fn detect_text(&self, image: &DynamicImage)
        -> Result<Vec<RecognizedText>, DetectorError>;
}

/// Finds rectangles and contours that may be ruled lines
#[async_trait]
pub trait RectangleDetector: Send + Sync {
    /// Get the detector name (e.g., "precomputed")
    fn detector_name(&self) -> &str;

    /// Find candidates matching `constraints`. An empty list is a valid answer.
    async fn detect_rectangles(
        &self,
        image: &DynamicImage,
        constraints: &RectangleConstraints,
    ) -> Result<Vec<LineCandidate>, DetectorError>;
}

/// Outcome of an optional line detection pass
#[derive(Debug)]
pub enum LineDetection {
    /// The detector ran; the list may be empty
    Found(Vec<LineCandidate>),
    /// The detector ran and failed
    Failed(DetectorError),
    /// No detector is configured
    Skipped,
}

impl LineDetection {
    pub fn from_result(result: Result<Vec<LineCandidate>, DetectorError>) -> Self {
        match result {
            Ok(candidates) => LineDetection::Found(candidates),
            Err(e) => LineDetection::Failed(e),
        }
    }

    /// Collapses the outcome to a candidate list; failures become empty
    pub fn into_candidates(self, pass: &str) -> Vec<LineCandidate> {
        match self {
            LineDetection::Found(candidates) => candidates,
            LineDetection::Failed(e) => {
                warn!("{} line detection failed, continuing without: {}", pass, e);
                Vec::new()
            }
            LineDetection::Skipped => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    #[test]
    fn test_failed_detection_collapses_to_empty() {
        let outcome = LineDetection::from_result(Err(DetectorError::MissingApiKey));
        assert!(matches!(outcome, LineDetection::Failed(_)));
        assert!(outcome.into_candidates("vertical").is_empty());
    }

    #[test]
    fn test_found_detection_keeps_candidates() {
        let candidate = LineCandidate::new(BoundingBox::new(0.1, 0.5, 0.8, 0.01), 0.9);
        let outcome = LineDetection::from_result(Ok(vec![candidate]));
        assert_eq!(outcome.into_candidates("horizontal"), vec![candidate]);
    }

    #[test]
    fn test_skipped_detection_is_empty() {
        assert!(LineDetection::Skipped.into_candidates("horizontal").is_empty());
    }
}
