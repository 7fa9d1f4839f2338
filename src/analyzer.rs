use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::config::AnalyzerConfig;
use crate::detectors::{GoogleVisionDetector, LineDetection, RectangleDetector, TextDetector};
use crate::error::AnalysisError;
use crate::layout::LayoutEngine;
use crate::model::{RecipeAnalysis, TextBlock};
use crate::preprocess::{decode, preprocess};

/// Analyzes photographed recipe cards.
///
/// Holds the external detectors and the configuration; cheap to share
/// behind an [`Arc`].
pub struct CardAnalyzer {
    text_detector: Arc<dyn TextDetector>,
    rectangle_detector: Option<Arc<dyn RectangleDetector>>,
    config: AnalyzerConfig,
    engine: LayoutEngine,
}

impl CardAnalyzer {
    /// Creates a new builder for configuring an analyzer
    ///
    /// # Example
    /// ```
    /// use cooklang_card_layout::{CardAnalyzer, GoogleVisionDetector};
    ///
    /// let analyzer = CardAnalyzer::builder()
    ///     .text_detector(GoogleVisionDetector::new("api-key"))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder() -> CardAnalyzerBuilder {
        CardAnalyzerBuilder::default()
    }

    /// Google Vision text detection with settings from `config`, no line
    /// detection
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let detector = GoogleVisionDetector::from_config(&config.google_vision)
            .map_err(|e| AnalysisError::BuilderError(e.to_string()))?;

        Self::builder()
            .text_detector(detector)
            .config(config.clone())
            .build()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes one encoded card image.
    ///
    /// # Errors
    /// Returns `AnalysisError` if:
    /// - The image cannot be decoded (`InvalidImage`)
    /// - The text detector finds nothing or fails (`NoTextDetected`, with the
    ///   detector's error in the message)
    ///
    /// Line detection and upscaling failures are logged and the analysis
    /// continues without them.
    pub async fn analyze(&self, image_bytes: &[u8]) -> Result<RecipeAnalysis, AnalysisError> {
        let decoded = decode(image_bytes)?;
        let prepared = preprocess(decoded, &self.config.preprocess);
        let image = &prepared.image;

        let horizontal_constraints = &self.config.detection.horizontal;
        let vertical_constraints = &self.config.detection.vertical;

        let (text, horizontal, vertical) = tokio::join!(
            self.text_detector.detect_text(image),
            async {
                match &self.rectangle_detector {
                    Some(detector) => LineDetection::from_result(
                        detector
                            .detect_rectangles(image, horizontal_constraints)
                            .await,
                    ),
                    None => LineDetection::Skipped,
                }
            },
            async {
                match &self.rectangle_detector {
                    Some(detector) => LineDetection::from_result(
                        detector.detect_rectangles(image, vertical_constraints).await,
                    ),
                    None => LineDetection::Skipped,
                }
            },
        );

        let detector_name = self.text_detector.detector_name();
        let recognized = match text {
            Ok(recognized) => recognized,
            Err(e) => {
                warn!("Text detection with {} failed: {}", detector_name, e);
                return Err(AnalysisError::NoTextDetected(format!(
                    "{} failed: {}",
                    detector_name, e
                )));
            }
        };
        if recognized.is_empty() {
            return Err(AnalysisError::NoTextDetected(format!(
                "{} returned no text",
                detector_name
            )));
        }

        let blocks: Vec<TextBlock> = recognized
            .into_iter()
            .enumerate()
            .map(|(index, r)| TextBlock::from_recognized(index, r))
            .collect();

        let mut candidates = horizontal.into_candidates("horizontal");
        candidates.extend(vertical.into_candidates("vertical"));
        debug!(
            "Collected {} text blocks and {} line candidates",
            blocks.len(),
            candidates.len()
        );

        let analysis = self.engine.analyze(
            blocks,
            &candidates,
            prepared.processed_size,
            prepared.original_size,
        );

        info!(
            "Card analysis complete (upscaled: {})",
            analysis.was_upscaled()
        );
        Ok(analysis)
    }

    /// Runs [`analyze`](Self::analyze) on the current tokio runtime and hands
    /// the result to `callback`.
    ///
    /// Aborting the returned handle cancels any detection still in flight;
    /// the callback is then never called.
    pub fn analyze_with_callback<F>(
        self: &Arc<Self>,
        image_bytes: Vec<u8>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<RecipeAnalysis, AnalysisError>) + Send + 'static,
    {
        let analyzer = Arc::clone(self);
        tokio::spawn(async move {
            let result = analyzer.analyze(&image_bytes).await;
            callback(result);
        })
    }
}

/// Builder for configuring a [`CardAnalyzer`]
#[derive(Default)]
pub struct CardAnalyzerBuilder {
    text_detector: Option<Arc<dyn TextDetector>>,
    rectangle_detector: Option<Arc<dyn RectangleDetector>>,
    config: Option<AnalyzerConfig>,
    upscale: Option<bool>,
}

impl CardAnalyzerBuilder {
    /// Set the text recognition engine (required)
    pub fn text_detector(mut self, detector: impl TextDetector + 'static) -> Self {
        self.text_detector = Some(Arc::new(detector));
        self
    }

    /// Set the rectangle detector used to find ruled lines
    ///
    /// Without one, section and column inference rely on text positions only.
    pub fn rectangle_detector(mut self, detector: impl RectangleDetector + 'static) -> Self {
        self.rectangle_detector = Some(Arc::new(detector));
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enable or disable upscaling of small images
    pub fn upscale(mut self, enabled: bool) -> Self {
        self.upscale = Some(enabled);
        self
    }

    /// Build the analyzer
    ///
    /// # Errors
    /// Returns `AnalysisError::BuilderError` if no text detector was set
    pub fn build(self) -> Result<CardAnalyzer, AnalysisError> {
        let text_detector = self.text_detector.ok_or_else(|| {
            AnalysisError::BuilderError(
                "No text detector specified. Use .text_detector()".to_string(),
            )
        })?;

        let mut config = self.config.unwrap_or_default();
        if let Some(enabled) = self.upscale {
            config.preprocess.enabled = enabled;
        }

        Ok(CardAnalyzer {
            text_detector,
            rectangle_detector: self.rectangle_detector,
            engine: LayoutEngine::new(config.layout.clone()),
            config,
        })
    }
}
