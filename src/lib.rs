pub mod analyzer;
pub mod config;
pub mod detectors;
pub mod error;
pub mod layout;
pub mod model;
pub mod preprocess;
pub mod recipe;

// UniFFI bindings for mobile platforms
pub mod uniffi_bindings;

// Re-export commonly used types
pub use analyzer::{CardAnalyzer, CardAnalyzerBuilder};
pub use config::{AnalyzerConfig, LayoutThresholds, RectangleConstraints};
pub use detectors::{
    GoogleVisionDetector, LineDetection, PrecomputedRectangles, RectangleDetector, TextDetector,
};
pub use error::{AnalysisError, DetectorError};
pub use layout::LayoutEngine;
pub use model::{
    BoundingBox, CardRecipe, ColumnLayout, DetectedLine, ImageSize, IngredientRow, LineCandidate,
    Orientation, RecipeAnalysis, RecognizedText, Section, SectionType, TextBlock, TextCandidate,
};

use std::path::Path;

/// Analyze a recipe card image file with the default configuration
///
/// Text is recognized with Google Cloud Vision (GOOGLE_API_KEY must be set);
/// no ruled-line detection is performed.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let analysis = cooklang_card_layout::analyze_file("card.jpg").await?;
/// println!("{}", analysis.to_recipe().to_text_with_metadata());
/// # Ok(())
/// # }
/// ```
pub async fn analyze_file(path: impl AsRef<Path>) -> Result<RecipeAnalysis, AnalysisError> {
    let bytes = tokio::fs::read(path.as_ref())
        .await
        .map_err(|e| AnalysisError::InvalidImage(e.to_string()))?;

    let analyzer = CardAnalyzer::from_config(&AnalyzerConfig::default())?;
    analyzer.analyze(&bytes).await
}
