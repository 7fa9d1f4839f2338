//! UniFFI bindings for cooklang-card-layout
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;

use crate::{AnalysisError, AnalyzerConfig, CardAnalyzer, CardRecipe, RecipeAnalysis};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// Key-value pair for metadata (since HashMap isn't directly supported in UniFFI)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiKeyValue {
    pub key: String,
    pub value: String,
}

/// FFI-compatible recipe read off a card
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiCardRecipe {
    /// Recipe title (empty string if none)
    pub title: String,
    /// Servings, timings and the like
    pub metadata: Vec<FfiKeyValue>,
    /// Ingredient lines, left column first
    pub ingredients: Vec<String>,
    /// Recipe instructions
    pub instructions: String,
    /// Whether the card had two columns
    pub two_columns: bool,
    /// Whether the image was upscaled before detection
    pub was_upscaled: bool,
}

impl From<CardRecipe> for FfiCardRecipe {
    fn from(recipe: CardRecipe) -> Self {
        FfiCardRecipe {
            title: recipe.title,
            metadata: recipe
                .metadata
                .into_iter()
                .map(|(key, value)| FfiKeyValue { key, value })
                .collect(),
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            two_columns: false,
            was_upscaled: false,
        }
    }
}

impl From<&RecipeAnalysis> for FfiCardRecipe {
    fn from(analysis: &RecipeAnalysis) -> Self {
        FfiCardRecipe {
            two_columns: analysis.column_layout.divider_x.is_some(),
            was_upscaled: analysis.was_upscaled(),
            ..analysis.to_recipe().into()
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiAnalysisError {
    /// The image could not be read or decoded
    InvalidImage { message: String },
    /// No text was found on the card
    NoTextDetected { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiAnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiAnalysisError::InvalidImage { message } => write!(f, "Invalid image: {}", message),
            FfiAnalysisError::NoTextDetected { message } => {
                write!(f, "No text detected: {}", message)
            }
            FfiAnalysisError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiAnalysisError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiAnalysisError {}

impl From<AnalysisError> for FfiAnalysisError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidImage(msg) => FfiAnalysisError::InvalidImage { message: msg },
            AnalysisError::NoTextDetected(msg) => {
                FfiAnalysisError::NoTextDetected { message: msg }
            }
            AnalysisError::BuilderError(msg) => FfiAnalysisError::ConfigError { message: msg },
            AnalysisError::ConfigError(e) => FfiAnalysisError::ConfigError {
                message: e.to_string(),
            },
        }
    }
}

/// Configuration for analyzing cards
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiAnalyzeConfig {
    /// Optional Google Vision API key (uses environment variable if not specified)
    pub api_key: Option<String>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
    /// If false, small images are not upscaled before detection
    pub upscale: Option<bool>,
}

impl FfiAnalyzeConfig {
    fn into_analyzer_config(self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::default();
        if let Some(api_key) = self.api_key {
            config.google_vision.api_key = Some(api_key);
        }
        if let Some(timeout) = self.timeout_seconds {
            config.google_vision.timeout = timeout;
        }
        if let Some(upscale) = self.upscale {
            config.preprocess.enabled = upscale;
        }
        config
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiAnalysisError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiAnalysisError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// Analyze a recipe card image file
///
/// # Arguments
/// * `image_path` - Path to the card photo or scan
/// * `config` - Optional configuration for the analysis
///
/// # Returns
/// The recipe read off the card
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn analyze_card_image(
    image_path: String,
    config: Option<FfiAnalyzeConfig>,
) -> Result<FfiCardRecipe, FfiAnalysisError> {
    let rt = create_runtime()?;
    rt.block_on(async { analyze_card_image_async(&image_path, config).await })
}

async fn analyze_card_image_async(
    image_path: &str,
    config: Option<FfiAnalyzeConfig>,
) -> Result<FfiCardRecipe, FfiAnalysisError> {
    let config = config.unwrap_or_default().into_analyzer_config();

    let image = tokio::fs::read(image_path)
        .await
        .map_err(|e| FfiAnalysisError::InvalidImage {
            message: format!("Failed to read {}: {}", image_path, e),
        })?;

    let analyzer = CardAnalyzer::from_config(&config)?;
    let analysis = analyzer.analyze(&image).await?;

    Ok(FfiCardRecipe::from(&analysis))
}

/// Render a card recipe as text with frontmatter
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn card_recipe_to_text(recipe: FfiCardRecipe) -> String {
    CardRecipe {
        title: recipe.title,
        metadata: recipe
            .metadata
            .into_iter()
            .map(|kv| (kv.key, kv.value))
            .collect(),
        ingredients: recipe.ingredients,
        instructions: recipe.instructions,
    }
    .to_text_with_metadata()
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if text detection is available (has required environment variables)
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn is_text_detection_available() -> bool {
    std::env::var("GOOGLE_API_KEY").is_ok()
}
