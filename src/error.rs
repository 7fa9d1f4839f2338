use thiserror::Error;

/// Errors that can occur while analyzing a recipe card
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The image could not be decoded; no detection was attempted
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The text recognition engine found nothing on the card, or failed;
    /// the message says which
    #[error("No text detected in image: {0}")]
    NoTextDetected(String),

    /// Analyzer configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

/// Errors reported by an external detection engine
#[derive(Error, Debug)]
pub enum DetectorError {
    /// No API key in configuration or environment
    #[error("GOOGLE_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine answered with an error status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The engine answered with something we could not interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The image could not be encoded for upload
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from upscaling. Always recovered from by keeping the original image.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("Upscaled size {width}x{height} exceeds the {max} pixel limit")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("Image has a zero dimension")]
    Empty,
}
