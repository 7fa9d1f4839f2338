use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main analyzer configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnalyzerConfig {
    /// Upscaling of small images before detection
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    /// Thresholds used by the layout stages
    #[serde(default)]
    pub layout: LayoutThresholds,
    /// Constraints passed to the rectangle detector
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Google Cloud Vision text detection
    #[serde(default)]
    pub google_vision: GoogleVisionConfig,
}

/// Configuration for image preprocessing
#[derive(Debug, Deserialize, Clone)]
pub struct PreprocessConfig {
    /// Whether small images are upscaled
    #[serde(default = "default_upscale_enabled")]
    pub enabled: bool,
    /// Largest side an image must reach before detection (pixels)
    #[serde(default = "default_min_dimension")]
    pub min_dimension: u32,
    /// Upscaling is abandoned if either side would exceed this (pixels)
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: default_upscale_enabled(),
            min_dimension: default_min_dimension(),
            max_dimension: default_max_dimension(),
        }
    }
}

/// Geometric thresholds for the layout stages. All lengths are in
/// unit-normalized image coordinates.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutThresholds {
    /// A horizontal rule is wider than this many times its height
    pub horizontal_min_aspect_ratio: f64,
    pub horizontal_min_width: f64,
    /// A vertical divider is narrower than this fraction of its height
    pub vertical_max_aspect_ratio: f64,
    pub vertical_min_height: f64,
    /// Open interval the divider's midpoint must fall in
    pub divider_min_x: f64,
    pub divider_max_x: f64,

    /// Fewest blocks for which a divider is guessed from whitespace
    pub gap_min_blocks: usize,
    pub gap_min_x: f64,
    pub gap_max_x: f64,
    /// A whitespace gap must be wider than this to count as a divider
    pub gap_min_width: f64,

    /// Band boundaries used when the card has no horizontal rules
    pub title_band_min_y: f64,
    pub instructions_band_max_y: f64,
    /// Y tolerance for the topmost cluster tested for metadata
    pub metadata_cluster_tolerance: f64,

    pub ingredient_min_y: f64,
    pub ingredient_max_y: f64,
    /// Ingredient lines are shorter than this many characters
    pub ingredient_max_chars: usize,
    /// Below this many pattern matches the search is widened
    pub ingredient_min_candidates: usize,
    pub widened_min_y: f64,
    pub widened_max_y: f64,

    /// Row threshold is this multiple of the average block height...
    pub row_height_factor: f64,
    /// ...but never less than this
    pub min_row_threshold: f64,
    /// Column split used when there is no divider
    pub default_column_split: f64,
}

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            horizontal_min_aspect_ratio: 8.0,
            horizontal_min_width: 0.4,
            vertical_max_aspect_ratio: 0.15,
            vertical_min_height: 0.2,
            divider_min_x: 0.25,
            divider_max_x: 0.75,
            gap_min_blocks: 6,
            gap_min_x: 0.3,
            gap_max_x: 0.7,
            gap_min_width: 0.05,
            title_band_min_y: 0.85,
            instructions_band_max_y: 0.3,
            metadata_cluster_tolerance: 0.015,
            ingredient_min_y: 0.3,
            ingredient_max_y: 0.9,
            ingredient_max_chars: 30,
            ingredient_min_candidates: 5,
            widened_min_y: 0.4,
            widened_max_y: 0.85,
            row_height_factor: 1.5,
            min_row_threshold: 0.015,
            default_column_split: 0.6,
        }
    }
}

/// Constraints for one rectangle detection request
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RectangleConstraints {
    /// Lowest accepted width/height ratio
    pub min_aspect_ratio: f64,
    /// Highest accepted width/height ratio
    pub max_aspect_ratio: f64,
    /// Smallest accepted extent along the longer side (normalized)
    #[serde(default)]
    pub min_size: f64,
    #[serde(default)]
    pub min_confidence: f32,
    #[serde(default = "default_max_observations")]
    pub max_observations: usize,
}

impl RectangleConstraints {
    /// Long, flat shapes: section rules
    pub fn horizontal() -> Self {
        Self {
            min_aspect_ratio: 8.0,
            max_aspect_ratio: f64::INFINITY,
            min_size: 0.4,
            min_confidence: 0.0,
            max_observations: default_max_observations(),
        }
    }

    /// Tall, thin shapes: column dividers
    pub fn vertical() -> Self {
        Self {
            min_aspect_ratio: 0.0,
            max_aspect_ratio: 0.15,
            min_size: 0.2,
            min_confidence: 0.0,
            max_observations: default_max_observations(),
        }
    }
}

/// Rectangle constraints for both detection passes
#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    #[serde(default = "RectangleConstraints::horizontal")]
    pub horizontal: RectangleConstraints,
    #[serde(default = "RectangleConstraints::vertical")]
    pub vertical: RectangleConstraints,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            horizontal: RectangleConstraints::horizontal(),
            vertical: RectangleConstraints::vertical(),
        }
    }
}

/// Configuration for Google Cloud Vision
#[derive(Debug, Deserialize, Clone)]
pub struct GoogleVisionConfig {
    /// API key (falls back to GOOGLE_API_KEY)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for proxies and tests)
    pub base_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for GoogleVisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_upscale_enabled() -> bool {
    true
}

fn default_min_dimension() -> u32 {
    1000
}

fn default_max_dimension() -> u32 {
    10_000
}

fn default_max_observations() -> usize {
    16
}

fn default_timeout() -> u64 {
    30
}

impl AnalyzerConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with COOKLANG_CARD__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: COOKLANG_CARD__PREPROCESS__MIN_DIMENSION
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with COOKLANG_CARD__ prefix
/// 2. config.toml file in current directory
/// 3. Default values
///
/// Environment variable format: COOKLANG_CARD__GOOGLE_VISION__API_KEY
pub fn load_config() -> Result<AnalyzerConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Use double underscore for nested: COOKLANG_CARD__LAYOUT__GAP_MIN_WIDTH
fn environment() -> Environment {
    Environment::with_prefix("COOKLANG_CARD")
        .separator("__")
        .try_parsing(true)
}
