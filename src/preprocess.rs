use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use log::{debug, info, warn};

use crate::config::PreprocessConfig;
use crate::error::{AnalysisError, PreprocessError};
use crate::model::ImageSize;

/// A decoded card image ready for detection
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: DynamicImage,
    pub original_size: ImageSize,
    pub processed_size: ImageSize,
}

impl PreparedImage {
    pub fn was_upscaled(&self) -> bool {
        self.original_size != self.processed_size
    }
}

/// Decodes image bytes; an undecodable image is fatal
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
    image::load_from_memory(bytes).map_err(|e| AnalysisError::InvalidImage(e.to_string()))
}

/// Upscales a decoded image whose largest side is below `min_dimension`.
///
/// Upscaling failures are not fatal: the original image is used instead.
pub fn preprocess(image: DynamicImage, config: &PreprocessConfig) -> PreparedImage {
    let (width, height) = image.dimensions();
    let original_size = ImageSize::new(width, height);

    if !config.enabled {
        return PreparedImage {
            image,
            original_size,
            processed_size: original_size,
        };
    }

    match upscaled_size(original_size, config) {
        Ok(Some(target)) => {
            info!(
                "Upscaling image from {}x{} to {}x{}",
                width, height, target.width, target.height
            );
            let resized = image.resize_exact(target.width, target.height, FilterType::Lanczos3);
            PreparedImage {
                image: resized,
                original_size,
                processed_size: target,
            }
        }
        Ok(None) => {
            debug!("Image {}x{} is large enough, not upscaling", width, height);
            PreparedImage {
                image,
                original_size,
                processed_size: original_size,
            }
        }
        Err(e) => {
            warn!("Skipping upscale, using original image: {}", e);
            PreparedImage {
                image,
                original_size,
                processed_size: original_size,
            }
        }
    }
}

/// Target size preserving aspect ratio, or `None` if no upscale is needed
pub fn upscaled_size(
    size: ImageSize,
    config: &PreprocessConfig,
) -> Result<Option<ImageSize>, PreprocessError> {
    if size.width == 0 || size.height == 0 {
        return Err(PreprocessError::Empty);
    }

    let largest = size.max_dimension();
    if largest >= config.min_dimension {
        return Ok(None);
    }

    let scale = config.min_dimension as f64 / largest as f64;
    let width = (size.width as f64 * scale).round() as u64;
    let height = (size.height as f64 * scale).round() as u64;

    let max = config.max_dimension as u64;
    if width > max || height > max {
        return Err(PreprocessError::TooLarge {
            width: width.min(u32::MAX as u64) as u32,
            height: height.min(u32::MAX as u64) as u32,
            max: config.max_dimension,
        });
    }

    Ok(Some(ImageSize::new(
        (width as u32).max(1),
        (height as u32).max(1),
    )))
}
