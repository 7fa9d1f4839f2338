use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::time::Duration;

use super::TextDetector;
use crate::config::GoogleVisionConfig;
use crate::error::DetectorError;
use crate::model::{BoundingBox, RecognizedText, TextCandidate};

const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";

/// Text detection through the Google Cloud Vision API.
///
/// One block is produced per recognized paragraph.
pub struct GoogleVisionDetector {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleVisionDetector {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a detector from configuration, falling back to the
    /// GOOGLE_API_KEY environment variable for the key
    pub fn from_config(config: &GoogleVisionConfig) -> Result<Self, DetectorError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or(DetectorError::MissingApiKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn annotate(&self, base64_image: &str) -> Result<AnnotateResponse, DetectorError> {
        let url = format!(
            "{}/v1/images:annotate?key={}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        );

        let request_body = json!({
            "requests": [{
                "image": {
                    "content": base64_image
                },
                "features": [{
                    "type": "DOCUMENT_TEXT_DETECTION"
                }]
            }]
        });

        debug!("Sending text detection request to Google Vision API");

        let response = self
            .client
            .post(&url)
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await?;
            return Err(DetectorError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TextDetector for GoogleVisionDetector {
    fn detector_name(&self) -> &str {
        "google_vision"
    }

    async fn detect_text(
        &self,
        image: &DynamicImage,
    ) -> Result<Vec<RecognizedText>, DetectorError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        let base64_image = STANDARD.encode(&png);

        let response = self.annotate(&base64_image).await?;
        let blocks = recognized_paragraphs(response)?;

        debug!("Google Vision returned {} text blocks", blocks.len());
        Ok(blocks)
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<FullTextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    width: u32,
    height: u32,
    #[serde(default)]
    blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
struct Block {
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paragraph {
    bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct Word {
    #[serde(default)]
    symbols: Vec<Symbol>,
}

#[derive(Debug, Deserialize)]
struct Symbol {
    text: String,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// Pixel vertex; the API omits zero coordinates
#[derive(Debug, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

fn recognized_paragraphs(response: AnnotateResponse) -> Result<Vec<RecognizedText>, DetectorError> {
    let Some(first) = response.responses.into_iter().next() else {
        return Err(DetectorError::InvalidResponse(
            "Response contained no results".to_string(),
        ));
    };

    if let Some(error) = first.error {
        return Err(DetectorError::InvalidResponse(error.message));
    }

    // No annotation means no text was found
    let Some(annotation) = first.full_text_annotation else {
        return Ok(Vec::new());
    };

    let mut blocks = Vec::new();
    for page in annotation.pages {
        if page.width == 0 || page.height == 0 {
            continue;
        }
        for paragraph in page.blocks.into_iter().flat_map(|b| b.paragraphs) {
            let text = paragraph
                .words
                .iter()
                .map(|w| w.symbols.iter().map(|s| s.text.as_str()).collect::<String>())
                .collect::<Vec<_>>()
                .join(" ");
            if text.trim().is_empty() {
                continue;
            }
            let Some(poly) = paragraph.bounding_box else {
                continue;
            };
            let Some(bounding_box) = normalize(&poly.vertices, page.width, page.height) else {
                continue;
            };

            blocks.push(RecognizedText {
                bounding_box,
                candidates: vec![TextCandidate {
                    text,
                    confidence: paragraph.confidence,
                }],
            });
        }
    }

    Ok(blocks)
}

/// Converts top-left-origin pixel vertices into a unit-normalized box with a
/// bottom-left origin
fn normalize(vertices: &[Vertex], width: u32, height: u32) -> Option<BoundingBox> {
    if vertices.is_empty() {
        return None;
    }
    let (w, h) = (width as f64, height as f64);

    let min_x = vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min);
    let max_x = vertices.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = vertices.iter().map(|v| v.y).fold(f64::INFINITY, f64::min);
    let max_y = vertices.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);

    let left = (min_x / w).clamp(0.0, 1.0);
    let right = (max_x / w).clamp(0.0, 1.0);
    let top = (1.0 - min_y / h).clamp(0.0, 1.0);
    let bottom = (1.0 - max_y / h).clamp(0.0, 1.0);

    Some(BoundingBox::new(left, bottom, right - left, top - bottom))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_flips_y() {
        let vertices = vec![
            Vertex { x: 100.0, y: 200.0 },
            Vertex { x: 300.0, y: 200.0 },
            Vertex { x: 300.0, y: 250.0 },
            Vertex { x: 100.0, y: 250.0 },
        ];
        let b = normalize(&vertices, 1000, 1000).unwrap();
        assert!((b.x - 0.1).abs() < 1e-9);
        assert!((b.width - 0.2).abs() < 1e-9);
        assert!((b.y - 0.75).abs() < 1e-9);
        assert!((b.max_y() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_paragraph_text_and_missing_coordinates() {
        let body = r#"{
            "responses": [{
                "fullTextAnnotation": {
                    "pages": [{
                        "width": 200,
                        "height": 100,
                        "blocks": [{
                            "paragraphs": [{
                                "boundingBox": {"vertices": [{}, {"x": 100}, {"x": 100, "y": 10}, {"y": 10}]},
                                "confidence": 0.97,
                                "words": [
                                    {"symbols": [{"text": "2"}]},
                                    {"symbols": [{"text": "e"}, {"text": "g"}, {"text": "g"}, {"text": "s"}]}
                                ]
                            }]
                        }]
                    }]
                }
            }]
        }"#;

        let response: AnnotateResponse = serde_json::from_str(body).unwrap();
        let blocks = recognized_paragraphs(response).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].candidates[0].text, "2 eggs");
        assert!((blocks[0].bounding_box.width - 0.5).abs() < 1e-9);
        assert!((blocks[0].bounding_box.max_y() - 1.0).abs() < 1e-9);
        assert!((blocks[0].bounding_box.y - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_no_annotation_means_no_text() {
        let response: AnnotateResponse = serde_json::from_str(r#"{"responses": [{}]}"#).unwrap();
        assert!(recognized_paragraphs(response).unwrap().is_empty());
    }

    #[test]
    fn test_api_error_in_body() {
        let response: AnnotateResponse =
            serde_json::from_str(r#"{"responses": [{"error": {"message": "Bad image data"}}]}"#)
                .unwrap();
        let err = recognized_paragraphs(response).unwrap_err();
        assert!(err.to_string().contains("Bad image data"));
    }

    #[test]
    fn test_from_config_requires_api_key() {
        // Clear the env var if it exists
        let original_key = std::env::var("GOOGLE_API_KEY").ok();
        std::env::remove_var("GOOGLE_API_KEY");

        let result = GoogleVisionDetector::from_config(&GoogleVisionConfig::default());
        assert!(matches!(result, Err(DetectorError::MissingApiKey)));

        // Restore original key if it existed
        if let Some(key) = original_key {
            std::env::set_var("GOOGLE_API_KEY", key);
        }
    }

    #[test]
    fn test_from_config_with_key() {
        let config = GoogleVisionConfig {
            api_key: Some("test-key".to_string()),
            base_url: Some("http://localhost:1234".to_string()),
            timeout: 5,
        };
        let detector = GoogleVisionDetector::from_config(&config).unwrap();
        assert_eq!(detector.detector_name(), "google_vision");
        assert_eq!(detector.base_url, "http://localhost:1234");
    }
}
