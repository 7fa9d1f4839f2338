use log::{debug, error};
use std::env;
use std::path::Path;

use cooklang_card_layout::config::load_config;
use cooklang_card_layout::{CardAnalyzer, GoogleVisionDetector, PrecomputedRectangles};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get the image path (and optional line candidates) from command-line arguments
    let args: Vec<String> = env::args().collect();
    let image_path = args
        .get(1)
        .ok_or("Usage: cooklang-card-layout <image> [line-candidates.json]")?;

    let config = load_config()?;
    debug!("{:#?}", config);

    let mut builder = CardAnalyzer::builder()
        .text_detector(GoogleVisionDetector::from_config(&config.google_vision)?)
        .config(config);

    if let Some(lines_path) = args.get(2) {
        let lines = PrecomputedRectangles::from_file(Path::new(lines_path)).await?;
        builder = builder.rectangle_detector(lines);
    }

    let analyzer = builder.build()?;
    let image = tokio::fs::read(image_path).await?;

    match analyzer.analyze(&image).await {
        Ok(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            println!();
            println!("{}", analysis.to_recipe().to_text_with_metadata());
            Ok(())
        }
        Err(e) => {
            error!("Unable to analyze recipe card: {}", e);
            Err(e.into())
        }
    }
}
