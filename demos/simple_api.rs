//! Simple API usage with convenience functions
//!
//! This example shows how to use the high-level convenience functions
//! for the most common use cases.
//!
//! Run with: GOOGLE_API_KEY=... cargo run --example simple_api -- card.jpg

use cooklang_card_layout::{analyze_file, config::load_config, CardAnalyzer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let image_path = std::env::args()
        .nth(1)
        .ok_or("Usage: simple_api <image>")?;

    // Simple analysis with default settings
    println!("=== Simple Analysis ===");
    let analysis = analyze_file(&image_path).await?;
    println!("{}", analysis.to_recipe().to_text_with_metadata());
    println!("Upscaled: {}", analysis.was_upscaled());

    // Settings from config.toml and COOKLANG_CARD__* variables
    println!("\n=== From Config ===");
    let config = load_config()?;
    let analyzer = CardAnalyzer::from_config(&config)?;
    let image = tokio::fs::read(&image_path).await?;
    let analysis = analyzer.analyze(&image).await?;
    println!("{}", serde_json::to_string_pretty(&analysis.column_layout)?);

    Ok(())
}
