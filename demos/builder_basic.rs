//! Basic usage of the CardAnalyzer builder API
//!
//! This example demonstrates the three main use cases:
//! 1. Photo → Recipe text, with text detection only
//! 2. Photo + ruled lines → Recipe, with line candidates from a JSON file
//! 3. Layout only: inspect sections, divider and ingredient rows
//!
//! Run with: cargo run --example builder_basic -- card.jpg [lines.json]

use std::env;
use std::path::Path;

use cooklang_card_layout::{
    CardAnalyzer, GoogleVisionDetector, PrecomputedRectangles, SectionType,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let image_path = args
        .get(1)
        .ok_or("Usage: builder_basic <image> [line-candidates.json]")?;
    let image = tokio::fs::read(image_path).await?;

    // Use Case 1: Photo → Recipe text
    println!("=== Use Case 1: Photo → Recipe text ===");
    let api_key = env::var("GOOGLE_API_KEY")?;
    let analyzer = CardAnalyzer::builder()
        .text_detector(GoogleVisionDetector::new(api_key.as_str()))
        .build()?;

    let analysis = analyzer.analyze(&image).await?;
    println!("{}", analysis.to_recipe().to_text_with_metadata());

    // Use Case 2: Photo + ruled lines → Recipe
    if let Some(lines_path) = args.get(2) {
        println!("\n=== Use Case 2: With ruled lines ===");
        let analyzer = CardAnalyzer::builder()
            .text_detector(GoogleVisionDetector::new(api_key.as_str()))
            .rectangle_detector(PrecomputedRectangles::from_file(Path::new(lines_path)).await?)
            .upscale(false)
            .build()?;

        let recipe = analyzer.analyze(&image).await?.to_recipe();
        println!("Title: {}", recipe.title);
        for (key, value) in &recipe.metadata {
            println!("{}: {}", key, value);
        }
        println!("Ingredients:");
        for ingredient in &recipe.ingredients {
            println!("  - {}", ingredient);
        }
    }

    // Use Case 3: Layout only
    println!("\n=== Use Case 3: Layout ===");
    match analysis.column_layout.divider_x {
        Some(x) => println!("Two columns, divider at x={:.2}", x),
        None => println!("No divider found"),
    }
    for section in &analysis.sections {
        println!("{:?}: {} blocks", section.section_type, section.blocks.len());
    }
    if analysis.section(SectionType::Ingredients).is_none() {
        println!("(ingredients picked by pattern)");
    }
    for row in &analysis.ingredient_rows {
        println!("  {:<30} | {}", row.left_text(), row.right_text());
    }

    Ok(())
}
