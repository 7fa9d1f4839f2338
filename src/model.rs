use serde::{Deserialize, Serialize};

/// A rectangle in unit-normalized image coordinates.
///
/// The origin is the bottom-left corner of the image and `y` grows upward,
/// so `y` is the bottom edge of the box and `y + height` its top edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn min_y(&self) -> f64 {
        self.y
    }

    /// Top edge
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Width over height. A zero-height box is infinitely wide.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            f64::INFINITY
        } else {
            self.width / self.height
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Union of all boxes, `None` for an empty iterator
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BoundingBox>, b| match acc {
                Some(acc) => Some(acc.union(b)),
                None => Some(*b),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// One recognized string with the engine's confidence in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCandidate {
    pub text: String,
    pub confidence: f32,
}

/// Raw output of a text detector, before it is ingested into the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub bounding_box: BoundingBox,
    /// Ranked best first
    pub candidates: Vec<TextCandidate>,
}

impl RecognizedText {
    pub fn new(bounding_box: BoundingBox, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bounding_box,
            candidates: vec![TextCandidate {
                text: text.into(),
                confidence,
            }],
        }
    }
}

/// A recognized block of text on the card.
///
/// Blocks are identified by `index`, assigned once at ingestion. Two blocks
/// may carry the same text; they are still different blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub index: usize,
    pub bounding_box: BoundingBox,
    pub candidates: Vec<TextCandidate>,
}

impl TextBlock {
    pub fn from_recognized(index: usize, recognized: RecognizedText) -> Self {
        Self {
            index,
            bounding_box: recognized.bounding_box,
            candidates: recognized.candidates,
        }
    }

    /// The top-ranked candidate string, empty if the engine gave none
    pub fn text(&self) -> &str {
        self.candidates
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or("")
    }

    pub fn confidence(&self) -> f32 {
        self.candidates.first().map(|c| c.confidence).unwrap_or(0.0)
    }
}

/// A rectangle or contour reported by a shape detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineCandidate {
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

impl LineCandidate {
    pub fn new(bounding_box: BoundingBox, confidence: f32) -> Self {
        Self {
            bounding_box,
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A ruled line on the card, derived from a [`LineCandidate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedLine {
    pub start: Point,
    pub end: Point,
    pub orientation: Orientation,
    pub confidence: f32,
}

impl DetectedLine {
    /// Y of a horizontal line, X of a vertical one
    pub fn position(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.start.y,
            Orientation::Vertical => self.start.x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Title,
    Metadata,
    Ingredients,
    Instructions,
    /// Declared for cards with a variations panel; nothing produces it yet.
    Variations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub section_type: SectionType,
    pub bounding_box: BoundingBox,
    pub blocks: Vec<TextBlock>,
}

impl Section {
    /// Builds a section over `blocks`, or `None` when there are no blocks
    pub fn from_blocks(section_type: SectionType, blocks: Vec<TextBlock>) -> Option<Self> {
        let bounding_box = BoundingBox::union_all(blocks.iter().map(|b| &b.bounding_box))?;
        Some(Self {
            section_type,
            bounding_box,
            blocks,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.text())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub divider_x: Option<f64>,
    pub left_column_bounds: BoundingBox,
    pub right_column_bounds: BoundingBox,
    pub image_size: ImageSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientRow {
    /// Bottom edge of the lowest member block
    pub y_position: f64,
    pub height: f64,
    pub left_column: Vec<TextBlock>,
    pub right_column: Vec<TextBlock>,
}

impl IngredientRow {
    pub fn left_text(&self) -> String {
        join_texts(&self.left_column)
    }

    pub fn right_text(&self) -> String {
        join_texts(&self.right_column)
    }

    pub fn block_count(&self) -> usize {
        self.left_column.len() + self.right_column.len()
    }
}

fn join_texts(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text().trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything inferred about one card image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeAnalysis {
    pub sections: Vec<Section>,
    pub column_layout: ColumnLayout,
    pub ingredient_rows: Vec<IngredientRow>,
    /// Size of the image the detectors ran on
    pub image_size: ImageSize,
    pub original_image_size: ImageSize,
}

impl RecipeAnalysis {
    pub fn was_upscaled(&self) -> bool {
        self.image_size != self.original_image_size
    }

    pub fn section(&self, section_type: SectionType) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.section_type == section_type)
    }
}

/// Recipe content read off a card
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardRecipe {
    pub title: String,
    /// Ordered key/value pairs, e.g. `("servings", "4")`
    pub metadata: Vec<(String, String)>,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

impl CardRecipe {
    /// Renders the recipe with YAML-style frontmatter followed by the
    /// ingredient lines and the instructions.
    pub fn to_text_with_metadata(&self) -> String {
        let mut output = String::new();

        if !self.title.is_empty() || !self.metadata.is_empty() {
            output.push_str("---\n");
            if !self.title.is_empty() {
                output.push_str(&format!("title: {}\n", self.title));
            }
            for (key, value) in &self.metadata {
                output.push_str(&format!("{}: {}\n", key, value));
            }
            output.push_str("---\n\n");
        }

        output.push_str(&self.ingredients.join("\n"));

        if !self.instructions.is_empty() {
            if !self.ingredients.is_empty() {
                output.push_str("\n\n");
            }
            output.push_str(&self.instructions);
        }

        output
    }
}
