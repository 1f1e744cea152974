//! Template metadata types.
//!
//! [`TemplateMetadata`] is the shape persisted in the on-disk catalog.
//! [`ApiTemplate`] is the looser shape the remote API returns; it is mapped
//! into metadata once, at fetch time.

use serde::{Deserialize, Serialize};

use crate::cache::{ImagePayload, TemplateKey};
use crate::error::{MemeError, Result};

/// Most text lines a template may declare.
pub const MAX_TEXT_LINES: usize = 16;

/// Horizontal alignment of a text slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Center,
    Left,
    Right,
}

/// Case transform applied to a slot's text by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    #[default]
    Upper,
    Lower,
    None,
}

/// Where a text line is drawn on a template.
///
/// Coordinates are fractions (0.0 to 1.0) of the image size, measured from
/// the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPosition {
    /// Left edge of the text box.
    pub anchor_x: f64,
    /// Top edge of the text box.
    pub anchor_y: f64,
    /// Width of the text box.
    pub scale_x: f64,
    /// Height of the text box.
    pub scale_y: f64,
    /// Horizontal alignment inside the box.
    pub align: Alignment,
    /// Case transform applied to the text.
    pub style: TextStyle,
    /// Rotation in degrees.
    pub angle: f64,
}

impl Default for TextPosition {
    fn default() -> Self {
        Self {
            anchor_x: 0.0,
            anchor_y: 0.0,
            scale_x: 1.0,
            scale_y: 0.2,
            align: Alignment::Center,
            style: TextStyle::Upper,
            angle: 0.0,
        }
    }
}

impl TextPosition {
    /// Full-width slot starting at `anchor_y` with height `scale_y`.
    pub fn band(anchor_y: f64, scale_y: f64) -> Self {
        Self {
            anchor_y,
            scale_y,
            ..Self::default()
        }
    }

    /// The classic top/bottom meme layout.
    pub fn top_bottom() -> Vec<Self> {
        vec![Self::band(0.0, 0.2), Self::band(0.8, 0.2)]
    }

    /// Layout for `lines` text lines.
    ///
    /// Up to two lines use the top/bottom slots; more lines are spread evenly
    /// from top to bottom. At most [`MAX_TEXT_LINES`] slots are produced.
    pub fn layout(lines: usize) -> Vec<Self> {
        let lines = lines.min(MAX_TEXT_LINES);
        if lines <= 2 {
            return Self::top_bottom().into_iter().take(lines).collect();
        }

        let slot = 1.0 / lines as f64;
        (0..lines)
            .map(|i| Self::band(i as f64 * slot, slot))
            .collect()
    }
}

/// Metadata for one template in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    /// Catalog identifier, e.g. `buzz`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL (or local path) of the blank background image.
    pub image_url: String,
    /// Text slots in line order.
    #[serde(default = "TextPosition::top_bottom")]
    pub text_positions: Vec<TextPosition>,
    /// Search terms beyond the id and name.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Example text lines.
    #[serde(default)]
    pub example: Vec<String>,
}

impl TemplateMetadata {
    /// Synthesize metadata for an image that is not in the catalog.
    ///
    /// The id is the file stem of the path or URL; `name` defaults to it.
    pub fn from_image(path_or_url: &str, lines: usize, name: Option<&str>) -> Result<Self> {
        if !(1..=MAX_TEXT_LINES).contains(&lines) {
            return Err(MemeError::InvalidInput {
                message: format!("lines must be between 1 and {}", MAX_TEXT_LINES),
            });
        }

        let key = TemplateKey::classify(path_or_url);
        let id = key.stem();

        Ok(Self {
            name: name.filter(|n| !n.is_empty()).unwrap_or(id.as_str()).to_string(),
            id,
            image_url: path_or_url.to_string(),
            text_positions: TextPosition::layout(lines),
            keywords: Vec::new(),
            example: Vec::new(),
        })
    }

    /// Whether `query` (already lowercased) occurs in the id, name or keywords.
    pub fn matches(&self, query_lower: &str) -> bool {
        let searchable = format!("{} {} {}", self.id, self.name, self.keywords.join(" "));
        searchable.to_lowercase().contains(query_lower)
    }

    /// Number of text lines the template expects.
    pub fn line_count(&self) -> usize {
        self.text_positions.len()
    }
}

/// A template ready for rendering: metadata plus its background image.
#[derive(Debug, Clone)]
pub struct Template {
    /// Catalog or synthesized metadata.
    pub metadata: TemplateMetadata,
    /// Decoded background image.
    pub image: ImagePayload,
}

/// A template record as served by the remote API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTemplate {
    /// Catalog identifier.
    pub id: String,
    /// Display name; the id when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Number of text lines; the API has served both numbers and strings.
    #[serde(default)]
    pub lines: Option<serde_json::Value>,
    /// Blank background image URL.
    #[serde(default)]
    pub blank: Option<String>,
    /// Search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Sample captions.
    #[serde(default)]
    pub example: Option<ApiExample>,
}

/// Example block of an API template record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiExample {
    /// One caption per text line.
    #[serde(default)]
    pub text: Vec<String>,
}

impl ApiTemplate {
    /// Number of lines. Missing, unparseable or out-of-range values
    /// (outside `1..=MAX_TEXT_LINES`) fall back to 2.
    fn line_count(&self) -> usize {
        let parsed = match &self.lines {
            Some(serde_json::Value::Number(n)) => n.as_u64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| (1..=MAX_TEXT_LINES).contains(n))
            .unwrap_or(2)
    }

    /// Map an API record into catalog metadata.
    pub fn into_metadata(self, api_base: &str) -> TemplateMetadata {
        let lines = self.line_count();
        let text_positions = if lines <= 2 {
            TextPosition::top_bottom()
        } else {
            TextPosition::layout(lines)
        };
        let image_url = self
            .blank
            .unwrap_or_else(|| format!("{}/images/{}.png", api_base.trim_end_matches('/'), self.id));

        TemplateMetadata {
            name: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            image_url,
            text_positions,
            keywords: self.keywords,
            example: self.example.map(|e| e.text).unwrap_or_default(),
        }
    }
}
