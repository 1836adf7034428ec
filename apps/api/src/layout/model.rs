use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::layout::frame::{Frame, FrameSet, CANONICAL_CANVAS};

/// Declared content capacity of a layout. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Supports {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_max: Option<f64>,
}

impl Supports {
    pub fn new(text: (u32, u32), images: (u32, u32)) -> Self {
        Self {
            text_min: Some(text.0 as f64),
            text_max: Some(text.1 as f64),
            images_min: Some(images.0 as f64),
            images_max: Some(images.1 as f64),
        }
    }

    /// Reads whatever the library record carried under `supports`. A null or
    /// non-object value means no bounds; a non-numeric bound is treated as absent.
    pub fn from_value(value: &Value) -> Supports {
        let Some(obj) = value.as_object() else {
            return Supports::default();
        };
        let bound = |k: &str| obj.get(k).and_then(Value::as_f64).filter(|v| v.is_finite());
        Supports {
            text_min: bound("text_min"),
            text_max: bound("text_max"),
            images_min: bound("images_min"),
            images_max: bound("images_max"),
        }
    }
}

impl<'de> Deserialize<'de> for Supports {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Supports::from_value(&value))
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A null or non-numeric weight reads as the default.
fn lenient_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or_else(default_weight))
}

/// A named, reusable slide template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supports: Supports,
    /// Attractiveness bias independent of fit; higher is preferred.
    #[serde(default = "default_weight", deserialize_with = "lenient_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub frames: FrameSet,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub style: Value,
}

/// How much text and imagery a slide holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentShape {
    pub text_count: u32,
    pub image_count: u32,
}

impl ContentShape {
    pub fn new(text_count: u32, image_count: u32) -> Self {
        Self {
            text_count,
            image_count,
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    100
}

/// The layout library as served by `GET /api/v1/layouts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLibrary {
    pub items: Vec<Layout>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read layout library: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse layout library: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate layout id '{0}'")]
    DuplicateId(String),
}

impl LayoutLibrary {
    pub fn new(items: Vec<Layout>) -> Self {
        let total = items.len();
        Self {
            items,
            page: default_page(),
            page_size: default_page_size(),
            total,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Layout> {
        self.items.iter().find(|l| l.id == id)
    }

    /// Loads a library from a JSON file shaped like the listing response.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut library: LayoutLibrary = serde_json::from_str(&raw)?;
        if library.total == 0 {
            library.total = library.items.len();
        }
        library.validate()?;
        info!(
            "Loaded {} layouts from {}",
            library.items.len(),
            path.as_ref().display()
        );
        Ok(library)
    }

    /// Rejects duplicate ids. Frameless layouts and frames outside the canonical canvas
    /// are logged, not rejected.
    pub fn validate(&self) -> Result<(), LibraryError> {
        let mut seen = HashSet::new();
        for layout in &self.items {
            if !seen.insert(layout.id.as_str()) {
                return Err(LibraryError::DuplicateId(layout.id.clone()));
            }
            if layout.frames.is_empty() {
                warn!("Layout '{}' declares no usable frames", layout.id);
            }
            for (role, frame) in layout.frames.out_of_bounds(&CANONICAL_CANVAS) {
                warn!(
                    "Layout '{}' has a {:?} frame outside the canvas: {:?}",
                    layout.id, role, frame
                );
            }
        }
        Ok(())
    }
}

/// Highest-weight layout; the first one wins a weight tie.
pub fn heaviest(layouts: &[Layout]) -> Option<&Layout> {
    layouts
        .iter()
        .reduce(|best, l| if l.weight > best.weight { l } else { best })
}

/// The built-in library shipped with the service.
pub fn builtin_library() -> LayoutLibrary {
    let title_style = json!({"title": {"font": "Inter", "size": 36, "weight": 700}});

    LayoutLibrary::new(vec![
        Layout {
            id: "title_bullets_left".to_string(),
            name: "Title + Bullets (Left)".to_string(),
            supports: Supports::new((1, 12), (0, 1)),
            weight: 0.95,
            preview_url: Some("/static/layouts/title_bullets_left.png".to_string()),
            frames: FrameSet {
                title: Some(Frame::new(80.0, 64.0, 1120.0, 80.0)),
                text: vec![Frame::new(80.0, 170.0, 720.0, 360.0)],
                images: vec![Frame::new(840.0, 200.0, 360.0, 240.0)],
            },
            style: title_style.clone(),
        },
        Layout {
            id: "title_image_right".to_string(),
            name: "Title + Image (Right)".to_string(),
            supports: Supports::new((0, 6), (1, 1)),
            weight: 0.90,
            preview_url: Some("/static/layouts/title_image_right.png".to_string()),
            frames: FrameSet {
                title: Some(Frame::new(80.0, 64.0, 720.0, 80.0)),
                text: vec![],
                images: vec![Frame::new(840.0, 140.0, 360.0, 360.0)],
            },
            style: title_style.clone(),
        },
        Layout {
            id: "two_col_text_image".to_string(),
            name: "Two Columns (Text + Image)".to_string(),
            supports: Supports::new((1, 10), (1, 2)),
            weight: 0.85,
            preview_url: Some("/static/layouts/two_col_text_image.png".to_string()),
            frames: FrameSet {
                title: Some(Frame::new(80.0, 64.0, 1120.0, 80.0)),
                text: vec![Frame::new(80.0, 170.0, 540.0, 360.0)],
                images: vec![Frame::new(660.0, 170.0, 540.0, 360.0)],
            },
            style: title_style,
        },
    ])
}
