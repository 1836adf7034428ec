use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layout::model::ContentShape;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type", default = "default_media_type")]
    pub media_type: String,
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
}

fn default_media_type() -> String {
    "image".to_string()
}

/// A slide as produced by the outline service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bullets: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Outline-time layout hint; the actual choice lives in the selection state.
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub media: Option<Vec<Media>>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Slide {
    pub fn bullets(&self) -> &[String] {
        self.bullets.as_deref().unwrap_or_default()
    }

    pub fn media(&self) -> &[Media] {
        self.media.as_deref().unwrap_or_default()
    }

    /// `text_count` = bullet lines, `image_count` = media attachments.
    pub fn content_shape(&self) -> ContentShape {
        ContentShape::new(self.bullets().len() as u32, self.media().len() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub slide_count: usize,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Deck {
    pub fn slide(&self, id: &str) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn slide_ids(&self) -> impl Iterator<Item = &str> {
        self.slides.iter().map(|s| s.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_shape_counts_bullets_and_media() {
        let slide: Slide = serde_json::from_value(json!({
            "id": "s1",
            "title": "Intro",
            "bullets": ["a", "b", "c"],
            "media": [{"type": "image", "url": "https://example.com/a.png"}],
        }))
        .unwrap();
        assert_eq!(slide.content_shape(), ContentShape::new(3, 1));
    }

    #[test]
    fn test_null_bullets_and_media_count_as_zero() {
        let slide: Slide = serde_json::from_value(json!({
            "id": "s1",
            "title": "Empty",
            "bullets": null,
            "media": null,
        }))
        .unwrap();
        assert_eq!(slide.content_shape(), ContentShape::default());
    }

    #[test]
    fn test_deck_parses_outline_output() {
        let deck: Deck = serde_json::from_value(json!({
            "version": "1.0",
            "topic": "AI Hackathon",
            "slide_count": 2,
            "created_at": "2025-01-01T00:00:00Z",
            "slides": [{"id": "a", "title": "A"}, {"id": "b", "title": "B"}],
        }))
        .unwrap();
        assert_eq!(deck.slide_ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(deck.created_at.is_some());
        assert_eq!(deck.slide("b").unwrap().title, "B");
    }
}
