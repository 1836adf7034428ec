//! Editor document construction.
//!
//! Selections are consumed defensively: an entry naming a layout outside the library is
//! dropped (with a warning) and the slide falls back to `DEFAULT_LAYOUT_ID`. Only when
//! that default is itself unavailable does the policy matter: `best_fit` substitutes the
//! heaviest layout, `strict` fails.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::layout::frame::{Canvas, Frame, CANONICAL_CANVAS};
use crate::layout::model::{heaviest, Layout};
use crate::models::deck::{Deck, Slide};
use crate::selection::SlideSelection;

pub const DEFAULT_LAYOUT_ID: &str = "title_bullets_left";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPolicy {
    #[default]
    BestFit,
    Strict,
}

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("no layout available for slide {slide_id} (wanted '{layout_id}')")]
    UnknownLayout { slide_id: String, layout_id: String },

    #[error("layout library is empty")]
    NoLayouts,

    #[error("build produced warnings: {}", .0.join(", "))]
    WarningsAsErrors(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Textbox,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorLayer {
    pub id: String,
    pub kind: LayerKind,
    pub frame: Frame,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    pub z: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSlide {
    pub slide_id: String,
    pub name: String,
    pub layout_id: String,
    pub layers: Vec<EditorLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildWarning {
    pub slide_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorDoc {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub version: String,
    pub page: Canvas,
    pub slides: Vec<EditorSlide>,
    pub warnings: Vec<BuildWarning>,
}

pub fn build_editor_doc(
    deck: &Deck,
    selections: &[SlideSelection],
    layouts: &[Layout],
    policy: BuildPolicy,
) -> Result<EditorDoc, BuildError> {
    if layouts.is_empty() && !deck.slides.is_empty() {
        return Err(BuildError::NoLayouts);
    }

    let by_id: HashMap<&str, &Layout> = layouts.iter().map(|l| (l.id.as_str(), l)).collect();
    let chosen: HashMap<&str, Option<&str>> = selections
        .iter()
        .map(|s| (s.slide_id.as_str(), s.layout_id.as_deref()))
        .collect();

    let mut warnings = Vec::new();
    let mut slides = Vec::with_capacity(deck.slides.len());

    for slide in &deck.slides {
        let requested = chosen.get(slide.id.as_str()).copied().flatten();
        let requested = match requested {
            Some(id) if by_id.contains_key(id) => Some(id),
            Some(id) => {
                warnings.push(BuildWarning {
                    slide_id: slide.id.clone(),
                    reason: "stale_selection_dropped".to_string(),
                    layout_id: Some(id.to_string()),
                });
                None
            }
            None => None,
        };

        let wanted = requested.unwrap_or(DEFAULT_LAYOUT_ID);
        let layout = match by_id.get(wanted) {
            Some(layout) => *layout,
            None => match policy {
                BuildPolicy::Strict => {
                    return Err(BuildError::UnknownLayout {
                        slide_id: slide.id.clone(),
                        layout_id: wanted.to_string(),
                    })
                }
                BuildPolicy::BestFit => {
                    let fallback = heaviest(layouts).ok_or(BuildError::NoLayouts)?;
                    warnings.push(BuildWarning {
                        slide_id: slide.id.clone(),
                        reason: "unknown_layout_best_fit_substitution".to_string(),
                        layout_id: Some(fallback.id.clone()),
                    });
                    fallback
                }
            },
        };

        slides.push(apply_layout(slide, layout, &mut warnings));
    }

    Ok(EditorDoc {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        version: deck.version.clone(),
        page: CANONICAL_CANVAS,
        slides,
        warnings,
    })
}

/// Turns a warning-bearing document into an error, for callers that build with
/// `warnings_as_errors`. Each reason is reported as `slide_id:reason`.
pub fn reject_warnings(doc: EditorDoc) -> Result<EditorDoc, BuildError> {
    if doc.warnings.is_empty() {
        return Ok(doc);
    }
    Err(BuildError::WarningsAsErrors(
        doc.warnings
            .iter()
            .map(|w| format!("{}:{}", w.slide_id, w.reason))
            .collect(),
    ))
}

fn apply_layout(slide: &Slide, layout: &Layout, warnings: &mut Vec<BuildWarning>) -> EditorSlide {
    let mut layers = Vec::new();

    if let Some(frame) = layout.frames.title {
        layers.push(EditorLayer {
            id: format!("ly_{}_title", slide.id),
            kind: LayerKind::Textbox,
            frame,
            text: Some(slide.title.clone()),
            src: None,
            alt: None,
            z: 10,
        });
    }

    let bullets = slide.bullets();
    if let (Some(frame), false) = (layout.frames.text.first(), bullets.is_empty()) {
        let text = bullets
            .iter()
            .map(|b| format!("- {b}"))
            .collect::<Vec<_>>()
            .join("\n");
        layers.push(EditorLayer {
            id: format!("ly_{}_bullets", slide.id),
            kind: LayerKind::Textbox,
            frame: *frame,
            text: Some(text),
            src: None,
            alt: None,
            z: 9,
        });
    }

    let media = slide.media();
    for (idx, (item, frame)) in media.iter().zip(&layout.frames.images).enumerate() {
        layers.push(EditorLayer {
            id: format!("ly_{}_img{idx}", slide.id),
            kind: LayerKind::Image,
            frame: *frame,
            text: None,
            src: Some(item.url.clone()),
            alt: item.alt.clone(),
            z: 5,
        });
    }
    if media.len() > layout.frames.images.len() {
        warnings.push(BuildWarning {
            slide_id: slide.id.clone(),
            reason: "images_exceed_frames".to_string(),
            layout_id: Some(layout.id.clone()),
        });
    }

    EditorSlide {
        slide_id: slide.id.clone(),
        name: slide.title.clone(),
        layout_id: layout.id.clone(),
        layers,
    }
}
