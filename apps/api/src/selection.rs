//! Selection State: the per-slide committed layout choice.
//!
//! Per slide: `Unselected → Suggested → Confirmed → (invalidate) → Unselected`.
//! Any entry whose layout id is missing from the current layout set reads as
//! `Unselected`; stale ids are never handed downstream.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::layout::model::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Unselected,
    Suggested,
    Confirmed,
}

/// Mutations of a slide that may change its ranking and therefore clear its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideEvent {
    Edited,
    Regenerated,
    Reordered,
    ImagesChanged,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    layout_id: String,
    confirmed: bool,
}

/// One row of the selection handed to the document builder. A `None` layout lets the
/// builder pick its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSelection {
    pub slide_id: String,
    #[serde(default)]
    pub layout_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    entries: HashMap<String, Entry>,
}

impl SelectionState {
    /// Sets the slide to the top-ranked id unless it already holds one of the ranked ids.
    /// Since a ranking covers exactly the current layout set, an entry pointing outside
    /// it is stale and gets replaced. Returns whether the entry changed.
    pub fn suggest(&mut self, slide_id: &str, ranked_ids: &[String]) -> bool {
        let Some(top) = ranked_ids.first() else {
            return false;
        };
        if let Some(existing) = self.entries.get(slide_id) {
            if ranked_ids.contains(&existing.layout_id) {
                return false;
            }
        }
        self.entries.insert(
            slide_id.to_string(),
            Entry {
                layout_id: top.clone(),
                confirmed: false,
            },
        );
        true
    }

    /// Explicit user choice; always overrides a suggestion.
    pub fn select(&mut self, slide_id: &str, layout_id: &str) {
        self.entries.insert(
            slide_id.to_string(),
            Entry {
                layout_id: layout_id.to_string(),
                confirmed: true,
            },
        );
    }

    pub fn invalidate(&mut self, slide_id: &str) {
        self.entries.remove(slide_id);
    }

    /// Every `SlideEvent` can change a slide's content shape or position, so all of
    /// them invalidate.
    pub fn apply_event(&mut self, slide_id: &str, event: SlideEvent) {
        match event {
            SlideEvent::Edited
            | SlideEvent::Regenerated
            | SlideEvent::Reordered
            | SlideEvent::ImagesChanged
            | SlideEvent::Removed => self.invalidate(slide_id),
        }
    }

    /// Drops entries for slides no longer in the deck.
    pub fn retain_slides<'a>(&mut self, slide_ids: impl IntoIterator<Item = &'a str>) {
        let keep: HashSet<&str> = slide_ids.into_iter().collect();
        self.entries.retain(|id, _| keep.contains(id.as_str()));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The chosen layout id, if present and still in `layouts`.
    pub fn resolved(&self, slide_id: &str, layouts: &[Layout]) -> Option<&str> {
        self.entries
            .get(slide_id)
            .map(|e| e.layout_id.as_str())
            .filter(|id| layouts.iter().any(|l| l.id == *id))
    }

    pub fn status(&self, slide_id: &str, layouts: &[Layout]) -> SelectionStatus {
        match self.entries.get(slide_id) {
            Some(e) if self.resolved(slide_id, layouts).is_some() => {
                if e.confirmed {
                    SelectionStatus::Confirmed
                } else {
                    SelectionStatus::Suggested
                }
            }
            _ => SelectionStatus::Unselected,
        }
    }

    /// True iff every slide has a present entry referencing an existing layout.
    pub fn is_complete<'a>(
        &self,
        slide_ids: impl IntoIterator<Item = &'a str>,
        layouts: &[Layout],
    ) -> bool {
        slide_ids
            .into_iter()
            .all(|id| self.resolved(id, layouts).is_some())
    }

    /// Selection rows for the document builder, in `slide_ids` order.
    pub fn output<'a>(
        &self,
        slide_ids: impl IntoIterator<Item = &'a str>,
        layouts: &[Layout],
    ) -> Vec<SlideSelection> {
        slide_ids
            .into_iter()
            .map(|id| SlideSelection {
                slide_id: id.to_string(),
                layout_id: self.resolved(id, layouts).map(str::to_string),
            })
            .collect()
    }
}
