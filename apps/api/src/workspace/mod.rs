//! Deck workspace: the session-scoped editing state for one deck.
//!
//! Holds the current deck, the selection state and the stale-discard ranking board.
//! Every mutation that can change a slide's ranking goes through `apply_event`, which
//! clears that slide's selection and displayed ranking in one place.
//!
//! The workspace is never held across an await: callers take a ticket with
//! `begin_rank`, release it, await the ranker, and hand the result back via
//! `finish_rank`.

pub mod handlers;

use serde::Serialize;
use thiserror::Error;

use crate::layout::model::{ContentShape, Layout};
use crate::layout::ranker::Ranking;
use crate::layout::session::{RankTicket, RankingBoard};
use crate::models::deck::{Deck, Slide};
use crate::selection::{SelectionState, SelectionStatus, SlideEvent, SlideSelection};

#[derive(Debug, Error, PartialEq)]
pub enum WorkspaceError {
    #[error("no deck loaded")]
    NoDeck,

    #[error("slide {0} not found")]
    UnknownSlide(String),

    #[error("layout {0} not found")]
    UnknownLayout(String),

    #[error("new order must list every slide exactly once")]
    InvalidOrder,

    #[error("{0} slide(s) still need a layout")]
    Incomplete(usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct SlideStatusView {
    pub slide_id: String,
    pub title: String,
    pub shape: ContentShape,
    pub status: SelectionStatus,
    pub layout_id: Option<String>,
    pub ranking: Option<Ranking>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub slides: Vec<SlideStatusView>,
    pub complete: bool,
}

#[derive(Debug, Default)]
pub struct DeckWorkspace {
    deck: Option<Deck>,
    selection: SelectionState,
    board: RankingBoard,
}

impl DeckWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deck(&self) -> Result<&Deck, WorkspaceError> {
        self.deck.as_ref().ok_or(WorkspaceError::NoDeck)
    }

    fn deck_mut(&mut self) -> Result<&mut Deck, WorkspaceError> {
        self.deck.as_mut().ok_or(WorkspaceError::NoDeck)
    }

    fn slide(&self, slide_id: &str) -> Result<&Slide, WorkspaceError> {
        self.deck()?
            .slide(slide_id)
            .ok_or_else(|| WorkspaceError::UnknownSlide(slide_id.to_string()))
    }

    /// Replaces the deck. The slide set changed wholesale, so nothing carries over.
    pub fn load_deck(&mut self, deck: Deck) {
        self.selection.clear();
        self.board.clear();
        self.deck = Some(deck);
    }

    /// Clears the slide's selection and displayed ranking; `Removed` also drops the slide.
    pub fn apply_event(&mut self, slide_id: &str, event: SlideEvent) -> Result<(), WorkspaceError> {
        self.slide(slide_id)?;
        self.selection.apply_event(slide_id, event);
        self.board.forget(slide_id);

        if event == SlideEvent::Removed {
            if let Some(deck) = self.deck.as_mut() {
                deck.slides.retain(|s| s.id != slide_id);
                deck.slide_count = deck.slides.len();
                self.selection.retain_slides(deck.slide_ids());
            }
        }
        Ok(())
    }

    /// Swaps in new content for an existing slide.
    pub fn replace_slide(&mut self, slide: Slide) -> Result<(), WorkspaceError> {
        let previous = self.slide(&slide.id)?;
        let event = if previous.media() != slide.media() && previous.bullets() == slide.bullets() {
            SlideEvent::ImagesChanged
        } else {
            SlideEvent::Edited
        };
        let slide_id = slide.id.clone();

        let deck = self.deck_mut()?;
        if let Some(existing) = deck.slides.iter_mut().find(|s| s.id == slide_id) {
            *existing = slide;
        }
        self.apply_event(&slide_id, event)
    }

    /// Reorders slides to `order`; every slide whose position changed is invalidated.
    pub fn reorder(&mut self, order: &[String]) -> Result<(), WorkspaceError> {
        let deck = self.deck()?;
        let mut current: Vec<&str> = deck.slide_ids().collect();
        let mut wanted: Vec<&str> = order.iter().map(String::as_str).collect();
        current.sort_unstable();
        wanted.sort_unstable();
        if current != wanted {
            return Err(WorkspaceError::InvalidOrder);
        }

        let moved: Vec<String> = deck
            .slides
            .iter()
            .zip(order)
            .filter(|(slide, id)| slide.id != **id)
            .map(|(slide, _)| slide.id.clone())
            .collect();

        let deck = self.deck_mut()?;
        let mut slides = std::mem::take(&mut deck.slides);
        deck.slides = order
            .iter()
            .filter_map(|id| {
                let pos = slides.iter().position(|s| &s.id == id)?;
                Some(slides.swap_remove(pos))
            })
            .collect();

        for id in moved {
            self.apply_event(&id, SlideEvent::Reordered)?;
        }
        Ok(())
    }

    /// Starts a ranking request for a slide.
    pub fn begin_rank(&mut self, slide_id: &str) -> Result<(RankTicket, ContentShape), WorkspaceError> {
        let shape = self.slide(slide_id)?.content_shape();
        Ok((self.board.issue(slide_id), shape))
    }

    /// Applies a finished ranking if it is still the latest for its slide.
    pub fn finish_rank(&mut self, ticket: RankTicket, ranking: Ranking) -> bool {
        self.board.complete(ticket, ranking)
    }

    /// Auto-assigns the top candidate of the slide's displayed ranking, if any.
    pub fn suggest(&mut self, slide_id: &str) -> Result<bool, WorkspaceError> {
        self.slide(slide_id)?;
        let ranked = match self.board.displayed(slide_id) {
            Some(ranking) => ranking.ids.clone(),
            None => return Ok(false),
        };
        Ok(self.selection.suggest(slide_id, &ranked))
    }

    pub fn select(
        &mut self,
        slide_id: &str,
        layout_id: &str,
        layouts: &[Layout],
    ) -> Result<(), WorkspaceError> {
        self.slide(slide_id)?;
        if !layouts.iter().any(|l| l.id == layout_id) {
            return Err(WorkspaceError::UnknownLayout(layout_id.to_string()));
        }
        self.selection.select(slide_id, layout_id);
        Ok(())
    }

    pub fn is_complete(&self, layouts: &[Layout]) -> bool {
        match &self.deck {
            Some(deck) => self.selection.is_complete(deck.slide_ids(), layouts),
            None => false,
        }
    }

    /// Selection rows for the builder; fails unless every slide is suggested or confirmed.
    pub fn selections_for_build(
        &self,
        layouts: &[Layout],
    ) -> Result<Vec<SlideSelection>, WorkspaceError> {
        let deck = self.deck()?;
        let missing = deck
            .slide_ids()
            .filter(|id| self.selection.resolved(id, layouts).is_none())
            .count();
        if missing > 0 {
            return Err(WorkspaceError::Incomplete(missing));
        }
        Ok(self.selection.output(deck.slide_ids(), layouts))
    }

    pub fn summary(&self, layouts: &[Layout]) -> WorkspaceSummary {
        let slides = self
            .deck
            .iter()
            .flat_map(|d| d.slides.iter())
            .map(|s| SlideStatusView {
                slide_id: s.id.clone(),
                title: s.title.clone(),
                shape: s.content_shape(),
                status: self.selection.status(&s.id, layouts),
                layout_id: self.selection.resolved(&s.id, layouts).map(str::to_string),
                ranking: self.board.displayed(&s.id).cloned(),
            })
            .collect();

        WorkspaceSummary {
            slides,
            complete: self.is_complete(layouts),
        }
    }
}
