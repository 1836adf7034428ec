use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::layout::model::LayoutLibrary;
use crate::layout::ranker::LayoutRanker;
use crate::workspace::DeckWorkspace;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup, read-only afterwards.
    pub library: Arc<LayoutLibrary>,
    /// Remote-first ranker with local fallback. Remote is absent when
    /// `RANKING_SERVICE_URL` is unset.
    pub ranker: LayoutRanker,
    /// Session-scoped editing state. Never locked across an await.
    pub workspace: Arc<Mutex<DeckWorkspace>>,
}

impl AppState {
    pub fn new(config: Config, library: LayoutLibrary, ranker: LayoutRanker) -> Self {
        Self {
            config,
            library: Arc::new(library),
            ranker,
            workspace: Arc::new(Mutex::new(DeckWorkspace::new())),
        }
    }
}
