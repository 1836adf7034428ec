//! Axum route handlers for the session workspace.

use std::sync::MutexGuard;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::editor::{build_editor_doc, reject_warnings, BuildPolicy, EditorDoc};
use crate::errors::AppError;
use crate::layout::ranker::{recommended, Ranking};
use crate::models::deck::{Deck, Slide};
use crate::selection::SlideEvent;
use crate::state::AppState;
use crate::workspace::{DeckWorkspace, WorkspaceSummary};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RankSlideResponse {
    pub slide_id: String,
    pub seq: u64,
    /// False when a newer request for the same slide was issued meanwhile.
    pub applied: bool,
    pub ranking: Ranking,
    pub recommended: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlideEventRequest {
    pub event: SlideEvent,
}

#[derive(Debug, Deserialize)]
pub struct SelectLayoutRequest {
    pub layout_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionBuildRequest {
    #[serde(default)]
    pub policy: BuildPolicy,
    #[serde(default)]
    pub warnings_as_errors: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn lock(state: &AppState) -> Result<MutexGuard<'_, DeckWorkspace>, AppError> {
    state
        .workspace
        .lock()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("workspace lock poisoned")))
}

/// Issues a ticket, ranks without holding the lock, then applies the result only if
/// the ticket is still current.
async fn rank_slide(state: &AppState, slide_id: &str) -> Result<(u64, bool, Ranking), AppError> {
    let (ticket, shape) = {
        let mut ws = lock(state)?;
        ws.begin_rank(slide_id)?
    };
    let seq = ticket.seq;

    let ranking = state.ranker.rank(&state.library.items, shape).await;

    let applied = {
        let mut ws = lock(state)?;
        ws.finish_rank(ticket, ranking.clone())
    };
    debug!("Ranked slide {slide_id} (seq {seq}, applied: {applied})");
    Ok((seq, applied, ranking))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    Ok(Json(lock(&state)?.summary(&state.library.items)))
}

/// PUT /api/v1/session/deck
pub async fn handle_load_deck(
    State(state): State<AppState>,
    Json(deck): Json<Deck>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    info!("Loading deck with {} slides", deck.slides.len());
    let mut ws = lock(&state)?;
    ws.load_deck(deck);
    Ok(Json(ws.summary(&state.library.items)))
}

/// POST /api/v1/session/slides/:id/rank
pub async fn handle_rank_slide(
    State(state): State<AppState>,
    Path(slide_id): Path<String>,
) -> Result<Json<RankSlideResponse>, AppError> {
    let (seq, applied, ranking) = rank_slide(&state, &slide_id).await?;

    let selected = {
        let ws = lock(&state)?;
        ws.summary(&state.library.items)
            .slides
            .into_iter()
            .find(|s| s.slide_id == slide_id)
            .and_then(|s| s.layout_id)
    };
    let recommended = recommended(&ranking.ids, state.config.ranking_top_k, selected.as_deref());

    Ok(Json(RankSlideResponse {
        slide_id,
        seq,
        applied,
        ranking,
        recommended,
    }))
}

/// PUT /api/v1/session/slides/:id
pub async fn handle_replace_slide(
    State(state): State<AppState>,
    Path(slide_id): Path<String>,
    Json(slide): Json<Slide>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    if slide.id != slide_id {
        return Err(AppError::Validation(format!(
            "slide id {} does not match path {slide_id}",
            slide.id
        )));
    }
    let mut ws = lock(&state)?;
    ws.replace_slide(slide)?;
    Ok(Json(ws.summary(&state.library.items)))
}

/// POST /api/v1/session/slides/:id/events
pub async fn handle_slide_event(
    State(state): State<AppState>,
    Path(slide_id): Path<String>,
    Json(request): Json<SlideEventRequest>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    let mut ws = lock(&state)?;
    ws.apply_event(&slide_id, request.event)?;
    Ok(Json(ws.summary(&state.library.items)))
}

/// PUT /api/v1/session/slides/:id/layout
pub async fn handle_select_layout(
    State(state): State<AppState>,
    Path(slide_id): Path<String>,
    Json(request): Json<SelectLayoutRequest>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    let mut ws = lock(&state)?;
    ws.select(&slide_id, &request.layout_id, &state.library.items)?;
    Ok(Json(ws.summary(&state.library.items)))
}

/// POST /api/v1/session/reorder
pub async fn handle_reorder(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    let mut ws = lock(&state)?;
    ws.reorder(&request.order)?;
    Ok(Json(ws.summary(&state.library.items)))
}

/// POST /api/v1/session/suggest
///
/// Ranks every slide and fills empty selections with the top candidate.
/// Confirmed choices are left alone.
pub async fn handle_suggest_all(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    let slide_ids: Vec<String> = {
        let ws = lock(&state)?;
        ws.deck()?.slide_ids().map(str::to_string).collect()
    };

    for slide_id in &slide_ids {
        let (_, applied, _) = rank_slide(&state, slide_id).await?;
        if applied {
            let mut ws = lock(&state)?;
            ws.suggest(slide_id)?;
        }
    }

    let ws = lock(&state)?;
    Ok(Json(ws.summary(&state.library.items)))
}

/// POST /api/v1/session/build
///
/// Gated on every slide having a suggested or confirmed layout.
pub async fn handle_session_build(
    State(state): State<AppState>,
    Json(request): Json<SessionBuildRequest>,
) -> Result<Json<EditorDoc>, AppError> {
    let ws = lock(&state)?;
    let selections = ws.selections_for_build(&state.library.items)?;
    let doc = build_editor_doc(ws.deck()?, &selections, &state.library.items, request.policy)?;
    if request.warnings_as_errors {
        return Ok(Json(reject_warnings(doc)?));
    }
    Ok(Json(doc))
}
