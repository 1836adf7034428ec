//! Axum route handler for the stateless editor build.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::editor::build::{build_editor_doc, reject_warnings, BuildPolicy, EditorDoc};
use crate::errors::AppError;
use crate::models::deck::Deck;
use crate::selection::SlideSelection;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    pub deck: Deck,
    #[serde(default)]
    pub selections: Vec<SlideSelection>,
    #[serde(default)]
    pub policy: BuildPolicy,
    /// Fail with 422 instead of returning a document that carries warnings.
    #[serde(default)]
    pub warnings_as_errors: bool,
}

/// POST /api/v1/editor/build
///
/// Applies caller-provided selections to a deck. Unknown layout ids in `selections`
/// are dropped, not rejected.
pub async fn handle_build(
    State(state): State<AppState>,
    Json(request): Json<BuildRequest>,
) -> Result<Json<EditorDoc>, AppError> {
    let doc = build_editor_doc(
        &request.deck,
        &request.selections,
        &state.library.items,
        request.policy,
    )?;
    if request.warnings_as_errors {
        return Ok(Json(reject_warnings(doc)?));
    }
    Ok(Json(doc))
}
