pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::editor::handlers as editor;
use crate::layout::handlers as layouts;
use crate::state::AppState;
use crate::workspace::handlers as session;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout library + ranking
        .route("/api/v1/layouts", get(layouts::handle_list_layouts))
        .route("/api/v1/layouts/filter", post(layouts::handle_filter_layouts))
        .route("/api/v1/layouts/rank", post(layouts::handle_rank_layouts))
        .route("/api/v1/layouts/score", post(layouts::handle_score_layouts))
        .route(
            "/api/v1/layouts/:id/thumbnail",
            get(layouts::handle_layout_thumbnail),
        )
        // Stateless document build
        .route("/api/v1/editor/build", post(editor::handle_build))
        // Session workspace
        .route("/api/v1/session", get(session::handle_get_session))
        .route("/api/v1/session/deck", put(session::handle_load_deck))
        .route("/api/v1/session/reorder", post(session::handle_reorder))
        .route("/api/v1/session/suggest", post(session::handle_suggest_all))
        .route("/api/v1/session/build", post(session::handle_session_build))
        .route(
            "/api/v1/session/slides/:id",
            put(session::handle_replace_slide),
        )
        .route(
            "/api/v1/session/slides/:id/rank",
            post(session::handle_rank_slide),
        )
        .route(
            "/api/v1/session/slides/:id/events",
            post(session::handle_slide_event),
        )
        .route(
            "/api/v1/session/slides/:id/layout",
            put(session::handle_select_layout),
        )
        .with_state(state)
}
