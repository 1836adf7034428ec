//! Axum route handlers for the Layout API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::fit_scoring::FitBreakdown;
use crate::layout::frame::CANONICAL_CANVAS;
use crate::layout::model::{ContentShape, LayoutLibrary};
use crate::layout::ranker::{rank_local, recommended, RankResponse, RankingPath};
use crate::render::{render_thumbnail, Thumbnail};
use crate::state::AppState;

const DEFAULT_FILTER_TOP_K: i64 = 5;
const MAX_FILTER_TOP_K: i64 = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Content counts as sent by clients. Negative values are clamped to zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub text_count: i64,
    #[serde(default)]
    pub image_count: i64,
}

impl From<Components> for ContentShape {
    fn from(c: Components) -> Self {
        let clamp = |v: i64| v.clamp(0, u32::MAX as i64) as u32;
        ContentShape::new(clamp(c.text_count), clamp(c.image_count))
    }
}

fn default_filter_top_k() -> i64 {
    DEFAULT_FILTER_TOP_K
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub components: Components,
    /// Clamped into `1..=20`; out-of-range values are not an error.
    #[serde(default = "default_filter_top_k")]
    pub top_k: i64,
}

#[derive(Debug, Deserialize)]
pub struct RankLayoutsRequest {
    #[serde(default)]
    pub components: Components,
    /// Size of the recommended window; defaults to `RANKING_TOP_K`.
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankLayoutsResponse {
    pub ids: Vec<String>,
    pub path: RankingPath,
    pub recommended: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub shape: ContentShape,
    pub scores: Vec<FitBreakdown>,
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    #[serde(default)]
    pub width: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ThumbnailResponse {
    pub thumbnail: Thumbnail,
    pub svg: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/layouts
pub async fn handle_list_layouts(State(state): State<AppState>) -> Json<LayoutLibrary> {
    Json(state.library.as_ref().clone())
}

/// POST /api/v1/layouts/filter
///
/// Server-side ranking of the loaded library with the local fit scorer. This is the
/// endpoint other instances point `RANKING_SERVICE_URL` at.
pub async fn handle_filter_layouts(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Json<RankResponse> {
    let shape = ContentShape::from(request.components);
    let top_k = request.top_k.clamp(1, MAX_FILTER_TOP_K) as usize;

    let mut candidates = rank_local(state.ranker.scorer(), &state.library.items, shape);
    candidates.truncate(top_k);

    Json(RankResponse { candidates })
}

/// POST /api/v1/layouts/rank
///
/// Full reconciled ranking through the configured ranker (remote first, local fallback).
pub async fn handle_rank_layouts(
    State(state): State<AppState>,
    Json(request): Json<RankLayoutsRequest>,
) -> Json<RankLayoutsResponse> {
    let shape = ContentShape::from(request.components);
    let ranking = state.ranker.rank(&state.library.items, shape).await;
    let top_k = request.top_k.unwrap_or(state.config.ranking_top_k);
    let recommended = recommended(&ranking.ids, top_k, request.selected.as_deref());

    Json(RankLayoutsResponse {
        ids: ranking.ids,
        path: ranking.path,
        recommended,
    })
}

/// POST /api/v1/layouts/score
///
/// Explains the local ordering: one breakdown per layout, cheapest first.
pub async fn handle_score_layouts(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Json<ScoreResponse> {
    let shape = ContentShape::from(request.components);
    let mut scores: Vec<FitBreakdown> = state
        .library
        .items
        .iter()
        .map(|l| state.ranker.scorer().breakdown(l, shape))
        .collect();
    scores.sort_by(|a, b| a.cost.total_cmp(&b.cost));

    Json(ScoreResponse { shape, scores })
}

/// GET /api/v1/layouts/:id/thumbnail?width=320
pub async fn handle_layout_thumbnail(
    State(state): State<AppState>,
    Path(layout_id): Path<String>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Json<ThumbnailResponse>, AppError> {
    let layout = state
        .library
        .get(&layout_id)
        .ok_or_else(|| AppError::NotFound(format!("Layout {layout_id} not found")))?;

    let thumbnail = render_thumbnail(layout, query.width.unwrap_or(320.0), CANONICAL_CANVAS);
    let svg = thumbnail.to_svg();

    Ok(Json(ThumbnailResponse { thumbnail, svg }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::build_router;
    use crate::state::tests::test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let app = build_router(test_state());
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[test]
    fn test_negative_components_clamp_to_zero() {
        let shape = ContentShape::from(Components {
            text_count: -3,
            image_count: 2,
        });
        assert_eq!(shape, ContentShape::new(0, 2));
    }

    #[tokio::test]
    async fn test_list_layouts_returns_pagination() {
        let (status, body) = call("GET", "/api/v1/layouts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["page"], 1);
        assert_eq!(body["items"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_filter_ranks_and_clamps_top_k() {
        let (status, body) = call(
            "POST",
            "/api/v1/layouts/filter",
            Some(json!({"components": {"text_count": 0, "image_count": 1}, "top_k": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidates"], json!(["title_image_right"]));
    }

    #[tokio::test]
    async fn test_filter_negative_and_oversized_top_k_are_clamped() {
        let (status, body) = call(
            "POST",
            "/api/v1/layouts/filter",
            Some(json!({"components": {"text_count": 0, "image_count": 1}, "top_k": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidates"], json!(["title_image_right"]));

        let (status, body) = call(
            "POST",
            "/api/v1/layouts/filter",
            Some(json!({"components": {"text_count": 3, "image_count": 0}, "top_k": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rank_is_total_and_moves_selected_first() {
        let (status, body) = call(
            "POST",
            "/api/v1/layouts/rank",
            Some(json!({
                "components": {"text_count": 4, "image_count": 1},
                "top_k": 2,
                "selected": "title_bullets_left",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], "local");
        assert_eq!(body["ids"].as_array().unwrap().len(), 3);
        assert_eq!(body["recommended"][0], "title_bullets_left");
        assert_eq!(body["recommended"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_score_sorted_by_cost() {
        let (_, body) = call(
            "POST",
            "/api/v1/layouts/score",
            Some(json!({"components": {"text_count": 20, "image_count": 0}})),
        )
        .await;
        let costs: Vec<f64> = body["scores"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["cost"].as_f64().unwrap())
            .collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_thumbnail_unknown_layout_is_404() {
        let (status, body) = call("GET", "/api/v1/layouts/nope/thumbnail", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_thumbnail_scales_to_width() {
        let (status, body) = call(
            "GET",
            "/api/v1/layouts/title_bullets_left/thumbnail?width=640",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["thumbnail"]["height"], 360.0);
        assert!(body["svg"].as_str().unwrap().starts_with("<svg"));
    }
}
