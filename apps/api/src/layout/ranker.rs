//! Layout Ranker: orders a layout set for a content shape.
//!
//! Two paths feed one output type:
//! - remote: a `RankingSource` (normally `RemoteRankingClient`) returns candidate ids best-first;
//! - local: stable sort of the layout set by fit cost.
//!
//! Whichever path ran, the result goes through `reconcile`, so a `Ranking` is always a
//! permutation of exactly the ids in the layout set. Remote failures never reach the caller.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::fit_scoring::{CapacityFitScorer, FitScorer};
use crate::layout::model::{ContentShape, Layout};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ranking service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed ranking payload: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types shared with the ranking service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    pub components: ContentShape,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub candidates: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Remote path
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can produce an authoritative best-first candidate list.
#[async_trait]
pub trait RankingSource: Send + Sync {
    async fn candidates(
        &self,
        shape: ContentShape,
        top_k: usize,
    ) -> Result<Vec<String>, RankingError>;
}

/// HTTP client for a `POST .../layouts/filter` ranking endpoint.
#[derive(Clone)]
pub struct RemoteRankingClient {
    client: Client,
    endpoint: String,
}

impl RemoteRankingClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RankingError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RankingSource for RemoteRankingClient {
    async fn candidates(
        &self,
        shape: ContentShape,
        top_k: usize,
    ) -> Result<Vec<String>, RankingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RankRequest {
                components: shape,
                top_k,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RankingError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: RankResponse = serde_json::from_str(&body)?;
        Ok(parsed.candidates)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranker
// ────────────────────────────────────────────────────────────────────────────

/// Which path produced a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPath {
    Remote,
    Local,
}

/// A total, best-first ordering over one layout set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub ids: Vec<String>,
    pub path: RankingPath,
}

#[derive(Clone)]
pub struct LayoutRanker {
    remote: Option<Arc<dyn RankingSource>>,
    scorer: Arc<dyn FitScorer>,
}

impl LayoutRanker {
    /// Local-only ranker using the default capacity scorer.
    pub fn local() -> Self {
        Self {
            remote: None,
            scorer: Arc::new(CapacityFitScorer),
        }
    }

    pub fn with_remote(remote: Arc<dyn RankingSource>) -> Self {
        Self {
            remote: Some(remote),
            ..Self::local()
        }
    }

    pub fn scorer(&self) -> &dyn FitScorer {
        self.scorer.as_ref()
    }

    /// Ranks `layouts` for `shape`. Never fails: a remote error falls through to the
    /// local heuristic, and an empty layout set gives an empty ranking.
    pub async fn rank(&self, layouts: &[Layout], shape: ContentShape) -> Ranking {
        if layouts.is_empty() {
            return Ranking {
                ids: vec![],
                path: RankingPath::Local,
            };
        }

        if let Some(remote) = &self.remote {
            let top_k = layouts.len().max(1);
            match remote.candidates(shape, top_k).await {
                Ok(candidates) => {
                    debug!(
                        "Remote ranking returned {} candidates for {:?}",
                        candidates.len(),
                        shape
                    );
                    return Ranking {
                        ids: reconcile(&candidates, layouts),
                        path: RankingPath::Remote,
                    };
                }
                Err(e) => {
                    warn!("Remote ranking unavailable, using local fallback: {e}");
                }
            }
        }

        let local = rank_local(self.scorer.as_ref(), layouts, shape);
        Ranking {
            ids: reconcile(&local, layouts),
            path: RankingPath::Local,
        }
    }
}

/// Stable sort by fit cost; equal costs keep their input order.
pub fn rank_local(scorer: &dyn FitScorer, layouts: &[Layout], shape: ContentShape) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = layouts
        .iter()
        .map(|l| (scorer.score(l, shape), l.id.as_str()))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, id)| id.to_string()).collect()
}

/// Keeps candidate ids that exist in `layouts` (first occurrence only), then appends
/// every remaining layout id in its original order.
pub fn reconcile(candidates: &[String], layouts: &[Layout]) -> Vec<String> {
    let known: HashSet<&str> = layouts.iter().map(|l| l.id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(layouts.len());
    let mut merged = Vec::with_capacity(layouts.len());

    for id in candidates {
        if known.contains(id.as_str()) && seen.insert(id.as_str()) {
            merged.push(id.clone());
        }
    }
    for layout in layouts {
        if seen.insert(layout.id.as_str()) {
            merged.push(layout.id.clone());
        }
    }
    merged
}

/// The first `top_k` ranked ids; if `selected` is inside that window it is moved
/// to the front.
pub fn recommended(ranked: &[String], top_k: usize, selected: Option<&str>) -> Vec<String> {
    let mut top: Vec<String> = ranked.iter().take(top_k).cloned().collect();
    if let Some(sel) = selected {
        if let Some(idx) = top.iter().position(|id| id == sel) {
            let chosen = top.remove(idx);
            top.insert(0, chosen);
        }
    }
    top
}
