// Layout recommendation: frame model, fit scoring, ranking and stale-discard.
// Scoring and frames are pure and synchronous; only the remote ranking call suspends.

pub mod fit_scoring;
pub mod frame;
pub mod handlers;
pub mod model;
pub mod ranker;
pub mod session;

// Re-export the public API consumed by other modules (state, main, workspace).
pub use model::{builtin_library, LayoutLibrary};
pub use ranker::{LayoutRanker, RemoteRankingClient};
