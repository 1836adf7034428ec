// Document build: applies per-slide layout selections to a deck and produces an
// editor document of positioned layers.

pub mod build;
pub mod handlers;

pub use build::{build_editor_doc, reject_warnings, BuildPolicy, EditorDoc};
