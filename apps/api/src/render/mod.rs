// Thumbnail rendering: pure geometry from layout frames to preview boxes.

pub mod thumbnail;

pub use thumbnail::{render_thumbnail, Thumbnail};
