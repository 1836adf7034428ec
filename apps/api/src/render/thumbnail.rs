//! Layout thumbnails.
//!
//! Every frame is scaled by `target_width / canvas.width`, so the canonical aspect ratio
//! is preserved. Each role gets its own box style. No I/O, no state.

use std::fmt::Write;

use serde::Serialize;

use crate::layout::frame::{Canvas, Frame, FrameRole};
use crate::layout::model::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
}

pub fn style_for(role: FrameRole) -> BoxStyle {
    match role {
        FrameRole::Title => BoxStyle {
            fill: "#0f172a",
            stroke: "none",
        },
        FrameRole::Text => BoxStyle {
            fill: "rgba(251,191,36,0.22)",
            stroke: "rgba(245,158,11,0.55)",
        },
        FrameRole::Image => BoxStyle {
            fill: "rgba(59,130,246,0.18)",
            stroke: "rgba(59,130,246,0.35)",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbBox {
    pub role: FrameRole,
    pub frame: Frame,
    pub style: BoxStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub layout_id: String,
    pub label: String,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub boxes: Vec<ThumbBox>,
}

/// Scales `layout`'s frames to `target_width` pixels. A non-positive width (or a
/// degenerate canvas) renders at canonical size.
pub fn render_thumbnail(layout: &Layout, target_width: f64, canvas: Canvas) -> Thumbnail {
    let canvas = if canvas.width > 0.0 && canvas.height > 0.0 {
        canvas
    } else {
        Canvas::default()
    };
    let width = if target_width > 0.0 && target_width.is_finite() {
        target_width
    } else {
        canvas.width
    };
    let scale = width / canvas.width;

    let boxes = layout
        .frames
        .iter()
        .map(|(role, frame)| ThumbBox {
            role,
            frame: frame.scaled(scale),
            style: style_for(role),
        })
        .collect();

    Thumbnail {
        layout_id: layout.id.clone(),
        label: layout.name.clone(),
        width,
        height: (canvas.height * scale).round(),
        scale,
        boxes,
    }
}

impl Thumbnail {
    /// Minimal standalone SVG for the preview grid.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
            self.width, self.height
        );
        for b in &self.boxes {
            let _ = write!(
                svg,
                r#"<rect class="{role}" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" rx="{rx:.2}" fill="{fill}" stroke="{stroke}"/>"#,
                role = role_class(b.role),
                x = b.frame.x,
                y = b.frame.y,
                w = b.frame.w,
                h = b.frame.h,
                rx = 8.0 * self.scale,
                fill = b.style.fill,
                stroke = b.style.stroke,
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

fn role_class(role: FrameRole) -> &'static str {
    match role {
        FrameRole::Title => "title",
        FrameRole::Text => "text",
        FrameRole::Image => "image",
    }
}
