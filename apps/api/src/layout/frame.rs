//! Frame Model: rectangular regions on the canonical slide canvas.
//!
//! Layout records arrive from the library in a loose shape: the text role may be
//! called `text` or `bullets`, any role may be a single frame or an array, and roles
//! a layout does not use are simply missing. `FrameSet` normalises all of that into
//! `{ title?, text[], images[] }` once, at deserialisation time, so nothing downstream
//! has to care.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The canonical canvas every layout is authored against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

pub const CANONICAL_CANVAS: Canvas = Canvas {
    width: 1280.0,
    height: 720.0,
};

impl Default for Canvas {
    fn default() -> Self {
        CANONICAL_CANVAS
    }
}

/// A rectangle `{x, y, w, h}` in canonical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// True when every coordinate is finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// True when the frame lies entirely inside `canvas`.
    pub fn fits_within(&self, canvas: &Canvas) -> bool {
        self.is_well_formed()
            && self.x + self.w <= canvas.width
            && self.y + self.h <= canvas.height
    }

    /// Uniformly scales every coordinate by `factor`.
    pub fn scaled(&self, factor: f64) -> Frame {
        Frame {
            x: self.x * factor,
            y: self.y * factor,
            w: self.w * factor,
            h: self.h * factor,
        }
    }

    /// Parses a single frame object. Anything that is not an object with four
    /// numeric, non-negative fields yields `None`.
    fn from_value(value: &Value) -> Option<Frame> {
        let obj = value.as_object()?;
        let field = |k: &str| obj.get(k).and_then(Value::as_f64);
        let frame = Frame {
            x: field("x")?,
            y: field("y")?,
            w: field("w")?,
            h: field("h")?,
        };
        frame.is_well_formed().then_some(frame)
    }
}

/// Region role a frame is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRole {
    Title,
    Text,
    Image,
}

/// Normalised frames of one layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSet {
    pub title: Option<Frame>,
    pub text: Vec<Frame>,
    pub images: Vec<Frame>,
}

impl FrameSet {
    /// Builds a `FrameSet` from whatever the library record carried under `frames`.
    /// A missing, null, or non-object value gives an empty set.
    pub fn from_value(value: &Value) -> FrameSet {
        let Some(obj) = value.as_object() else {
            return FrameSet::default();
        };

        let title = obj
            .get("title")
            .map(frames_of)
            .and_then(|frames| frames.into_iter().next());

        // `text` wins over the legacy `bullets` key when both are present and non-null.
        let text = match obj.get("text") {
            Some(v) if !v.is_null() => frames_of(v),
            _ => obj.get("bullets").map(frames_of).unwrap_or_default(),
        };

        let images = obj.get("images").map(frames_of).unwrap_or_default();

        FrameSet {
            title,
            text,
            images,
        }
    }

    /// Iterates over every frame with its role, title first.
    pub fn iter(&self) -> impl Iterator<Item = (FrameRole, &Frame)> {
        self.title
            .iter()
            .map(|f| (FrameRole::Title, f))
            .chain(self.text.iter().map(|f| (FrameRole::Text, f)))
            .chain(self.images.iter().map(|f| (FrameRole::Image, f)))
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.text.is_empty() && self.images.is_empty()
    }

    /// Frames that fall outside `canvas`, for library validation.
    pub fn out_of_bounds(&self, canvas: &Canvas) -> Vec<(FrameRole, Frame)> {
        self.iter()
            .filter(|(_, f)| !f.fits_within(canvas))
            .map(|(role, f)| (role, *f))
            .collect()
    }
}

impl<'de> Deserialize<'de> for FrameSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(FrameSet::from_value(&value))
    }
}

/// Accepts a single frame or an array of frames; drops malformed entries.
fn frames_of(value: &Value) -> Vec<Frame> {
    match value {
        Value::Array(items) => items.iter().filter_map(Frame::from_value).collect(),
        Value::Null => vec![],
        other => Frame::from_value(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bullets_key_maps_to_text() {
        let set = FrameSet::from_value(&json!({
            "title": {"x": 80, "y": 64, "w": 1120, "h": 80},
            "bullets": [{"x": 80, "y": 170, "w": 720, "h": 360}],
        }));
        assert_eq!(set.title, Some(Frame::new(80.0, 64.0, 1120.0, 80.0)));
        assert_eq!(set.text.len(), 1);
        assert!(set.images.is_empty());
    }

    #[test]
    fn test_single_object_becomes_one_element_array() {
        let set = FrameSet::from_value(&json!({
            "images": {"x": 840, "y": 140, "w": 360, "h": 360},
        }));
        assert_eq!(set.images, vec![Frame::new(840.0, 140.0, 360.0, 360.0)]);
    }

    #[test]
    fn test_text_preferred_over_bullets() {
        let set = FrameSet::from_value(&json!({
            "text": [{"x": 1, "y": 1, "w": 1, "h": 1}],
            "bullets": [{"x": 2, "y": 2, "w": 2, "h": 2}, {"x": 3, "y": 3, "w": 3, "h": 3}],
        }));
        assert_eq!(set.text, vec![Frame::new(1.0, 1.0, 1.0, 1.0)]);
    }

    #[test]
    fn test_missing_frames_are_empty() {
        assert!(FrameSet::from_value(&Value::Null).is_empty());
        assert!(FrameSet::from_value(&json!("nonsense")).is_empty());
        assert!(FrameSet::from_value(&json!({})).is_empty());
    }

    #[test]
    fn test_negative_and_partial_frames_dropped() {
        let set = FrameSet::from_value(&json!({
            "images": [
                {"x": 0, "y": 0, "w": -10, "h": 20},
                {"x": 0, "y": 0, "w": 10},
                {"x": 0, "y": 0, "w": 10, "h": 10},
            ],
        }));
        assert_eq!(set.images, vec![Frame::new(0.0, 0.0, 10.0, 10.0)]);
    }

    #[test]
    fn test_out_of_bounds_detection() {
        let set = FrameSet {
            title: Some(Frame::new(80.0, 64.0, 1120.0, 80.0)),
            text: vec![Frame::new(1000.0, 600.0, 400.0, 200.0)],
            images: vec![],
        };
        let oob = set.out_of_bounds(&CANONICAL_CANVAS);
        assert_eq!(oob.len(), 1);
        assert_eq!(oob[0].0, FrameRole::Text);
    }

    #[test]
    fn test_deserialize_via_serde() {
        let set: FrameSet = serde_json::from_value(json!({
            "title": [{"x": 0, "y": 0, "w": 100, "h": 50}],
        }))
        .unwrap();
        assert_eq!(set.title, Some(Frame::new(0.0, 0.0, 100.0, 50.0)));
    }
}
