//! Text object.

use super::{ObjectId, SerializableColor};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line height as a multiple of the effective font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// A block of (possibly multi-line) text placed on the canvas.
///
/// Bounds are never stored here; see [`crate::bounds::text_bounds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    pub(crate) id: ObjectId,
    /// The text content; `\n` separates lines.
    pub content: String,
    /// Baseline-left origin of the first line, in world units.
    pub position: Point,
    /// Font size in world units.
    pub font_size: f64,
    /// Multiplier on top of `font_size` (changed by rescaling).
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Optional ink color (None = theme default).
    #[serde(default)]
    pub color: Option<SerializableColor>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

fn default_scale() -> f64 {
    1.0
}

impl TextObject {
    /// Create a new text object.
    pub fn new(position: Point, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            position,
            font_size,
            scale: 1.0,
            color: None,
            bold: false,
            italic: false,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Font size after applying the object's own scale.
    pub fn effective_size(&self) -> f64 {
        self.font_size * self.scale
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> f64 {
        self.effective_size() * LINE_HEIGHT_FACTOR
    }

    /// Iterate the content's lines. A trailing newline yields a final empty line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Number of lines (empty content still counts as one).
    pub fn line_count(&self) -> usize {
        self.lines().count().max(1)
    }

    /// Whether the object holds only whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Baseline position of the given line index.
    pub fn baseline_of(&self, line: usize) -> Point {
        Point::new(
            self.position.x,
            self.position.y + line as f64 * self.line_height(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_creation() {
        let text = TextObject::new(Point::new(100.0, 100.0), "Hello", 16.0);
        assert_eq!(text.content, "Hello");
        assert!((text.effective_size() - 16.0).abs() < f64::EPSILON);
        assert_eq!(text.line_count(), 1);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(TextObject::new(Point::ZERO, "", 16.0).line_count(), 1);
        assert_eq!(TextObject::new(Point::ZERO, "a\nb", 16.0).line_count(), 2);
        assert_eq!(TextObject::new(Point::ZERO, "a\n", 16.0).line_count(), 2);
    }

    #[test]
    fn test_scale_affects_metrics() {
        let text = TextObject::new(Point::ZERO, "x", 10.0).with_scale(2.0);
        assert!((text.effective_size() - 20.0).abs() < f64::EPSILON);
        assert!((text.line_height() - 24.0).abs() < 1e-9);
        assert!((text.baseline_of(2).y - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_scale_defaults_to_one() {
        let json = format!(
            r#"{{"id":"{}","content":"x","position":{{"x":0.0,"y":0.0}},"font_size":12.0}}"#,
            Uuid::new_v4()
        );
        let text: TextObject = serde_json::from_str(&json).unwrap();
        assert!((text.scale - 1.0).abs() < f64::EPSILON);
        assert!(text.color.is_none());
    }
}
