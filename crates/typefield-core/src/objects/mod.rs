//! Placeable canvas objects.

mod guide;
mod link;
mod text;

pub use guide::GuideObject;
pub use link::{LinkObject, LinkStyle};
pub use text::{LINE_HEIGHT_FACTOR, TextObject};

use kurbo::{Point, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for canvas objects.
pub type ObjectId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Default ink used for links.
    pub fn link_blue() -> Self {
        Self::new(66, 110, 220, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Discriminant of a [`CanvasObject`], handy for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Text,
    Guide,
    Link,
}

/// Closed set of everything that can live on the canvas.
///
/// Consumers match exhaustively, so adding a variant forces every hit-test,
/// render, and export site to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasObject {
    Text(TextObject),
    Guide(GuideObject),
    Link(LinkObject),
}

impl CanvasObject {
    pub fn id(&self) -> ObjectId {
        match self {
            CanvasObject::Text(t) => t.id,
            CanvasObject::Guide(g) => g.id,
            CanvasObject::Link(l) => l.id,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            CanvasObject::Text(_) => ObjectKind::Text,
            CanvasObject::Guide(_) => ObjectKind::Guide,
            CanvasObject::Link(_) => ObjectKind::Link,
        }
    }

    /// Anchor position used for dragging (None for links, whose geometry is derived).
    pub fn position(&self) -> Option<Point> {
        match self {
            CanvasObject::Text(t) => Some(t.position),
            CanvasObject::Guide(g) => Some(g.position),
            CanvasObject::Link(_) => None,
        }
    }

    /// Move the object's anchor to `position`. Links are left untouched.
    pub fn set_position(&mut self, position: Point) {
        match self {
            CanvasObject::Text(t) => t.position = position,
            CanvasObject::Guide(g) => g.position = position,
            CanvasObject::Link(_) => {}
        }
    }

    /// Translate the object in world space. Links are left untouched.
    pub fn translate(&mut self, delta: Vec2) {
        if let Some(position) = self.position() {
            self.set_position(position + delta);
        }
    }

    /// Whether this object can be moved by dragging.
    pub fn is_movable(&self) -> bool {
        !matches!(self, CanvasObject::Link(_))
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            CanvasObject::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextObject> {
        match self {
            CanvasObject::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_guide(&self) -> Option<&GuideObject> {
        match self {
            CanvasObject::Guide(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkObject> {
        match self {
            CanvasObject::Link(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, CanvasObject::Text(_))
    }

    pub fn is_guide(&self) -> bool {
        matches!(self, CanvasObject::Guide(_))
    }
}

impl From<TextObject> for CanvasObject {
    fn from(text: TextObject) -> Self {
        CanvasObject::Text(text)
    }
}

impl From<GuideObject> for CanvasObject {
    fn from(guide: GuideObject) -> Self {
        CanvasObject::Guide(guide)
    }
}

impl From<LinkObject> for CanvasObject {
    fn from(link: LinkObject) -> Self {
        CanvasObject::Link(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_roundtrip_through_peniko() {
        let color = SerializableColor::new(12, 34, 56, 200);
        let peniko_color: Color = color.into();
        assert_eq!(SerializableColor::from(peniko_color), color);
    }

    #[test]
    fn test_translate_skips_links() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut link = CanvasObject::from(LinkObject::new(a, b));
        link.translate(Vec2::new(10.0, 10.0));
        assert!(link.position().is_none());
        assert!(!link.is_movable());

        let mut text = CanvasObject::from(TextObject::new(Point::new(1.0, 2.0), "hi", 16.0));
        text.translate(Vec2::new(10.0, -2.0));
        assert_eq!(text.position(), Some(Point::new(11.0, 0.0)));
    }

    #[test]
    fn test_serde_tagging() {
        let text = CanvasObject::from(TextObject::new(Point::ZERO, "hello", 16.0));
        let json = serde_json::to_string(&text).unwrap();
        assert!(json.contains("\"type\":\"text\""));
        let back: CanvasObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, text);
    }
}
