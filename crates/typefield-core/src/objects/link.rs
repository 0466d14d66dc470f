//! Link object connecting two text objects.

use super::{ObjectId, SerializableColor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Curve family used to draw a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStyle {
    /// Straight segment between the endpoints.
    #[default]
    Straight,
    /// Cubic bezier leaving each endpoint perpendicular to its edge.
    Bezier,
    /// Catmull-Rom spline through a bowed midpoint.
    CatmullRom,
}

impl LinkStyle {
    /// Cycle to the next link style.
    pub fn next(self) -> Self {
        match self {
            LinkStyle::Straight => LinkStyle::Bezier,
            LinkStyle::Bezier => LinkStyle::CatmullRom,
            LinkStyle::CatmullRom => LinkStyle::Straight,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinkStyle::Straight => "Straight",
            LinkStyle::Bezier => "Bezier",
            LinkStyle::CatmullRom => "Catmull-Rom",
        }
    }
}

/// A directed connection between two text objects.
///
/// The endpoints are weak references: they are resolved by id lookup and a
/// link whose endpoint disappears is pruned on the next cleanup pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkObject {
    pub(crate) id: ObjectId,
    pub from: ObjectId,
    pub to: ObjectId,
    #[serde(default)]
    pub style: LinkStyle,
    pub color: SerializableColor,
    /// Draw an arrowhead at the `to` end.
    #[serde(default = "default_arrowhead")]
    pub arrowhead: bool,
}

fn default_arrowhead() -> bool {
    true
}

impl LinkObject {
    /// Create a new straight link with the default color.
    pub fn new(from: ObjectId, to: ObjectId) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            style: LinkStyle::default(),
            color: SerializableColor::link_blue(),
            arrowhead: true,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn with_style(mut self, style: LinkStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_arrowhead(mut self, arrowhead: bool) -> Self {
        self.arrowhead = arrowhead;
        self
    }

    /// Whether this link joins `a` and `b`, in either direction.
    pub fn connects(&self, a: ObjectId, b: ObjectId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// Whether either endpoint is `id`.
    pub fn references(&self, id: ObjectId) -> bool {
        self.from == id || self.to == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connects_is_undirected() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let link = LinkObject::new(a, b);
        assert!(link.connects(a, b));
        assert!(link.connects(b, a));
        assert!(!link.connects(a, c));
        assert!(link.references(b));
        assert!(!link.references(c));
    }

    #[test]
    fn test_style_cycle() {
        let style = LinkStyle::default();
        assert_eq!(style.next().next().next(), style);
    }
}
