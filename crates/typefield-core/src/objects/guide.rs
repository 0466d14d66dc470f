//! Guide object: a fixed-aspect reference rectangle.

use super::ObjectId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width a guide can be resized to (world units).
const MIN_GUIDE_WIDTH: f64 = 4.0;

/// A reference rectangle drawn behind text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideObject {
    pub(crate) id: ObjectId,
    /// Top-left corner in world units.
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

impl GuideObject {
    /// Create a new guide.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: width.abs(),
            height: height.abs(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Width / height (1.0 for a degenerate guide).
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= f64::EPSILON {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// The guide's rectangle in world space.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Resize to `width`, keeping the aspect ratio and the top-left corner fixed.
    pub fn resize_to_width(&mut self, width: f64) {
        let aspect = self.aspect_ratio();
        self.width = width.max(MIN_GUIDE_WIDTH);
        self.height = self.width / aspect;
    }

    /// Scale uniformly by `factor` around the top-left corner.
    pub fn scale_by(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.resize_to_width(self.width * factor);
        }
    }
}
