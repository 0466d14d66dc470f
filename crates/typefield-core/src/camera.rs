//! Camera module for pan/zoom transforms.
//!
//! The two free functions [`world_to_screen`] and [`screen_to_world`] are the
//! only place where the view transform is spelled out; everything else in the
//! crate routes coordinate math through them.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest scale the camera will ever hold.
pub const MIN_SCALE: f64 = 0.05;
/// Largest scale the camera will ever hold.
pub const MAX_SCALE: f64 = 20.0;
/// Tolerance used when comparing scales against ladder entries.
pub const LADDER_EPSILON: f64 = 1e-6;

/// Map a world point to screen space: `screen = world * scale + offset`.
pub fn world_to_screen(world: Point, scale: f64, offset: Vec2) -> Point {
    Point::new(world.x * scale + offset.x, world.y * scale + offset.y)
}

/// Map a screen point to world space: `world = (screen - offset) / scale`.
pub fn screen_to_world(screen: Point, scale: f64, offset: Vec2) -> Point {
    Point::new((screen.x - offset.x) / scale, (screen.y - offset.y) / scale)
}

/// Step one entry along a ladder of values.
///
/// The current value is matched to its nearest ladder index and the result
/// moves exactly one index in `direction` (clamped to the ends). Values are
/// never extrapolated past the ladder.
pub fn step_ladder(ladder: &[f64], current: f64, direction: i32) -> f64 {
    let Some(nearest) = nearest_ladder_index(ladder, current) else {
        return current;
    };
    let target = match direction.signum() {
        1 => (nearest + 1).min(ladder.len() - 1),
        -1 => nearest.saturating_sub(1),
        _ => nearest,
    };
    ladder[target]
}

/// Index of the ladder entry closest to `value`.
///
/// Exact matches (within [`LADDER_EPSILON`]) win immediately; otherwise the
/// entry with the smallest absolute difference is chosen.
pub fn nearest_ladder_index(ladder: &[f64], value: f64) -> Option<usize> {
    if let Some(idx) = ladder
        .iter()
        .position(|&v| (v - value).abs() <= LADDER_EPSILON)
    {
        return Some(idx);
    }
    ladder
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - value)
                .abs()
                .partial_cmp(&(*b - value).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
}

/// Camera manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Post-scale translation (pan), in screen pixels.
    pub offset: Vec2,
    /// Current scale (screen pixels per world unit).
    pub scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera limited to the given scale range.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        let min_scale = if min_scale.is_finite() && min_scale > 0.0 {
            min_scale
        } else {
            MIN_SCALE
        };
        Self {
            min_scale,
            max_scale: max_scale.max(min_scale),
            ..Self::default()
        }
    }

    /// Clamp a requested scale into the valid range.
    ///
    /// Non-positive and non-finite requests collapse onto the nearest limit so
    /// that an invalid transform never reaches the coordinate functions.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() || scale <= 0.0 {
            return self.min_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        screen_to_world(screen_point, self.scale, self.offset)
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        world_to_screen(world_point, self.scale, self.offset)
    }

    /// World-to-screen affine transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Convert a screen-space rectangle into world space.
    pub fn screen_rect_to_world(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.screen_to_world(Point::new(rect.x0, rect.y0)),
            self.screen_to_world(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Convert a world-space rectangle into screen space.
    pub fn world_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.world_to_screen(Point::new(rect.x0, rect.y0)),
            self.world_to_screen(Point::new(rect.x1, rect.y1)),
        )
    }

    /// Convert a length in screen pixels to world units.
    pub fn screen_len_to_world(&self, len: f64) -> f64 {
        len / self.scale
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set a new scale while keeping `anchor` (screen space) fixed.
    ///
    /// Returns true when the scale actually changed.
    pub fn zoom_to(&mut self, anchor: Point, scale: f64) -> bool {
        let new_scale = self.clamp_scale(scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        // Anchor in world space before the change
        let anchor_world = self.screen_to_world(anchor);

        self.scale = new_scale;

        // offset' = anchor - anchor_world * scale'
        self.offset = Vec2::new(
            anchor.x - anchor_world.x * new_scale,
            anchor.y - anchor_world.y * new_scale,
        );
        true
    }

    /// Zoom the camera by a multiplicative factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        self.zoom_to(anchor, self.scale * factor)
    }

    /// Move one step along the zoom ladder, anchored at `anchor`.
    pub fn step_zoom(&mut self, anchor: Point, ladder: &[f64], direction: i32) -> bool {
        let target = step_ladder(ladder, self.scale, direction);
        self.zoom_to(anchor, target)
    }

    /// Reset camera to identity position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded_viewport = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / bounds.width();
        let scale_y = padded_viewport.height / bounds.height();
        self.scale = self.clamp_scale(scale_x.min(scale_y));

        // Center the bounds in the viewport
        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);

        self.offset = Vec2::new(
            viewport_center.x - bounds_center.x * self.scale,
            viewport_center.y - bounds_center.y * self.scale,
        );
    }
}
