//! Grid snapping.
//!
//! The grid is defined in screen pixels, so its world spacing shrinks as the
//! camera zooms in: `grid = grid_unit / scale`.

use kurbo::{Point, Vec2};

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// World-space grid spacing for a screen-space unit at the given scale.
pub fn grid_size_for_scale(grid_unit: f64, scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        grid_unit / scale
    } else {
        grid_unit
    }
}

/// Snap a point to the nearest grid intersection.
///
/// Snapping an already snapped point returns it unchanged.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return SnapResult::none(point);
    }
    let snapped_x = (point.x / grid_size).round() * grid_size;
    let snapped_y = (point.y / grid_size).round() * grid_size;

    SnapResult {
        point: Point::new(snapped_x, snapped_y),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Delta that takes `origin + delta` to its snapped position.
pub fn snapped_delta(origin: Point, delta: Vec2, grid_size: f64) -> Vec2 {
    snap_to_grid(origin + delta, grid_size).point - origin
}
