//! Viewport controller.
//!
//! Owns the camera plus the font-size pair that defines it: the on-screen
//! (display) size and the world (logical) size of newly committed text, with
//! `scale = display / logical`. Keyboard zoom and font steps are anchored at
//! the text box's top-left corner (LT) so the text being typed stays put.

use crate::camera::{Camera, step_ladder};
use crate::config::{CanvasConfig, TextBoxLayout};
use kurbo::{Point, Rect, Size, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub camera: Camera,
    /// Viewport size in screen pixels.
    pub size: Size,
    /// On-screen font size of the text box, in pixels.
    pub display_size: f64,
    /// World font size given to committed text.
    pub logical_size: f64,
    pub layout: TextBoxLayout,
}

impl Viewport {
    pub fn new(config: &CanvasConfig, size: Size) -> Self {
        let mut camera = Camera::with_limits(config.min_scale, config.max_scale);
        let logical_size = positive_or(config.default_logical_size, 16.0);
        let display_size = positive_or(config.default_display_size, logical_size);
        camera.scale = camera.clamp_scale(display_size / logical_size);
        let mut viewport = Self {
            camera,
            size: sanitize_size(size),
            display_size,
            logical_size,
            layout: config.text_box.clone(),
        };
        viewport.sync_display_size();
        viewport
    }

    pub fn scale(&self) -> f64 {
        self.camera.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.camera.offset
    }

    /// Screen position of the text box's top-left corner.
    pub fn lt_position(&self) -> Point {
        Point::new(
            self.size.width * self.layout.left_ratio,
            self.size.height * self.layout.top_ratio,
        )
    }

    /// Text box width in screen pixels.
    pub fn text_box_width(&self) -> f64 {
        self.size.width * self.layout.width_ratio
    }

    /// Text box width in world units.
    pub fn text_box_world_width(&self) -> f64 {
        self.camera.screen_len_to_world(self.text_box_width())
    }

    /// World position where typed text is committed: the baseline-left point
    /// of the first line in the text box.
    pub fn commit_origin(&self) -> Point {
        let lt = self.lt_position();
        self.camera
            .screen_to_world(Point::new(lt.x, lt.y + self.display_size))
    }

    /// World rectangle currently visible.
    pub fn visible_world_rect(&self) -> Rect {
        self.camera
            .screen_rect_to_world(Rect::from_origin_size(Point::ZERO, self.size))
    }

    fn sync_display_size(&mut self) {
        self.display_size = self.logical_size * self.camera.scale;
    }

    /// Zoom to `scale`, keeping `anchor` (screen) fixed.
    pub fn zoom_to(&mut self, anchor: Point, scale: f64) -> bool {
        let changed = self.camera.zoom_to(anchor, scale);
        self.sync_display_size();
        changed
    }

    /// Wheel/pinch zoom by a factor around the pointer.
    pub fn wheel_zoom(&mut self, anchor: Point, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("Ignoring invalid zoom factor {factor}");
            return false;
        }
        let changed = self.camera.zoom_at(anchor, factor);
        self.sync_display_size();
        changed
    }

    /// One zoom-ladder step anchored at LT.
    pub fn step_zoom(&mut self, ladder: &[f64], direction: i32) -> bool {
        let anchor = self.lt_position();
        let changed = self.camera.step_zoom(anchor, ladder, direction);
        self.sync_display_size();
        changed
    }

    /// Back to scale 1.0, anchored at LT.
    pub fn reset_zoom(&mut self) -> bool {
        let anchor = self.lt_position();
        self.zoom_to(anchor, 1.0)
    }

    /// Step the display font size, holding the logical size fixed.
    pub fn step_display_size(&mut self, ladder: &[f64], direction: i32) -> bool {
        let target = step_ladder(ladder, self.display_size, direction);
        if (target - self.display_size).abs() < f64::EPSILON {
            return false;
        }
        let anchor = self.lt_position();
        self.camera.zoom_to(anchor, target / self.logical_size);
        self.sync_display_size();
        true
    }

    /// Step the logical font size, holding the display size fixed.
    pub fn step_logical_size(&mut self, ladder: &[f64], direction: i32) -> bool {
        let target = step_ladder(ladder, self.logical_size, direction);
        if (target - self.logical_size).abs() < f64::EPSILON || target <= 0.0 {
            return false;
        }
        let anchor = self.lt_position();
        self.camera.zoom_to(anchor, self.display_size / target);
        self.logical_size = self.display_size / self.camera.scale;
        true
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    /// Resize the viewport, keeping the world point under LT fixed.
    pub fn resize(&mut self, size: Size) {
        let lt_world = self.camera.screen_to_world(self.lt_position());
        self.size = sanitize_size(size);
        let lt = self.lt_position();
        self.camera.offset = lt.to_vec2() - lt_world.to_vec2() * self.camera.scale;
    }

    /// Fit `bounds` (world) into the viewport.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        self.camera.fit_to_bounds(bounds, self.size, padding);
        self.sync_display_size();
    }

    /// Restore camera state from a snapshot.
    pub fn restore(&mut self, offset: Vec2, scale: f64, display_size: f64, logical_size: f64) {
        self.camera.offset = offset;
        self.camera.scale = self.camera.clamp_scale(scale);
        self.logical_size = positive_or(logical_size, self.logical_size);
        self.display_size = positive_or(display_size, self.logical_size * self.camera.scale);
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn sanitize_size(size: Size) -> Size {
    Size::new(size.width.max(0.0), size.height.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(&CanvasConfig::default(), Size::new(1000.0, 500.0))
    }

    #[test]
    fn test_lt_position_and_width() {
        let vp = viewport();
        assert_eq!(vp.lt_position(), Point::new(100.0, 200.0));
        assert!((vp.text_box_width() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_zoom_anchors_lt() {
        let mut vp = viewport();
        let config = CanvasConfig::default();
        let lt = vp.lt_position();
        let world = vp.camera.screen_to_world(lt);
        assert!(vp.step_zoom(&config.zoom_ladder, 1));
        assert!((vp.scale() - 1.25).abs() < 1e-9);
        let back = vp.camera.world_to_screen(world);
        assert!((back - lt).hypot() < 1e-9);
        assert!((vp.display_size - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_size_step_changes_scale() {
        let mut vp = viewport();
        let config = CanvasConfig::default();
        assert!(vp.step_display_size(&config.display_sizes, 1));
        assert!((vp.display_size - 18.0).abs() < 1e-9);
        assert!((vp.scale() - 18.0 / 16.0).abs() < 1e-9);
        assert!((vp.logical_size - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_logical_size_step_holds_display() {
        let mut vp = viewport();
        let config = CanvasConfig::default();
        assert!(vp.step_logical_size(&config.logical_sizes, 1));
        assert!((vp.logical_size - 18.0).abs() < 1e-9);
        assert!((vp.display_size - 16.0).abs() < 1e-9);
        assert!((vp.scale() - 16.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_keeps_lt_anchor() {
        let mut vp = viewport();
        vp.camera.zoom_to(Point::new(30.0, 40.0), 1.7);
        vp.pan(Vec2::new(-12.0, 7.0));
        let before = vp.camera.screen_to_world(vp.lt_position());
        vp.resize(Size::new(640.0, 900.0));
        let after = vp.camera.screen_to_world(vp.lt_position());
        assert!((after - before).hypot() < 1e-9);
    }

    #[test]
    fn test_commit_origin_is_one_logical_line_below_lt() {
        let mut vp = viewport();
        vp.step_display_size(&CanvasConfig::default().display_sizes, 1);
        let lt_world = vp.camera.screen_to_world(vp.lt_position());
        let origin = vp.commit_origin();
        assert!((origin.x - lt_world.x).abs() < 1e-9);
        assert!((origin.y - lt_world.y - vp.logical_size).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_wheel_factor_is_ignored() {
        let mut vp = viewport();
        assert!(!vp.wheel_zoom(Point::ZERO, -1.0));
        assert!(!vp.wheel_zoom(Point::ZERO, f64::NAN));
        assert!((vp.scale() - 1.0).abs() < f64::EPSILON);
    }
}
