//! Dirty-then-schedule frame pacing.
//!
//! Any number of changes between two ticks mark the scheduler dirty once;
//! each tick produces at most one frame.

use crate::renderer::{RenderContext, RenderResult, Renderer};
use typefield_core::canvas::Canvas;

#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    dirty: bool,
    requests: u64,
    frames: u64,
}

impl FrameScheduler {
    /// A new scheduler starts dirty so the first tick draws.
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.requests += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Move the canvas redraw flag into the scheduler.
    pub fn absorb(&mut self, canvas: &mut Canvas) -> bool {
        let redraw = canvas.take_redraw();
        if redraw {
            self.mark_dirty();
        }
        redraw
    }

    /// One display tick. Returns true if a frame is due.
    pub fn tick(&mut self) -> bool {
        if !std::mem::take(&mut self.dirty) {
            return false;
        }
        self.frames += 1;
        true
    }

    /// Tick and, if a frame is due, build it.
    pub fn render<R: Renderer>(
        &mut self,
        renderer: &mut R,
        ctx: &RenderContext,
    ) -> RenderResult<bool> {
        if !self.tick() {
            return Ok(false);
        }
        renderer.build_scene(ctx)?;
        Ok(true)
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Redraw requests received so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisplayListRenderer;
    use kurbo::Size;
    use typefield_core::config::CanvasConfig;
    use typefield_core::editor::Editor;

    #[test]
    fn test_many_changes_one_frame() {
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.tick());
        assert!(!scheduler.tick());

        for _ in 0..10 {
            scheduler.mark_dirty();
        }
        assert!(scheduler.tick());
        assert!(!scheduler.tick());
        assert_eq!(scheduler.frames(), 2);
        assert_eq!(scheduler.requests(), 10);
    }

    #[test]
    fn test_absorbs_canvas_flag_and_renders() {
        let mut editor = Editor::new(CanvasConfig::default(), Size::new(800.0, 600.0));
        let mut scheduler = FrameScheduler::new();
        let mut renderer = DisplayListRenderer::new();
        scheduler.absorb(&mut editor.canvas);

        let ctx = RenderContext::new(&editor, Size::new(800.0, 600.0));
        assert!(scheduler.render(&mut renderer, &ctx).unwrap());
        assert!(!scheduler.render(&mut renderer, &ctx).unwrap());
        assert_eq!(renderer.frames(), 1);

        editor.add_guide();
        editor.add_guide();
        assert!(scheduler.absorb(&mut editor.canvas));
        let ctx = RenderContext::new(&editor, Size::new(800.0, 600.0));
        assert!(scheduler.render(&mut renderer, &ctx).unwrap());
        assert_eq!(renderer.frames(), 2);
    }
}
