//! Link mode: click a source text, then a target text.

use super::{ModeOutcome, ModeStrategy};
use crate::canvas::Canvas;
use crate::hit::locate;
use crate::input::{Key, KeyEvent, PointerEvent};
use crate::links::preview_path;
use crate::objects::ObjectId;
use kurbo::{BezPath, Point};

/// Link creation sub-state.
#[derive(Debug, Clone, Default)]
pub enum LinkState {
    #[default]
    Idle,
    /// Source picked; `preview` runs from its anchor to the pointer (world).
    Creating { source: ObjectId, preview: BezPath },
}

impl LinkState {
    pub fn source(&self) -> Option<ObjectId> {
        match self {
            LinkState::Idle => None,
            LinkState::Creating { source, .. } => Some(*source),
        }
    }

    pub fn preview(&self) -> Option<&BezPath> {
        match self {
            LinkState::Idle => None,
            LinkState::Creating { preview, .. } => Some(preview),
        }
    }
}

#[derive(Debug, Default)]
pub struct LinkMode {
    state: LinkState,
}

impl LinkMode {
    pub fn state(&self) -> &LinkState {
        &self.state
    }

    fn cancel(&mut self, canvas: &mut Canvas) -> bool {
        if let LinkState::Creating { source, .. } = std::mem::take(&mut self.state) {
            log::debug!("Link from {source} cancelled");
            canvas.request_redraw();
            return true;
        }
        false
    }

    /// Rebuild the preview toward `pointer` (screen). Cancels if the source vanished.
    fn update_preview(&mut self, canvas: &mut Canvas, pointer: Point) {
        let Some(source) = self.state.source() else {
            return;
        };
        let Some(bounds) = canvas.bounds_of(source) else {
            self.cancel(canvas);
            return;
        };
        let world = canvas.viewport.camera.screen_to_world(pointer);
        if let LinkState::Creating { preview, .. } = &mut self.state {
            *preview = preview_path(bounds, world, &canvas.link_geometry());
        }
        canvas.request_redraw();
    }
}

fn text_under(canvas: &Canvas, event: &PointerEvent) -> Option<ObjectId> {
    locate(event.position, canvas)
        .filter(|hit| hit.is_direct())
        .map(|hit| hit.id)
        .filter(|&id| canvas.document.text(id).is_some())
}

impl ModeStrategy for LinkMode {
    fn on_pointer_down(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        let target = text_under(canvas, event);
        match (self.state.source(), target) {
            (None, Some(source)) => {
                log::debug!("Link from {source} started");
                self.state = LinkState::Creating {
                    source,
                    preview: BezPath::new(),
                };
                self.update_preview(canvas, event.position);
                ModeOutcome::Handled
            }
            (None, None) => ModeOutcome::Ignored,
            (Some(source), Some(target)) if target != source => {
                self.state = LinkState::Idle;
                canvas.add_link(source, target);
                canvas.request_redraw();
                ModeOutcome::Handled
            }
            (Some(_), _) => {
                self.cancel(canvas);
                ModeOutcome::Handled
            }
        }
    }

    fn on_pointer_move(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        if self.state.source().is_none() {
            return ModeOutcome::Ignored;
        }
        self.update_preview(canvas, event.position);
        ModeOutcome::Handled
    }

    fn on_pointer_up(&mut self, _canvas: &mut Canvas, _event: &PointerEvent) -> ModeOutcome {
        ModeOutcome::Ignored
    }

    fn on_key_down(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> ModeOutcome {
        match event.key {
            Key::Escape if self.cancel(canvas) => ModeOutcome::Handled,
            _ => ModeOutcome::Ignored,
        }
    }

    fn on_exit(&mut self, canvas: &mut Canvas) {
        self.cancel(canvas);
    }
}
