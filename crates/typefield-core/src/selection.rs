//! Selection and drag engine.
//!
//! Gestures are tracked in screen space and converted through the camera.
//! Dragging moves objects live without snapping; the grid snap is applied
//! once, on release. A multi-object drag moves as a rigid group: the
//! reference object (the one under the pointer) is snapped and the same
//! delta is applied to every dragged object.

use crate::canvas::Canvas;
use crate::document::CanvasDocument;
use crate::hit::{locate, objects_in_rect};
use crate::history::HistorySnapshot;
use crate::input::PointerEvent;
use crate::objects::ObjectId;
use crate::snap::{snap_to_grid, snapped_delta};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;

/// Arrow-key nudge multiplier when shift is held.
pub const BIG_NUDGE: f64 = 10.0;

/// An in-progress drag.
#[derive(Debug, Clone)]
pub struct DragState {
    /// Objects being moved (never links).
    pub ids: Vec<ObjectId>,
    /// Positions captured at drag start.
    pub origins: HashMap<ObjectId, Point>,
    /// Object whose snapped position drives the group.
    pub reference: ObjectId,
    /// Pointer at drag start (screen).
    pub start: Point,
    /// Latest pointer position (screen).
    pub current: Point,
    /// Whether the pointer has moved since the press.
    pub moved: bool,
    /// Selection to collapse to if the press turns out to be a plain click.
    collapse_to: Option<ObjectId>,
    /// State before the drag, recorded as one undo step if anything moved.
    before: HistorySnapshot,
}

impl DragState {
    /// Unsnapped world delta for the current pointer.
    pub fn world_delta(&self, scale: f64) -> Vec2 {
        (self.current - self.start) / scale
    }

    /// Where the reference object would land if released now.
    pub fn preview_position(&self, scale: f64, grid_size: f64, snap: bool) -> Option<Point> {
        let origin = *self.origins.get(&self.reference)?;
        let target = origin + self.world_delta(scale);
        Some(if snap {
            snap_to_grid(target, grid_size).point
        } else {
            target
        })
    }
}

/// An in-progress marquee.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeState {
    /// Screen-space corners.
    pub start: Point,
    pub current: Point,
    /// Selection to union with (non-empty only for modifier marquees).
    pub base: Vec<ObjectId>,
}

impl MarqueeState {
    /// Screen-space rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

/// The current selection plus any gesture acting on it.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<ObjectId>,
    additive: bool,
    drag: Option<DragState>,
    marquee: Option<MarqueeState>,
}

impl Selection {
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether this is a modifier-built multi-selection.
    pub fn is_additive(&self) -> bool {
        self.additive
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn marquee(&self) -> Option<&MarqueeState> {
        self.marquee.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Replace the selection with a single object.
    pub fn set_single(&mut self, id: ObjectId) {
        self.ids.clear();
        self.ids.push(id);
        self.additive = false;
    }

    /// Replace the selection.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.additive = self.ids.len() > 1;
    }

    /// Toggle membership; a multi-selection that drops to one member
    /// collapses back to a plain single selection.
    pub fn toggle(&mut self, id: ObjectId) {
        if let Some(pos) = self.ids.iter().position(|&x| x == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
        self.additive = self.ids.len() > 1;
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.additive = false;
    }

    /// Drop ids that no longer exist.
    pub fn retain_existing(&mut self, document: &CanvasDocument) {
        self.ids.retain(|&id| document.contains(id));
        if self.ids.len() <= 1 {
            self.additive = false;
        }
    }

    /// Forget any drag or marquee without applying it.
    pub(crate) fn end_gestures(&mut self) {
        self.drag = None;
        self.marquee = None;
    }
}

/// What a press in selection context did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Pressed an object (selection updated, drag possibly started).
    Object(ObjectId),
    /// Pressed empty space; a marquee started.
    Marquee,
}

/// Handle a pointer press: click, modifier-click, or the start of a marquee.
pub fn press(canvas: &mut Canvas, event: &PointerEvent) -> PressOutcome {
    let hit = locate(event.position, canvas).filter(|hit| hit.is_direct());
    let Some(hit) = hit else {
        let base = if event.modifiers.is_additive() {
            canvas.selection.ids.clone()
        } else {
            canvas.selection.clear();
            Vec::new()
        };
        canvas.selection.marquee = Some(MarqueeState {
            start: event.position,
            current: event.position,
            base,
        });
        canvas.request_redraw();
        return PressOutcome::Marquee;
    };

    if event.modifiers.is_additive() {
        canvas.selection.toggle(hit.id);
        if canvas.selection.contains(hit.id) {
            begin_drag(canvas, hit.id, event.position);
        }
    } else {
        if !canvas.selection.contains(hit.id) {
            canvas.selection.set_single(hit.id);
        }
        let grouped = canvas.selection.len() > 1;
        if begin_drag(canvas, hit.id, event.position) && grouped {
            if let Some(drag) = canvas.selection.drag.as_mut() {
                drag.collapse_to = Some(hit.id);
            }
        }
    }
    canvas.request_redraw();
    PressOutcome::Object(hit.id)
}

/// Start dragging the current selection with `reference` under the pointer.
///
/// Returns false (and starts nothing) if no selected object is movable.
pub fn begin_drag(canvas: &mut Canvas, reference: ObjectId, screen: Point) -> bool {
    let mut origins = HashMap::new();
    let mut ids = Vec::new();
    for &id in &canvas.selection.ids {
        if let Some(position) = canvas.document.get(id).and_then(|o| o.position()) {
            origins.insert(id, position);
            ids.push(id);
        }
    }
    if !origins.contains_key(&reference) {
        return false;
    }
    canvas.selection.drag = Some(DragState {
        ids,
        origins,
        reference,
        start: screen,
        current: screen,
        moved: false,
        collapse_to: None,
        before: canvas.snapshot(),
    });
    true
}

/// Update the active drag or marquee. Returns true if anything changed.
pub fn drag_to(canvas: &mut Canvas, screen: Point) -> bool {
    let scale = canvas.viewport.scale();
    if let Some(drag) = canvas.selection.drag.as_mut() {
        drag.current = screen;
        let delta = drag.world_delta(scale);
        drag.moved |= delta != Vec2::ZERO;
        for id in &drag.ids {
            if let (Some(origin), Some(object)) = (drag.origins.get(id), canvas.document.get_mut(*id)) {
                object.set_position(*origin + delta);
            }
        }
        canvas.request_redraw();
        return true;
    }

    if let Some(marquee) = canvas.selection.marquee.as_mut() {
        marquee.current = screen;
        update_marquee_selection(canvas);
        canvas.request_redraw();
        return true;
    }
    false
}

fn update_marquee_selection(canvas: &mut Canvas) {
    let Some(marquee) = canvas.selection.marquee.as_ref() else {
        return;
    };
    let world = canvas.viewport.camera.screen_rect_to_world(marquee.rect());
    let hits = objects_in_rect(world, &canvas.document, canvas.measure());
    let ids: Vec<ObjectId> = marquee.base.iter().copied().chain(hits).collect();
    canvas.selection.set(ids);
}

/// Finish the active gesture. Returns true if the document changed.
pub fn release(canvas: &mut Canvas, screen: Point) -> bool {
    if canvas.selection.drag.is_some() {
        drag_to(canvas, screen);
    }
    if let Some(drag) = canvas.selection.drag.take() {
        canvas.request_redraw();
        if !drag.moved {
            // A plain click on a member of a group collapses the group to it
            if let Some(id) = drag.collapse_to {
                canvas.selection.set_single(id);
            }
            return false;
        }
        let scale = canvas.viewport.scale();
        let raw = drag.world_delta(scale);
        let delta = match drag.origins.get(&drag.reference) {
            Some(&origin) if canvas.toggles.snap_enabled => {
                snapped_delta(origin, raw, canvas.grid_size())
            }
            _ => raw,
        };
        for id in &drag.ids {
            if let (Some(origin), Some(object)) = (drag.origins.get(id), canvas.document.get_mut(*id)) {
                object.set_position(*origin + delta);
            }
        }
        canvas.history.push(drag.before);
        canvas.mark_changed();
        log::debug!("Moved {} object(s) by {:?}", drag.ids.len(), delta);
        return true;
    }

    if canvas.selection.marquee.is_some() {
        if let Some(marquee) = canvas.selection.marquee.as_mut() {
            marquee.current = screen;
        }
        update_marquee_selection(canvas);
        canvas.selection.marquee = None;
        canvas.request_redraw();
    }
    false
}

/// Abort the active gesture, restoring drag-start positions or the
/// pre-marquee selection.
pub fn cancel(canvas: &mut Canvas) -> bool {
    if let Some(drag) = canvas.selection.drag.take() {
        for (id, origin) in &drag.origins {
            if let Some(object) = canvas.document.get_mut(*id) {
                object.set_position(*origin);
            }
        }
        canvas.request_redraw();
        return true;
    }
    if let Some(marquee) = canvas.selection.marquee.take() {
        canvas.selection.set(marquee.base);
        canvas.request_redraw();
        return true;
    }
    false
}

/// Move the selection by one grid unit (ten with `big`) in `direction`.
pub fn nudge(canvas: &mut Canvas, direction: Vec2, big: bool) -> bool {
    let movable: Vec<ObjectId> = canvas
        .selection
        .ids
        .iter()
        .copied()
        .filter(|&id| canvas.document.get(id).is_some_and(|o| o.is_movable()))
        .collect();
    if movable.is_empty() || direction == Vec2::ZERO {
        return false;
    }
    let step = canvas.grid_size() * if big { BIG_NUDGE } else { 1.0 };
    canvas.record();
    for id in movable {
        if let Some(object) = canvas.document.get_mut(id) {
            object.translate(direction * step);
        }
    }
    canvas.mark_changed();
    true
}

/// Delete every selected object (and links left dangling).
pub fn delete_selected(canvas: &mut Canvas) -> usize {
    let ids = canvas.selection.ids.clone();
    let removed = canvas.delete(&ids);
    canvas.selection.clear();
    removed
}

/// Select every object on the canvas.
pub fn select_all(canvas: &mut Canvas) {
    let ids = canvas.document.ids().to_vec();
    canvas.selection.set(ids);
    canvas.request_redraw();
}

/// Clear the selection.
pub fn clear(canvas: &mut Canvas) {
    if !canvas.selection.is_empty() {
        canvas.selection.clear();
        canvas.request_redraw();
    }
}
