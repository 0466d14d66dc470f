//! Canvas state and command functions.
//!
//! [`Canvas`] is the single explicit state struct of the editor. Every
//! mutation goes through a method here (or in [`crate::selection`]) that
//! records history and raises the change flags, so no caller can leave the
//! document half-updated.

use crate::assistant::AssistantStatus;
use crate::bounds;
use crate::config::CanvasConfig;
use crate::document::CanvasDocument;
use crate::history::{History, HistorySnapshot};
use crate::links::{LinkGeometry, resolve_link};
use crate::measure::{ApproxMeasure, GlyphMeasure};
use crate::objects::{CanvasObject, GuideObject, LinkObject, LinkStyle, ObjectId, TextObject};
use crate::selection::Selection;
use crate::viewport::Viewport;
use kurbo::{BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Screen padding used by "fit to content".
pub const FIT_PADDING: f64 = 40.0;
/// Multiplier applied per text rescale step.
pub const RESCALE_STEP: f64 = 1.25;

/// User-facing toggles persisted with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggles {
    pub grid_visible: bool,
    pub snap_enabled: bool,
    /// Style given to newly created links.
    pub link_style: LinkStyle,
    /// Whether new links get an arrowhead.
    pub arrowheads: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            grid_visible: true,
            snap_enabled: true,
            link_style: LinkStyle::default(),
            arrowheads: true,
        }
    }
}

/// Everything the editor knows about the canvas.
pub struct Canvas {
    pub document: CanvasDocument,
    pub viewport: Viewport,
    pub selection: Selection,
    pub history: History,
    /// Uncommitted text in the text box.
    pub typing_text: String,
    pub toggles: Toggles,
    pub config: CanvasConfig,
    pub assistant_status: AssistantStatus,
    measure: Box<dyn GlyphMeasure>,
    /// Bumped whenever the document is replaced wholesale.
    epoch: u64,
    needs_redraw: bool,
    unsaved: bool,
}

impl Canvas {
    /// Create an empty canvas using the approximate glyph measure.
    pub fn new(config: CanvasConfig, viewport_size: Size) -> Self {
        Self::with_measure(config, viewport_size, Box::new(ApproxMeasure::default()))
    }

    pub fn with_measure(
        config: CanvasConfig,
        viewport_size: Size,
        measure: Box<dyn GlyphMeasure>,
    ) -> Self {
        Self {
            document: CanvasDocument::new(),
            viewport: Viewport::new(&config, viewport_size),
            selection: Selection::default(),
            history: History::new(config.history_depth),
            typing_text: String::new(),
            toggles: Toggles::default(),
            assistant_status: AssistantStatus::default(),
            measure,
            epoch: 0,
            needs_redraw: true,
            unsaved: false,
            config,
        }
    }

    /// The shared glyph measure.
    pub fn measure(&self) -> &dyn GlyphMeasure {
        self.measure.as_ref()
    }

    pub fn link_geometry(&self) -> LinkGeometry {
        LinkGeometry::from(&self.config)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// World-space grid spacing at the current zoom.
    pub fn grid_size(&self) -> f64 {
        crate::snap::grid_size_for_scale(self.config.grid_unit, self.viewport.scale())
    }

    // --- change tracking ---

    /// Flag a persistent change: redraw and save.
    pub fn mark_changed(&mut self) {
        self.needs_redraw = true;
        self.unsaved = true;
    }

    /// Flag a visual-only change.
    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns and clears the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Returns and clears the unsaved flag.
    pub fn take_unsaved(&mut self) -> bool {
        std::mem::take(&mut self.unsaved)
    }

    pub fn has_unsaved(&self) -> bool {
        self.unsaved
    }

    // --- history ---

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            document: self.document.clone(),
            offset: self.viewport.offset(),
            scale: self.viewport.scale(),
            typing_text: self.typing_text.clone(),
            display_size: self.viewport.display_size,
            logical_size: self.viewport.logical_size,
        }
    }

    /// Put the canvas back into a recorded state.
    pub fn restore(&mut self, snapshot: HistorySnapshot) {
        self.document = snapshot.document;
        self.viewport.restore(
            snapshot.offset,
            snapshot.scale,
            snapshot.display_size,
            snapshot.logical_size,
        );
        self.typing_text = snapshot.typing_text;
        self.selection.end_gestures();
        self.selection.retain_existing(&self.document);
        self.mark_changed();
    }

    /// Record the current state as an undo step (call before mutating).
    pub fn record(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    // --- geometry queries ---

    /// Bounds of an object by id.
    pub fn bounds_of(&self, id: ObjectId) -> Option<Rect> {
        let object = self.document.get(id)?;
        bounds::bounds_of(object, &self.document, self.measure())
    }

    /// Curve of a link between its current endpoints. None for orphans.
    pub fn link_path(&self, link: &LinkObject) -> Option<BezPath> {
        resolve_link(link, &self.document, self.measure(), &self.link_geometry())
            .map(|resolved| resolved.body)
    }

    /// Union of all object bounds.
    pub fn content_bounds(&self) -> Option<Rect> {
        bounds::content_bounds(&self.document, self.measure())
    }

    /// Fit the camera to all content. Returns false on an empty canvas.
    pub fn fit_to_content(&mut self) -> bool {
        let Some(content) = self.content_bounds() else {
            return false;
        };
        self.viewport.fit_to_bounds(content, FIT_PADDING);
        self.mark_changed();
        true
    }

    // --- object commands ---

    /// Commit the typing buffer as a text object at the text box.
    ///
    /// Blank buffers are discarded. After committing, the view advances so
    /// the text box sits below the new text.
    pub fn commit_typing(&mut self) -> Option<ObjectId> {
        if self.typing_text.trim().is_empty() {
            self.typing_text.clear();
            self.request_redraw();
            return None;
        }
        self.record();
        let content = std::mem::take(&mut self.typing_text);
        let text = TextObject::new(
            self.viewport.commit_origin(),
            content,
            self.viewport.logical_size,
        );
        let advance = text.line_count() as f64 * text.line_height() * self.viewport.scale();
        let id = self.document.add(text.into());
        self.viewport.pan(Vec2::new(0.0, -advance));
        self.mark_changed();
        log::debug!("Committed text {id}");
        Some(id)
    }

    /// Insert text objects stacked downward starting at `origin` (baseline-left).
    pub fn append_paragraphs(
        &mut self,
        origin: Point,
        paragraphs: &[String],
        font_size: f64,
    ) -> Vec<ObjectId> {
        if paragraphs.is_empty() {
            return Vec::new();
        }
        self.record();
        let mut ids = Vec::with_capacity(paragraphs.len());
        let mut baseline = origin;
        for paragraph in paragraphs {
            let text = TextObject::new(baseline, paragraph.clone(), font_size);
            // One blank line between paragraphs
            baseline.y += (text.line_count() + 1) as f64 * text.line_height();
            ids.push(self.document.add(text.into()));
        }
        self.mark_changed();
        ids
    }

    /// Add a guide centered in the viewport with the configured size.
    pub fn add_guide(&mut self) -> ObjectId {
        self.record();
        let (width, height) = self.config.guide_size;
        let center = self.viewport.visible_world_rect().center();
        let guide = GuideObject::new(
            Point::new(center.x - width / 2.0, center.y - height / 2.0),
            width,
            height,
        );
        let id = self.document.add(guide.into());
        self.mark_changed();
        log::debug!("Added guide {id}");
        id
    }

    /// Link two text objects. Refuses self-links, non-text endpoints and
    /// pairs that are already linked in either direction.
    pub fn add_link(&mut self, from: ObjectId, to: ObjectId) -> Option<ObjectId> {
        if from == to || self.document.text(from).is_none() || self.document.text(to).is_none() {
            return None;
        }
        if self.document.are_linked(from, to) {
            log::debug!("Link {from} -> {to} already exists");
            return None;
        }
        self.record();
        let link = LinkObject::new(from, to)
            .with_style(self.toggles.link_style)
            .with_arrowhead(self.toggles.arrowheads);
        let id = self.document.add(link.into());
        self.mark_changed();
        log::info!("Linked {from} -> {to}");
        Some(id)
    }

    /// Delete objects (and any links left dangling). Returns how many objects went.
    pub fn delete(&mut self, ids: &[ObjectId]) -> usize {
        let present: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|&id| self.document.contains(id))
            .collect();
        if present.is_empty() {
            return 0;
        }
        self.record();
        for &id in &present {
            self.document.remove(id);
        }
        let pruned = self.document.prune_orphan_links();
        self.selection.retain_existing(&self.document);
        self.mark_changed();
        present.len() + pruned.len()
    }

    /// Grow (`direction > 0`) or shrink text and guides by one rescale step.
    pub fn rescale(&mut self, ids: &[ObjectId], direction: i32) -> bool {
        let factor = match direction.signum() {
            1 => RESCALE_STEP,
            -1 => 1.0 / RESCALE_STEP,
            _ => return false,
        };
        let targets: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|&id| {
                self.document
                    .get(id)
                    .is_some_and(|object| !matches!(object, CanvasObject::Link(_)))
            })
            .collect();
        if targets.is_empty() {
            return false;
        }
        self.record();
        for id in targets {
            match self.document.get_mut(id) {
                Some(CanvasObject::Text(text)) => text.scale *= factor,
                Some(CanvasObject::Guide(guide)) => guide.scale_by(factor),
                Some(CanvasObject::Link(_)) | None => {}
            }
        }
        self.mark_changed();
        true
    }

    /// Move objects to the front (or back) of the z-order, keeping their
    /// relative stacking.
    pub fn restack(&mut self, ids: &[ObjectId], to_front: bool) -> bool {
        let mut stack: Vec<(usize, ObjectId)> = ids
            .iter()
            .filter_map(|&id| self.document.z_index(id).map(|z| (z, id)))
            .collect();
        if stack.is_empty() {
            return false;
        }
        stack.sort_unstable_by_key(|&(z, _)| z);
        self.record();
        if to_front {
            for (_, id) in stack {
                self.document.bring_to_front(id);
            }
        } else {
            for (_, id) in stack.into_iter().rev() {
                self.document.send_to_back(id);
            }
        }
        self.mark_changed();
        true
    }

    /// Replace the whole document (import). Drops history and invalidates
    /// any pending assistant query.
    pub fn replace_document(&mut self, document: CanvasDocument) {
        self.document = document;
        let pruned = self.document.prune_orphan_links();
        if !pruned.is_empty() {
            log::warn!("Dropped {} dangling link(s) on import", pruned.len());
        }
        self.history.clear();
        self.selection = Selection::default();
        self.epoch += 1;
        self.mark_changed();
    }
}
