//! Editor facade.
//!
//! [`Editor`] owns the [`Canvas`] and the [`ModeMachine`]. Input goes
//! through the global shortcuts first and is then dispatched to the current
//! mode's strategy. The editor also tracks outstanding assistant queries.

use crate::assistant::{
    AssistantCommand, AssistantError, AssistantStatus, PendingQuery, response_paragraphs,
};
use crate::canvas::Canvas;
use crate::config::CanvasConfig;
use crate::document::CanvasDocument;
use crate::hit::{Hit, locate};
use crate::input::{Key, KeyEvent, PointerEvent, WheelEvent};
use crate::measure::GlyphMeasure;
use crate::modes::{LinkState, Mode, ModeMachine, ModeOutcome};
use crate::objects::ObjectId;
use crate::storage::{SessionSnapshot, StorageResult};
use kurbo::{Point, Size, Vec2};

/// Wheel zoom sensitivity: factor = exp(-delta_y * speed).
pub const WHEEL_ZOOM_SPEED: f64 = 0.002;

/// What happened to an assistant answer.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResolution {
    /// The answer was inserted as these text objects.
    Inserted(Vec<ObjectId>),
    /// The query was unknown, already resolved, or belongs to a replaced document.
    Discarded,
    /// The query failed; the status flag carries the message.
    Failed(AssistantError),
}

pub struct Editor {
    pub canvas: Canvas,
    modes: ModeMachine,
    pending: Vec<PendingQuery>,
    outgoing: Vec<PendingQuery>,
    /// First failure among the queries in flight since the status was last idle.
    failure: Option<String>,
    next_query_id: u64,
}

impl Editor {
    pub fn new(config: CanvasConfig, viewport_size: Size) -> Self {
        Self::from_canvas(Canvas::new(config, viewport_size))
    }

    pub fn with_measure(
        config: CanvasConfig,
        viewport_size: Size,
        measure: Box<dyn GlyphMeasure>,
    ) -> Self {
        Self::from_canvas(Canvas::with_measure(config, viewport_size, measure))
    }

    fn from_canvas(canvas: Canvas) -> Self {
        Self {
            canvas,
            modes: ModeMachine::new(),
            pending: Vec::new(),
            outgoing: Vec::new(),
            failure: None,
            next_query_id: 1,
        }
    }

    // --- modes ---

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn link_state(&self) -> &LinkState {
        self.modes.link_state()
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        let changed = self.modes.set_mode(&mut self.canvas, mode);
        if changed {
            self.canvas.mark_changed();
        }
        changed
    }

    pub fn cycle_mode(&mut self, forward: bool) -> Mode {
        let mode = self.modes.cycle(&mut self.canvas, forward);
        self.canvas.mark_changed();
        mode
    }

    // --- pointer / keyboard ---

    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        self.modes.pointer_down(&mut self.canvas, event).is_handled()
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        self.modes.pointer_move(&mut self.canvas, event).is_handled()
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        self.modes.pointer_up(&mut self.canvas, event).is_handled()
    }

    /// Handle a key press. Returns true if anything consumed it.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        if self.handle_global_key(event) {
            return true;
        }
        match self.modes.key_down(&mut self.canvas, event) {
            ModeOutcome::AssistantQuery(command) => {
                self.dispatch_query(command);
                true
            }
            outcome => outcome.is_handled(),
        }
    }

    fn handle_global_key(&mut self, event: &KeyEvent) -> bool {
        let mods = event.modifiers;
        let key = &event.key;
        if *key == Key::Tab {
            self.cycle_mode(!mods.shift);
            return true;
        }
        if mods.command() {
            if key.is_char('z') {
                if mods.shift {
                    self.redo();
                } else {
                    self.undo();
                }
                return true;
            }
            if key.is_char('y') {
                self.redo();
                return true;
            }
            if key.is_char('g') {
                self.add_guide();
                return true;
            }
            if key.is_char('1') {
                self.fit_to_content();
                return true;
            }
            return match key {
                Key::Char('=' | '+') => {
                    self.step_zoom(1);
                    true
                }
                Key::Char('-' | '_') => {
                    self.step_zoom(-1);
                    true
                }
                Key::Char('0') => {
                    self.reset_zoom();
                    true
                }
                _ => false,
            };
        }
        if mods.alt {
            let direction = match key {
                Key::Char('=' | '+') => 1,
                Key::Char('-' | '_') => -1,
                _ => return false,
            };
            if mods.shift {
                self.step_logical_size(direction);
            } else {
                self.step_display_size(direction);
            }
            return true;
        }
        false
    }

    // --- history ---

    pub fn undo(&mut self) -> bool {
        self.modes.interrupt(&mut self.canvas);
        self.canvas.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.modes.interrupt(&mut self.canvas);
        self.canvas.redo()
    }

    // --- viewport ---

    pub fn step_zoom(&mut self, direction: i32) -> bool {
        let canvas = &mut self.canvas;
        let changed = canvas.viewport.step_zoom(&canvas.config.zoom_ladder, direction);
        if changed {
            canvas.mark_changed();
        }
        changed
    }

    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.canvas.viewport.reset_zoom();
        if changed {
            self.canvas.mark_changed();
        }
        changed
    }

    pub fn step_display_size(&mut self, direction: i32) -> bool {
        let canvas = &mut self.canvas;
        let changed = canvas
            .viewport
            .step_display_size(&canvas.config.display_sizes, direction);
        if changed {
            log::debug!("Display size {}", canvas.viewport.display_size);
            canvas.mark_changed();
        }
        changed
    }

    pub fn step_logical_size(&mut self, direction: i32) -> bool {
        let canvas = &mut self.canvas;
        let changed = canvas
            .viewport
            .step_logical_size(&canvas.config.logical_sizes, direction);
        if changed {
            log::debug!("Logical size {}", canvas.viewport.logical_size);
            canvas.mark_changed();
        }
        changed
    }

    /// Zoom by `factor` keeping `anchor` (screen) fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let changed = self.canvas.viewport.wheel_zoom(anchor, factor);
        if changed {
            self.canvas.mark_changed();
        }
        changed
    }

    /// Command-wheel zooms around the pointer; a plain wheel pans.
    pub fn wheel(&mut self, event: &WheelEvent) -> bool {
        if event.modifiers.command() {
            let factor = (-event.delta.y * WHEEL_ZOOM_SPEED).exp();
            return self.zoom_at(event.position, factor);
        }
        if event.delta == Vec2::ZERO {
            return false;
        }
        self.canvas.viewport.pan(-event.delta);
        self.canvas.mark_changed();
        true
    }

    pub fn resize(&mut self, size: Size) {
        self.canvas.viewport.resize(size);
        self.canvas.mark_changed();
    }

    pub fn fit_to_content(&mut self) -> bool {
        self.canvas.fit_to_content()
    }

    // --- objects and toggles ---

    pub fn add_guide(&mut self) -> ObjectId {
        self.canvas.add_guide()
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.canvas.toggles.grid_visible = !self.canvas.toggles.grid_visible;
        self.canvas.mark_changed();
        self.canvas.toggles.grid_visible
    }

    pub fn toggle_snap(&mut self) -> bool {
        self.canvas.toggles.snap_enabled = !self.canvas.toggles.snap_enabled;
        self.canvas.mark_changed();
        self.canvas.toggles.snap_enabled
    }

    /// Cycle the style given to new links.
    pub fn cycle_link_style(&mut self) {
        self.canvas.toggles.link_style = self.canvas.toggles.link_style.next();
        log::debug!("Link style {}", self.canvas.toggles.link_style.name());
        self.canvas.mark_changed();
    }

    /// What the pointer is over, for cursor feedback. Includes Near hits.
    pub fn hover_at(&self, position: Point) -> Option<Hit> {
        locate(position, &self.canvas)
    }

    // --- assistant ---

    pub fn pending_queries(&self) -> &[PendingQuery] {
        &self.pending
    }

    /// Queries dispatched since the last call, for handing to a client.
    pub fn take_outgoing_queries(&mut self) -> Vec<PendingQuery> {
        std::mem::take(&mut self.outgoing)
    }

    /// Commit the question as text and open a query for it.
    pub fn dispatch_query(&mut self, command: AssistantCommand) -> Option<u64> {
        if command.question.is_empty() {
            log::warn!("Ignoring assistant command without a question");
            self.canvas.typing_text.clear();
            self.canvas.mark_changed();
            return None;
        }
        self.canvas.typing_text = command.question.clone();
        let anchor = self.canvas.commit_typing();

        let id = self.next_query_id;
        self.next_query_id += 1;
        let viewport = &self.canvas.viewport;
        let query = PendingQuery {
            id,
            question: command.question,
            anchor,
            origin: viewport.commit_origin(),
            wrap_width: viewport.text_box_world_width(),
            font_size: viewport.logical_size,
            epoch: self.canvas.epoch(),
        };
        log::info!("Assistant query {id} dispatched");
        if self.pending.is_empty() {
            self.failure = None;
        }
        self.pending.push(query.clone());
        self.outgoing.push(query);
        self.settle_status();
        Some(id)
    }

    /// Deliver the answer to query `id`.
    ///
    /// The query must still be outstanding and the document must not have
    /// been replaced since it was dispatched; otherwise the answer is dropped.
    pub fn resolve_query(
        &mut self,
        id: u64,
        result: Result<String, AssistantError>,
    ) -> QueryResolution {
        let Some(index) = self.pending.iter().position(|query| query.id == id) else {
            log::debug!("Answer for unknown assistant query {id}");
            return QueryResolution::Discarded;
        };
        let query = self.pending.remove(index);
        self.outgoing.retain(|query| query.id != id);

        if query.epoch != self.canvas.epoch() {
            log::info!("Discarding answer to query {id}: document was replaced");
            self.settle_status();
            return QueryResolution::Discarded;
        }

        let answer = match result {
            Ok(answer) => answer,
            Err(err) => return self.fail_query(id, err),
        };
        let paragraphs = response_paragraphs(
            &answer,
            query.wrap_width,
            query.font_size,
            self.canvas.measure(),
        );
        if paragraphs.is_empty() {
            return self.fail_query(id, AssistantError::EmptyResponse);
        }

        // Below the question if it is still there
        let origin = query
            .anchor
            .and_then(|anchor| self.canvas.document.text(anchor))
            .map(|text| text.baseline_of(text.line_count() + 1))
            .unwrap_or(query.origin);
        let ids = self
            .canvas
            .append_paragraphs(origin, &paragraphs, query.font_size);
        self.advance_past(&ids);
        self.settle_status();
        log::info!("Assistant query {id} answered with {} paragraph(s)", ids.len());
        QueryResolution::Inserted(ids)
    }

    fn fail_query(&mut self, id: u64, err: AssistantError) -> QueryResolution {
        log::warn!("Assistant query {id} failed: {err}");
        self.failure.get_or_insert_with(|| err.to_string());
        self.settle_status();
        QueryResolution::Failed(err)
    }

    /// Pending while any query is outstanding. Once all have settled, a
    /// failure among them wins over later successes.
    fn settle_status(&mut self) {
        self.canvas.assistant_status = if !self.pending.is_empty() {
            AssistantStatus::Pending
        } else if let Some(message) = &self.failure {
            AssistantStatus::Failed(message.clone())
        } else {
            AssistantStatus::Idle
        };
        self.canvas.request_redraw();
    }

    /// Keep the typewriter flow: if inserted text reaches below the commit
    /// origin, move the view so the next commit lands after it.
    fn advance_past(&mut self, ids: &[ObjectId]) {
        let Some(last) = ids.last().and_then(|&id| self.canvas.document.text(id)) else {
            return;
        };
        let next_baseline = last.baseline_of(last.line_count() + 1).y;
        let commit_y = self.canvas.viewport.commit_origin().y;
        if next_baseline > commit_y {
            let scale = self.canvas.viewport.scale();
            self.canvas
                .viewport
                .pan(Vec2::new(0.0, -(next_baseline - commit_y) * scale));
        }
    }

    // --- sessions ---

    pub fn export_session(&self) -> SessionSnapshot {
        let canvas = &self.canvas;
        SessionSnapshot {
            objects: canvas.document.to_ordered_vec(),
            offset: canvas.viewport.offset(),
            scale: canvas.viewport.scale(),
            typing_text: canvas.typing_text.clone(),
            display_size: canvas.viewport.display_size,
            logical_size: canvas.viewport.logical_size,
            text_box_width: canvas.viewport.layout.width_ratio,
            toggles: canvas.toggles,
            mode: self.mode(),
            ..SessionSnapshot::default()
        }
    }

    /// Replace the editor state with a saved session. History is cleared
    /// and outstanding assistant answers will be discarded.
    pub fn import_session(&mut self, session: SessionSnapshot) -> StorageResult<()> {
        session.check_version()?;
        self.modes.interrupt(&mut self.canvas);
        self.canvas
            .replace_document(CanvasDocument::from_ordered(session.objects));
        self.canvas.viewport.restore(
            session.offset,
            session.scale,
            session.display_size,
            session.logical_size,
        );
        if session.text_box_width > 0.0 && session.text_box_width <= 1.0 {
            self.canvas.viewport.layout.width_ratio = session.text_box_width;
        }
        self.canvas.typing_text = session.typing_text;
        self.canvas.toggles = session.toggles;
        self.modes.set_mode(&mut self.canvas, session.mode);
        log::info!(
            "Imported session with {} object(s)",
            self.canvas.document.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::objects::TextObject;

    fn editor() -> Editor {
        Editor::new(CanvasConfig::default(), Size::new(1000.0, 500.0))
    }

    fn type_line(editor: &mut Editor, text: &str) {
        for c in text.chars() {
            editor.key_down(&KeyEvent::char(c));
        }
        editor.key_down(&KeyEvent::new(Key::Enter));
    }

    #[test]
    fn test_tab_cycles_modes() {
        let mut editor = editor();
        editor.key_down(&KeyEvent::new(Key::Tab));
        assert_eq!(editor.mode(), Mode::Link);
        editor.key_down(&KeyEvent::new(Key::Tab).with_modifiers(Modifiers::shift()));
        editor.key_down(&KeyEvent::new(Key::Tab).with_modifiers(Modifiers::shift()));
        assert_eq!(editor.mode(), Mode::Select);
    }

    #[test]
    fn test_ctrl_z_and_redo_variants() {
        let mut editor = editor();
        type_line(&mut editor, "one");
        assert_eq!(editor.canvas.document.len(), 1);

        editor.key_down(&KeyEvent::char('z').with_modifiers(Modifiers::ctrl()));
        assert!(editor.canvas.document.is_empty());
        assert_eq!(editor.canvas.typing_text, "one");

        let ctrl_shift = Modifiers {
            shift: true,
            ..Modifiers::ctrl()
        };
        editor.key_down(&KeyEvent::char('Z').with_modifiers(ctrl_shift));
        assert_eq!(editor.canvas.document.len(), 1);

        editor.key_down(&KeyEvent::char('z').with_modifiers(Modifiers::ctrl()));
        editor.key_down(&KeyEvent::char('y').with_modifiers(Modifiers::ctrl()));
        assert_eq!(editor.canvas.document.len(), 1);
    }

    #[test]
    fn test_zoom_keys_follow_ladder() {
        let mut editor = editor();
        let ctrl = Modifiers::ctrl();
        editor.key_down(&KeyEvent::char('=').with_modifiers(ctrl));
        assert!((editor.canvas.viewport.scale() - 1.25).abs() < 1e-9);
        editor.key_down(&KeyEvent::char('-').with_modifiers(ctrl));
        editor.key_down(&KeyEvent::char('-').with_modifiers(ctrl));
        assert!((editor.canvas.viewport.scale() - 0.75).abs() < 1e-9);
        editor.key_down(&KeyEvent::char('0').with_modifiers(ctrl));
        assert!((editor.canvas.viewport.scale() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_alt_keys_step_font_sizes() {
        let mut editor = editor();
        editor.key_down(&KeyEvent::char('=').with_modifiers(Modifiers::alt()));
        assert!((editor.canvas.viewport.display_size - 18.0).abs() < 1e-9);
        assert!((editor.canvas.viewport.logical_size - 16.0).abs() < 1e-9);

        let alt_shift = Modifiers {
            shift: true,
            ..Modifiers::alt()
        };
        editor.key_down(&KeyEvent::char('+').with_modifiers(alt_shift));
        assert!((editor.canvas.viewport.logical_size - 18.0).abs() < 1e-9);
        assert!((editor.canvas.viewport.scale() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ctrl_g_adds_guide() {
        let mut editor = editor();
        editor.key_down(&KeyEvent::char('g').with_modifiers(Modifiers::ctrl()));
        assert_eq!(editor.canvas.document.len(), 1);
        assert!(editor.canvas.typing_text.is_empty());
    }

    #[test]
    fn test_command_wheel_zooms_plain_wheel_pans() {
        let mut editor = editor();
        let anchor = Point::new(300.0, 200.0);
        let world = editor.canvas.viewport.camera.screen_to_world(anchor);
        let zoom = WheelEvent::new(anchor, Vec2::new(0.0, -100.0)).with_modifiers(Modifiers::ctrl());
        assert!(editor.wheel(&zoom));
        assert!(editor.canvas.viewport.scale() > 1.0);
        let back = editor.canvas.viewport.camera.world_to_screen(world);
        assert!((back - anchor).hypot() < 1e-9);

        let offset = editor.canvas.viewport.offset();
        assert!(editor.wheel(&WheelEvent::new(anchor, Vec2::new(0.0, 30.0))));
        assert_eq!(editor.canvas.viewport.offset(), offset - Vec2::new(0.0, 30.0));
    }

    #[test]
    fn test_assistant_answer_goes_below_question() {
        let mut editor = editor();
        type_line(&mut editor, "/gpt hi");
        assert_eq!(editor.canvas.assistant_status, AssistantStatus::Pending);
        let outgoing = editor.take_outgoing_queries();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].question, "hi");
        let question = outgoing[0].anchor.unwrap();
        let question_y = editor.canvas.document.text(question).unwrap().position.y;

        let resolution = editor.resolve_query(outgoing[0].id, Ok("Hello there\n\nSecond".into()));
        let QueryResolution::Inserted(ids) = resolution else {
            panic!("expected insertion");
        };
        assert_eq!(ids.len(), 2);
        let first = editor.canvas.document.text(ids[0]).unwrap();
        assert_eq!(first.content, "Hello there");
        assert!((first.position.y - (question_y + 2.0 * first.line_height())).abs() < 1e-9);
        assert_eq!(editor.canvas.assistant_status, AssistantStatus::Idle);

        // The next commit lands after the answer
        type_line(&mut editor, "next");
        let last_id = *editor.canvas.document.ids().last().unwrap();
        let next = editor.canvas.document.text(last_id).unwrap();
        let second = editor.canvas.document.text(ids[1]).unwrap();
        assert!(next.position.y > second.position.y);
    }

    #[test]
    fn test_assistant_failure_sets_status() {
        let mut editor = editor();
        type_line(&mut editor, "/gpt hi");
        let id = editor.pending_queries()[0].id;
        let resolution = editor.resolve_query(id, Err(AssistantError::Request("timeout".into())));
        assert!(matches!(resolution, QueryResolution::Failed(_)));
        assert!(matches!(editor.canvas.assistant_status, AssistantStatus::Failed(_)));
        // Resolving twice is a no-op
        assert_eq!(editor.resolve_query(id, Ok("late".into())), QueryResolution::Discarded);
        assert_eq!(editor.canvas.document.len(), 1);
    }

    #[test]
    fn test_failure_waits_for_other_queries_and_sticks() {
        let mut editor = editor();
        type_line(&mut editor, "/gpt one");
        type_line(&mut editor, "/gpt two");
        let ids: Vec<u64> = editor.pending_queries().iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 2);

        editor.resolve_query(ids[0], Err(AssistantError::Request("timeout".into())));
        assert_eq!(editor.canvas.assistant_status, AssistantStatus::Pending);

        let resolution = editor.resolve_query(ids[1], Ok("fine".into()));
        assert!(matches!(resolution, QueryResolution::Inserted(_)));
        assert!(matches!(editor.canvas.assistant_status, AssistantStatus::Failed(_)));

        // A fresh query starts clean
        type_line(&mut editor, "/gpt three");
        assert_eq!(editor.canvas.assistant_status, AssistantStatus::Pending);
        let id = editor.pending_queries()[0].id;
        editor.resolve_query(id, Ok("ok".into()));
        assert_eq!(editor.canvas.assistant_status, AssistantStatus::Idle);
    }

    #[test]
    fn test_empty_command_is_dropped() {
        let mut editor = editor();
        type_line(&mut editor, "/gpt    ");
        assert!(editor.pending_queries().is_empty());
        assert!(editor.canvas.document.is_empty());
        assert!(editor.canvas.typing_text.is_empty());
    }

    #[test]
    fn test_session_export_import() {
        let mut editor = editor();
        type_line(&mut editor, "kept");
        editor.canvas.typing_text = "draft".to_string();
        editor.set_mode(Mode::Select);
        editor.toggle_grid();
        let session = editor.export_session();

        let mut other = self::editor();
        other.import_session(session.clone()).unwrap();
        assert_eq!(other.export_session(), session);
        assert_eq!(other.mode(), Mode::Select);
        assert!(!other.canvas.history.can_undo());
    }

    #[test]
    fn test_import_rejects_future_version() {
        let mut editor = editor();
        let session = SessionSnapshot {
            version: 99,
            objects: vec![TextObject::new(Point::ZERO, "x", 16.0).into()],
            ..SessionSnapshot::default()
        };
        assert!(editor.import_session(session).is_err());
        assert!(editor.canvas.document.is_empty());
    }
}
