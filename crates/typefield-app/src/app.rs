//! The application shell.
//!
//! [`App`] owns an [`Editor`] and everything around it that is not editing:
//! the frame scheduler and renderer, debounced autosave, resize settling and
//! the assistant client. Time only moves on `Tick` events, so a replayed
//! script behaves the same on every run.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::script::{Script, ScriptEvent};
use kurbo::Size;
use std::fmt;
use std::sync::Arc;
use typefield_core::assistant::{AssistantClient, AssistantStatus};
use typefield_core::editor::{Editor, QueryResolution};
use typefield_core::input::KeyEvent;
use typefield_core::modes::Mode;
use typefield_core::objects::ObjectKind;
use typefield_core::storage::{AutoSaveManager, Storage, StorageError};
use typefield_core::timer::{DebounceTimer, Duration, Instant};
use typefield_render::{DisplayList, DisplayListRenderer, FrameScheduler, GridStyle, RenderContext};

/// What a replay left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub events: usize,
    pub objects: usize,
    pub texts: usize,
    pub guides: usize,
    pub links: usize,
    pub frames: u64,
    pub mode: Mode,
    pub scale: f64,
    pub session_key: String,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Replayed {} event(s) in {} frame(s)",
            self.events, self.frames
        )?;
        writeln!(
            f,
            "Objects: {} ({} text, {} guide, {} link)",
            self.objects, self.texts, self.guides, self.links
        )?;
        writeln!(f, "Mode: {}, scale {:.2}", self.mode.name(), self.scale)?;
        write!(f, "Session saved as {:?}", self.session_key)
    }
}

pub struct App<S: Storage> {
    editor: Editor,
    renderer: DisplayListRenderer,
    scheduler: FrameScheduler,
    autosave: AutoSaveManager<S>,
    assistant: Box<dyn AssistantClient>,
    grid_style: GridStyle,
    viewport_size: Size,
    pending_resize: Option<Size>,
    resize_timer: DebounceTimer,
    now: Instant,
    events: usize,
}

impl<S: Storage> App<S> {
    pub fn new(config: &AppConfig, storage: Arc<S>, assistant: Box<dyn AssistantClient>) -> Self {
        let canvas_config = config.canvas.clone();
        let autosave = AutoSaveManager::new(
            storage,
            Duration::from_millis(canvas_config.autosave_debounce_ms),
        )
        .with_session_key(config.session_key.clone());
        let resize_timer = DebounceTimer::from_millis(canvas_config.resize_settle_ms);

        Self {
            editor: Editor::new(canvas_config, config.viewport),
            renderer: DisplayListRenderer::new(),
            scheduler: FrameScheduler::new(),
            autosave,
            assistant,
            grid_style: config.grid(),
            viewport_size: config.viewport,
            pending_resize: None,
            resize_timer,
            now: Instant::now(),
            events: 0,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// The most recently built frame.
    pub fn display_list(&self) -> &DisplayList {
        self.renderer.display_list()
    }

    pub fn frames(&self) -> u64 {
        self.scheduler.frames()
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    pub fn autosave(&self) -> &AutoSaveManager<S> {
        &self.autosave
    }

    /// Load the configured session into the editor. Returns false when there
    /// is nothing saved under the key yet.
    pub async fn restore_session(&mut self) -> Result<bool, AppError> {
        let key = self.autosave.session_key().to_string();
        let session = match self.autosave.load(&key).await {
            Ok(session) => session,
            Err(StorageError::NotFound(_)) => {
                log::info!("No saved session {key:?}, starting empty");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        self.editor.import_session(session)?;
        // Importing is not an edit
        self.editor.canvas.take_unsaved();
        self.scheduler.mark_dirty();
        log::info!(
            "Restored session {key:?} with {} object(s)",
            self.editor.canvas.document.len()
        );
        Ok(true)
    }

    /// Apply one scripted event, then let the shell catch up: answer
    /// assistant queries, schedule autosave and draw a frame if one is due.
    pub async fn handle(&mut self, event: &ScriptEvent) -> Result<(), AppError> {
        self.events += 1;
        self.apply(event);
        self.answer_queries().await;

        if self.editor.canvas.take_unsaved() {
            self.autosave.notify_change(self.now);
        }
        if self.autosave.is_dirty() {
            let session = self.editor.export_session();
            if self.autosave.maybe_save(self.now, &session).await? {
                log::debug!("Autosaved after {} event(s)", self.events);
            }
        }

        self.scheduler.absorb(&mut self.editor.canvas);
        let ctx = RenderContext::new(&self.editor, self.viewport_size)
            .with_grid(self.grid_style)
            .with_caret(self.editor.mode() == Mode::Typography);
        self.scheduler.render(&mut self.renderer, &ctx)?;
        Ok(())
    }

    fn apply(&mut self, event: &ScriptEvent) {
        let editor = &mut self.editor;
        match event {
            ScriptEvent::PointerDown { x, y, modifiers } => {
                editor.pointer_down(&ScriptEvent::pointer(*x, *y, *modifiers));
            }
            ScriptEvent::PointerMove { x, y, modifiers } => {
                editor.pointer_move(&ScriptEvent::pointer(*x, *y, *modifiers));
            }
            ScriptEvent::PointerUp { x, y, modifiers } => {
                editor.pointer_up(&ScriptEvent::pointer(*x, *y, *modifiers));
            }
            ScriptEvent::Click { x, y, modifiers } => {
                let pointer = ScriptEvent::pointer(*x, *y, *modifiers);
                editor.pointer_down(&pointer);
                editor.pointer_up(&pointer);
            }
            ScriptEvent::Drag {
                from,
                to,
                modifiers,
            } => {
                editor.pointer_down(&ScriptEvent::pointer(from.x, from.y, *modifiers));
                let mid = from.midpoint(*to);
                editor.pointer_move(&ScriptEvent::pointer(mid.x, mid.y, *modifiers));
                let end = ScriptEvent::pointer(to.x, to.y, *modifiers);
                editor.pointer_move(&end);
                editor.pointer_up(&end);
            }
            ScriptEvent::Key { key, modifiers } => {
                editor.key_down(&KeyEvent::new(key.clone()).with_modifiers(*modifiers));
            }
            ScriptEvent::Type { text } => {
                for key in ScriptEvent::typed(text) {
                    editor.key_down(&key);
                }
            }
            ScriptEvent::Wheel {
                x,
                y,
                dx,
                dy,
                modifiers,
            } => {
                editor.wheel(&ScriptEvent::wheel_event(*x, *y, *dx, *dy, *modifiers));
            }
            ScriptEvent::Resize { width, height } => match ScriptEvent::size(*width, *height) {
                Some(size) => {
                    self.pending_resize = Some(size);
                    self.resize_timer.schedule(self.now);
                }
                None => log::warn!("Ignoring resize to {width}x{height}"),
            },
            ScriptEvent::SetMode { mode } => {
                editor.set_mode(*mode);
            }
            ScriptEvent::AddGuide => {
                editor.add_guide();
            }
            ScriptEvent::FitToContent => {
                editor.fit_to_content();
            }
            ScriptEvent::ToggleGrid => {
                editor.toggle_grid();
            }
            ScriptEvent::ToggleSnap => {
                editor.toggle_snap();
            }
            ScriptEvent::CycleLinkStyle => editor.cycle_link_style(),
            ScriptEvent::Undo => {
                editor.undo();
            }
            ScriptEvent::Redo => {
                editor.redo();
            }
            ScriptEvent::Tick { ms } => self.advance(Duration::from_millis(*ms)),
        }
    }

    /// Move the clock forward and fire whatever timers came due.
    fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
        if self.resize_timer.poll(self.now) {
            self.settle_resize();
        }
    }

    fn settle_resize(&mut self) {
        if let Some(size) = self.pending_resize.take() {
            log::debug!("Viewport settled at {}x{}", size.width, size.height);
            self.viewport_size = size;
            self.editor.resize(size);
        }
    }

    async fn answer_queries(&mut self) {
        for query in self.editor.take_outgoing_queries() {
            let answer = self.assistant.ask(&query.question).await;
            match self.editor.resolve_query(query.id, answer) {
                QueryResolution::Inserted(ids) => {
                    log::debug!("Query {} inserted {} object(s)", query.id, ids.len());
                }
                QueryResolution::Discarded => log::debug!("Query {} discarded", query.id),
                QueryResolution::Failed(_) => {}
            }
        }
    }

    pub fn assistant_status(&self) -> &AssistantStatus {
        &self.editor.canvas.assistant_status
    }

    /// Replay every event in `script`, then flush.
    pub async fn replay(&mut self, script: &Script) -> Result<ReplaySummary, AppError> {
        for event in &script.events {
            self.handle(event).await?;
        }
        self.shutdown().await?;
        Ok(self.summary())
    }

    /// Settle a pending resize and save unsaved changes.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        if self.resize_timer.flush() {
            self.settle_resize();
        }
        if self.editor.canvas.take_unsaved() {
            self.autosave.notify_change(self.now);
        }
        let session = self.editor.export_session();
        self.autosave.shutdown(&session).await?;
        Ok(())
    }

    pub fn summary(&self) -> ReplaySummary {
        let document = &self.editor.canvas.document;
        let count = |kind: ObjectKind| {
            document
                .ordered()
                .filter(|object| object.kind() == kind)
                .count()
        };
        ReplaySummary {
            events: self.events,
            objects: document.len(),
            texts: count(ObjectKind::Text),
            guides: count(ObjectKind::Guide),
            links: count(ObjectKind::Link),
            frames: self.scheduler.frames(),
            mode: self.editor.mode(),
            scale: self.editor.canvas.viewport.scale(),
            session_key: self.autosave.session_key().to_string(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl App<typefield_core::storage::FileStorage> {
    /// Build an app over file storage: the configured directory, or the
    /// platform data directory.
    pub fn from_config(
        config: &AppConfig,
        assistant: Box<dyn AssistantClient>,
    ) -> Result<Self, AppError> {
        use typefield_core::storage::FileStorage;

        let storage = match &config.storage_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        log::info!("Sessions stored in {}", storage.base_path().display());
        Ok(Self::new(config, Arc::new(storage), assistant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typefield_core::assistant::CannedAssistant;
    use typefield_core::storage::MemoryStorage;

    fn app_with(storage: Arc<MemoryStorage>, assistant: CannedAssistant) -> App<MemoryStorage> {
        App::new(&AppConfig::default(), storage, Box::new(assistant))
    }

    fn script(json: &str) -> Script {
        Script::from_json(json).unwrap()
    }

    #[test]
    fn test_replay_types_and_saves() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app_with(storage.clone(), CannedAssistant::new());
        let summary = pollster::block_on(app.replay(&script(
            r#"{ "events": [
                { "type": "type", "text": "hello" },
                { "type": "key", "key": "Enter" },
                { "type": "type", "text": "world" },
                { "type": "key", "key": "Enter" }
            ] }"#,
        )))
        .unwrap();

        assert_eq!(summary.events, 4);
        assert_eq!(summary.texts, 2);
        assert_eq!(summary.mode, Mode::Typography);
        assert!(pollster::block_on(storage.exists(&summary.session_key)).unwrap());
        assert!(!app.autosave().is_dirty());
    }

    #[test]
    fn test_autosave_waits_for_debounce() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app_with(storage.clone(), CannedAssistant::new());
        let key = app.autosave().session_key().to_string();

        pollster::block_on(app.handle(&ScriptEvent::Type { text: "a".into() })).unwrap();
        pollster::block_on(app.handle(&ScriptEvent::Key {
            key: typefield_core::input::Key::Enter,
            modifiers: Default::default(),
        }))
        .unwrap();
        assert!(app.autosave().is_dirty());
        assert!(!pollster::block_on(storage.exists(&key)).unwrap());

        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 2_000 })).unwrap();
        assert!(!app.autosave().is_dirty());
        assert!(pollster::block_on(storage.exists(&key)).unwrap());
    }

    #[test]
    fn test_assistant_answer_is_inserted() {
        let assistant = CannedAssistant::new().with_reply("why?", "Because it is.");
        let mut app = app_with(Arc::new(MemoryStorage::new()), assistant);
        let summary = pollster::block_on(app.replay(&script(
            r#"{ "events": [
                { "type": "type", "text": "/gpt why?" },
                { "type": "key", "key": "Enter" }
            ] }"#,
        )))
        .unwrap();

        assert_eq!(summary.texts, 2);
        assert_eq!(app.assistant_status(), &AssistantStatus::Idle);
        let texts: Vec<_> = app
            .editor()
            .canvas
            .document
            .ordered()
            .filter_map(|object| object.as_text())
            .map(|text| text.content.clone())
            .collect();
        assert!(texts.iter().any(|t| t == "why?"));
        assert!(texts.iter().any(|t| t.contains("Because")));
    }

    #[test]
    fn test_unanswered_query_fails() {
        let mut app = app_with(Arc::new(MemoryStorage::new()), CannedAssistant::new());
        pollster::block_on(app.replay(&script(
            r#"{ "events": [
                { "type": "type", "text": "/gpt anyone?" },
                { "type": "key", "key": "Enter" }
            ] }"#,
        )))
        .unwrap();

        assert!(matches!(app.assistant_status(), AssistantStatus::Failed(_)));
        assert!(app.editor().pending_queries().is_empty());
        // Only the question
        assert_eq!(app.summary().texts, 1);
    }

    #[test]
    fn test_resize_settles_after_quiet_period() {
        let mut app = app_with(Arc::new(MemoryStorage::new()), CannedAssistant::new());
        let before = app.viewport_size();

        pollster::block_on(app.handle(&ScriptEvent::Resize {
            width: 900.0,
            height: 600.0,
        }))
        .unwrap();
        pollster::block_on(app.handle(&ScriptEvent::Resize {
            width: 1000.0,
            height: 700.0,
        }))
        .unwrap();
        assert_eq!(app.viewport_size(), before);

        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 10 })).unwrap();
        assert_eq!(app.viewport_size(), before);

        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 1_000 })).unwrap();
        assert_eq!(app.viewport_size(), Size::new(1000.0, 700.0));
        assert_eq!(
            app.editor().canvas.viewport.size,
            Size::new(1000.0, 700.0)
        );
    }

    #[test]
    fn test_invalid_resize_is_ignored() {
        let mut app = app_with(Arc::new(MemoryStorage::new()), CannedAssistant::new());
        let before = app.viewport_size();
        pollster::block_on(app.handle(&ScriptEvent::Resize {
            width: 0.0,
            height: 600.0,
        }))
        .unwrap();
        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 1_000 })).unwrap();
        assert_eq!(app.viewport_size(), before);
    }

    #[test]
    fn test_idle_ticks_draw_nothing() {
        let mut app = app_with(Arc::new(MemoryStorage::new()), CannedAssistant::new());
        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 16 })).unwrap();
        let frames = app.frames();
        assert_eq!(frames, 1);

        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 16 })).unwrap();
        pollster::block_on(app.handle(&ScriptEvent::Tick { ms: 16 })).unwrap();
        assert_eq!(app.frames(), frames);

        pollster::block_on(app.handle(&ScriptEvent::AddGuide)).unwrap();
        assert_eq!(app.frames(), frames + 1);
        assert!(!app.display_list().is_empty());
    }

    #[test]
    fn test_restore_session_roundtrip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut first = app_with(storage.clone(), CannedAssistant::new());
        pollster::block_on(first.replay(&script(
            r#"{ "events": [
                { "type": "type", "text": "kept" },
                { "type": "key", "key": "Enter" },
                { "type": "add_guide" },
                { "type": "set_mode", "mode": "Select" }
            ] }"#,
        )))
        .unwrap();

        let mut second = app_with(storage, CannedAssistant::new());
        assert!(pollster::block_on(second.restore_session()).unwrap());
        let summary = second.summary();
        assert_eq!(summary.texts, 1);
        assert_eq!(summary.guides, 1);
        assert_eq!(summary.mode, Mode::Select);
        assert!(!second.editor().canvas.has_unsaved());
    }

    #[test]
    fn test_restore_without_saved_session() {
        let mut app = app_with(Arc::new(MemoryStorage::new()), CannedAssistant::new());
        assert!(!pollster::block_on(app.restore_session()).unwrap());
        assert!(app.editor().canvas.document.is_empty());
    }

    #[test]
    fn test_file_storage_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        let mut app = App::from_config(&config, Box::new(CannedAssistant::new())).unwrap();
        pollster::block_on(app.replay(&script(
            r#"{ "events": [ { "type": "add_guide" } ] }"#,
        )))
        .unwrap();

        let saved = dir.path().join(format!("{}.json", config.session_key));
        assert!(saved.exists());
    }

    #[test]
    fn test_summary_display() {
        let app = app_with(Arc::new(MemoryStorage::new()), CannedAssistant::new());
        let text = app.summary().to_string();
        assert!(text.starts_with("Replayed 0 event(s)"));
        assert!(text.contains("Mode: Typography"));
    }
}
