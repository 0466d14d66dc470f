//! Debounced session auto-save.
//!
//! Every change reschedules a single-shot timer; the session is written once
//! the user has been idle for the debounce delay.

use super::{SessionSnapshot, Storage, StorageResult};
use crate::timer::{DebounceTimer, Duration, Instant};
use std::sync::Arc;

/// Key under which the most recent session is always mirrored.
pub const LAST_SESSION_KEY: &str = "__last_session__";

/// Default key for the working session.
pub const DEFAULT_SESSION_KEY: &str = "default";

/// Manages debounced session persistence.
pub struct AutoSaveManager<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Debounce timer, rescheduled on every change.
    timer: DebounceTimer,
    /// Whether the session has unsaved changes.
    dirty: bool,
    /// Key the working session is saved under.
    session_key: String,
    /// Last successful save.
    last_save: Option<Instant>,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>, debounce: Duration) -> Self {
        Self {
            storage,
            timer: DebounceTimer::new(debounce),
            dirty: false,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            last_save: None,
        }
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Record a change at `now`, restarting the debounce window.
    pub fn notify_change(&mut self, now: Instant) {
        self.dirty = true;
        self.timer.schedule(now);
    }

    /// Check if the session has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a save is waiting on the debounce timer.
    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// True once per debounce window, when the timer has elapsed and there
    /// are unsaved changes.
    pub fn poll_due(&mut self, now: Instant) -> bool {
        self.timer.poll(now) && self.dirty
    }

    /// Save if the debounce window has elapsed. Returns true if a save happened.
    pub async fn maybe_save(
        &mut self,
        now: Instant,
        session: &SessionSnapshot,
    ) -> StorageResult<bool> {
        if !self.poll_due(now) {
            return Ok(false);
        }
        self.save_session(session).await?;
        Ok(true)
    }

    /// Save immediately, under the session key and the last-session key.
    pub async fn save_session(&mut self, session: &SessionSnapshot) -> StorageResult<()> {
        self.timer.cancel();
        self.storage.save(&self.session_key, session).await?;
        // Also save as the "last session" for auto-restore
        self.storage.save(LAST_SESSION_KEY, session).await?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("Auto-saved session {:?}", self.session_key);
        Ok(())
    }

    /// Load a session by key and make it the working session.
    pub async fn load(&mut self, key: &str) -> StorageResult<SessionSnapshot> {
        let session = self.storage.load(key).await?;
        self.session_key = key.to_string();
        self.dirty = false;
        self.timer.cancel();
        Ok(session)
    }

    /// Load the most recently saved session, if there is one.
    pub async fn load_session(&mut self) -> Option<SessionSnapshot> {
        match self.storage.load(LAST_SESSION_KEY).await {
            Ok(session) => {
                self.dirty = false;
                self.timer.cancel();
                Some(session)
            }
            Err(e) => {
                log::debug!("No previous session: {e}");
                None
            }
        }
    }

    /// List saved sessions, excluding the last-session mirror.
    pub async fn list_sessions(&self) -> StorageResult<Vec<String>> {
        let mut ids = self.storage.list().await?;
        ids.retain(|id| id != LAST_SESSION_KEY);
        Ok(ids)
    }

    /// Flush pending changes and stop the timer (call on teardown).
    pub async fn shutdown(&mut self, session: &SessionSnapshot) -> StorageResult<()> {
        let pending = self.timer.flush();
        if pending || self.dirty {
            self.save_session(session).await?;
        }
        Ok(())
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::MemoryStorage>> {
    Ok(Arc::new(crate::storage::MemoryStorage::new()))
}

/// Convenience type alias for platform-specific storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::MemoryStorage;

/// Type alias for the auto-save manager with platform-specific storage.
pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStorage>;

/// Create an auto-save manager over the default storage.
pub fn create_autosave_manager(debounce: Duration) -> StorageResult<PlatformAutoSaveManager> {
    let storage = create_default_storage()?;
    Ok(AutoSaveManager::new(storage, debounce))
}
