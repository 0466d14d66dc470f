//! Storage abstraction for session persistence.

mod autosave;
mod memory;
mod session;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{
    AutoSaveManager, DEFAULT_SESSION_KEY, LAST_SESSION_KEY, PlatformAutoSaveManager, PlatformStorage,
    create_autosave_manager, create_default_storage,
};
pub use memory::MemoryStorage;
pub use session::{SESSION_FORMAT_VERSION, SessionSnapshot};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unsupported session format version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for session storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Save a session.
    fn save(&self, id: &str, session: &SessionSnapshot) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a session.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SessionSnapshot>>;

    /// Delete a session.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all session IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a session exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for session storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, id: &str, session: &SessionSnapshot) -> BoxFuture<'_, StorageResult<()>>;
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SessionSnapshot>>;
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
