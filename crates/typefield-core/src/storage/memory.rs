//! In-memory storage implementation.

use super::{BoxFuture, SessionSnapshot, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    sessions: RwLock<HashMap<String, SessionSnapshot>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, session: &SessionSnapshot) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let session = session.clone();
        Box::pin(async move {
            let mut sessions = self.sessions.write().map_err(lock_error)?;
            sessions.insert(id, session);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SessionSnapshot>> {
        let id = id.to_string();
        Box::pin(async move {
            let sessions = self.sessions.read().map_err(lock_error)?;
            sessions
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut sessions = self.sessions.write().map_err(lock_error)?;
            sessions.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let sessions = self.sessions.read().map_err(lock_error)?;
            Ok(sessions.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let sessions = self.sessions.read().map_err(lock_error)?;
            Ok(sessions.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_util::block_on;

    fn session(text: &str) -> SessionSnapshot {
        SessionSnapshot {
            typing_text: text.to_string(),
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        block_on(storage.save("test", &session("hello"))).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();
        assert_eq!(loaded.typing_text, "hello");
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &session(""))).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());
        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("s1", &session(""))).unwrap();
        block_on(storage.save("s2", &session(""))).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"s1".to_string()));
        assert!(list.contains(&"s2".to_string()));
    }
}
