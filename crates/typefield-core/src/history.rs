//! Undo/redo history.
//!
//! Linear snapshot stacks: recording a new action clears the redo stack, and
//! the oldest snapshot is dropped once the configured depth is exceeded.

use crate::document::CanvasDocument;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Everything an undo step restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Objects and z-order.
    pub document: CanvasDocument,
    pub offset: Vec2,
    pub scale: f64,
    pub typing_text: String,
    pub display_size: f64,
    pub logical_size: f64,
}

/// Snapshot-based undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<HistorySnapshot>,
    redo_stack: Vec<HistorySnapshot>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(crate::config::CanvasConfig::default().history_depth)
    }
}

impl History {
    /// Create an empty history keeping at most `depth` undo steps.
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the state from before an action.
    pub fn push(&mut self, before: HistorySnapshot) {
        self.undo_stack.push(before);

        // Clear redo stack when new changes are made
        self.redo_stack.clear();

        if self.undo_stack.len() > self.depth {
            self.undo_stack.remove(0);
        }
    }

    /// Step back. `current` is parked on the redo stack and the previous
    /// state returned for the caller to restore.
    pub fn undo(&mut self, current: HistorySnapshot) -> Option<HistorySnapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        log::debug!("Undo ({} left)", self.undo_stack.len());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: HistorySnapshot) -> Option<HistorySnapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        log::debug!("Redo ({} left)", self.redo_stack.len());
        Some(next)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Forget everything (used on import).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str) -> HistorySnapshot {
        HistorySnapshot {
            document: CanvasDocument::new(),
            offset: Vec2::ZERO,
            scale: 1.0,
            typing_text: text.to_string(),
            display_size: 16.0,
            logical_size: 16.0,
        }
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut history = History::new(10);
        history.push(snap("a"));
        let current = snap("b");

        let restored = history.undo(current.clone()).unwrap();
        assert_eq!(restored, snap("a"));
        let again = history.redo(restored).unwrap();
        assert_eq!(again, current);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut history = History::new(10);
        history.push(snap("a"));
        let _ = history.undo(snap("b"));
        assert!(history.can_redo());
        history.push(snap("a"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_history_is_noop() {
        let mut history = History::new(10);
        assert!(history.undo(snap("x")).is_none());
        assert!(history.redo(snap("x")).is_none());
    }

    #[test]
    fn test_depth_limit_drops_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(snap(&i.to_string()));
        }
        assert_eq!(history.undo_len(), 3);
        let mut current = snap("now");
        let mut seen = Vec::new();
        while let Some(previous) = history.undo(current) {
            seen.push(previous.typing_text.clone());
            current = previous;
        }
        assert_eq!(seen, vec!["4", "3", "2"]);
    }
}
