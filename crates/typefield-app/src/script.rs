//! Scripted input sessions.
//!
//! A script is a JSON document listing input events in order, plus canned
//! assistant replies keyed by question:
//!
//! ```json
//! {
//!   "replies": { "why?": "Because." },
//!   "events": [
//!     { "type": "type", "text": "hello" },
//!     { "type": "key", "key": "Enter" },
//!     { "type": "tick", "ms": 2000 }
//!   ]
//! }
//! ```

use crate::error::AppError;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use typefield_core::assistant::CannedAssistant;
use typefield_core::input::{Key, KeyEvent, Modifiers, PointerEvent, WheelEvent};
use typefield_core::modes::Mode;

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press and release at the same point.
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press-move-release from one point to another.
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Type each character of `text` (use `\n` for Shift+Enter).
    Type { text: String },
    Wheel {
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Resize { width: f64, height: f64 },
    SetMode { mode: Mode },
    AddGuide,
    FitToContent,
    ToggleGrid,
    ToggleSnap,
    CycleLinkStyle,
    Undo,
    Redo,
    /// Advance the clock (drives autosave and resize settling).
    Tick { ms: u64 },
}

impl ScriptEvent {
    pub fn pointer(x: f64, y: f64, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::new(Point::new(x, y)).with_modifiers(modifiers)
    }

    pub fn wheel_event(x: f64, y: f64, dx: f64, dy: f64, modifiers: Modifiers) -> WheelEvent {
        WheelEvent::new(Point::new(x, y), Vec2::new(dx, dy)).with_modifiers(modifiers)
    }

    /// Key events for typing `text`.
    pub fn typed(text: &str) -> Vec<KeyEvent> {
        text.chars()
            .map(|c| match c {
                '\n' => KeyEvent::new(Key::Enter).with_modifiers(Modifiers::shift()),
                c => KeyEvent::char(c),
            })
            .collect()
    }

    pub fn size(width: f64, height: f64) -> Option<Size> {
        (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
            .then(|| Size::new(width, height))
    }
}

/// A whole scripted session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub replies: HashMap<String, String>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| AppError::Script(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// An assistant answering from this script's replies.
    pub fn assistant(&self) -> CannedAssistant {
        let mut assistant = CannedAssistant::new();
        for (question, answer) in &self.replies {
            assistant.insert(question.clone(), answer.clone());
        }
        assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_events() {
        let script = Script::from_json(
            r#"{
                "replies": { "why?": "Because." },
                "events": [
                    { "type": "type", "text": "a\nb" },
                    { "type": "key", "key": "Enter" },
                    { "type": "key", "key": { "Char": "z" }, "modifiers": { "ctrl": true } },
                    { "type": "click", "x": 10.0, "y": 20.0, "modifiers": { "shift": true } },
                    { "type": "set_mode", "mode": "Link" },
                    { "type": "add_guide" },
                    { "type": "tick", "ms": 1500 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.events.len(), 7);
        assert_eq!(script.replies.get("why?").map(String::as_str), Some("Because."));
        assert_eq!(
            script.events[4],
            ScriptEvent::SetMode { mode: Mode::Link }
        );
    }

    #[test]
    fn test_typed_maps_newline_to_shift_enter() {
        let keys = ScriptEvent::typed("a\nb");
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[1].key, Key::Enter);
        assert!(keys[1].modifiers.shift);
    }

    #[test]
    fn test_unknown_event_is_a_script_error() {
        let err = Script::from_json(r#"{ "events": [ { "type": "explode" } ] }"#).unwrap_err();
        assert!(matches!(err, AppError::Script(_)));
    }

    #[test]
    fn test_size_rejects_degenerate() {
        assert!(ScriptEvent::size(0.0, 10.0).is_none());
        assert_eq!(ScriptEvent::size(4.0, 3.0), Some(Size::new(4.0, 3.0)));
    }
}
