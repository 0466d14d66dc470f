//! Keyboard shortcut registry and documentation.

use typefield_core::modes::Mode;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Mode the shortcut applies in; None for global shortcuts.
    pub mode: Option<Mode>,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn global(
        key: &'static str,
        ctrl: bool,
        alt: bool,
        shift: bool,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            alt,
            shift,
            mode: None,
            description,
        }
    }

    pub const fn in_mode(mode: Mode, key: &'static str, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift,
            mode: Some(mode),
            description,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use Mode::{Link, Select, Typography};
        vec![
            Shortcut::global("Tab", false, false, false, "Next mode"),
            Shortcut::global("Tab", false, false, true, "Previous mode"),
            Shortcut::global("Z", true, false, false, "Undo"),
            Shortcut::global("Z", true, false, true, "Redo"),
            Shortcut::global("Y", true, false, false, "Redo"),
            Shortcut::global("=", true, false, false, "Zoom in"),
            Shortcut::global("-", true, false, false, "Zoom out"),
            Shortcut::global("0", true, false, false, "Reset zoom"),
            Shortcut::global("1", true, false, false, "Fit to content"),
            Shortcut::global("=", false, true, false, "Larger display font"),
            Shortcut::global("-", false, true, false, "Smaller display font"),
            Shortcut::global("=", false, true, true, "Larger logical font"),
            Shortcut::global("-", false, true, true, "Smaller logical font"),
            Shortcut::global("G", true, false, false, "Add guide"),
            Shortcut::in_mode(Typography, "Enter", false, "Commit text (or send /gpt question)"),
            Shortcut::in_mode(Typography, "Enter", true, "New line"),
            Shortcut::in_mode(Typography, "Escape", false, "Clear text box"),
            Shortcut::in_mode(Link, "Escape", false, "Cancel link"),
            Shortcut::in_mode(Select, "A", false, "Select all").with_ctrl(),
            Shortcut::in_mode(Select, "Arrows", false, "Nudge by one grid unit"),
            Shortcut::in_mode(Select, "Arrows", true, "Nudge by ten grid units"),
            Shortcut::in_mode(Select, "Delete", false, "Delete selection"),
            Shortcut::in_mode(Select, "Backspace", false, "Delete selection"),
            Shortcut::in_mode(Select, "+", false, "Grow selection"),
            Shortcut::in_mode(Select, "-", false, "Shrink selection"),
            Shortcut::in_mode(Select, "]", false, "Bring to front"),
            Shortcut::in_mode(Select, "[", false, "Send to back"),
            Shortcut::in_mode(Select, "Escape", false, "Cancel drag or clear selection"),
        ]
    }

    /// Shortcuts active in `mode` (globals included).
    pub fn for_mode(mode: Mode) -> Vec<Shortcut> {
        Self::all()
            .into_iter()
            .filter(|shortcut| shortcut.mode.is_none_or(|m| m == mode))
            .collect()
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            let scope = shortcut.mode.map_or("Global", Mode::name);
            println!(
                "  {:20} {:12} {}",
                shortcut.format(),
                scope,
                shortcut.description
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let redo = Shortcut::global("Z", true, false, true, "Redo");
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
        let logical = Shortcut::global("=", false, true, true, "Larger logical font");
        assert_eq!(logical.format(), "Alt+Shift+=");
    }

    #[test]
    fn test_for_mode_filters() {
        let link = ShortcutRegistry::for_mode(Mode::Link);
        assert!(link.iter().any(|s| s.description == "Cancel link"));
        assert!(!link.iter().any(|s| s.description == "Select all"));
        assert!(link.iter().any(|s| s.description == "Undo"));
    }
}
