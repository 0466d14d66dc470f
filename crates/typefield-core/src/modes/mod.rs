//! Interaction modes.
//!
//! Each mode owns a strategy implementing [`ModeStrategy`]; the
//! [`ModeMachine`] dispatches every event to the strategy of the current
//! mode. Modes only change through [`ModeMachine::set_mode`] and
//! [`ModeMachine::cycle`].

mod link;
mod select;
mod typography;

pub use link::{LinkMode, LinkState};
pub use select::SelectMode;
pub use typography::TypographyMode;

use crate::assistant::AssistantCommand;
use crate::canvas::Canvas;
use crate::input::{KeyEvent, PointerEvent};
use serde::{Deserialize, Serialize};

/// The three interaction modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Type and commit text; drag text; pan on empty space.
    #[default]
    Typography,
    /// Connect text objects with links.
    Link,
    /// Select, marquee, move and delete.
    Select,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Typography, Mode::Link, Mode::Select];

    pub fn next(self) -> Self {
        match self {
            Mode::Typography => Mode::Link,
            Mode::Link => Mode::Select,
            Mode::Select => Mode::Typography,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Mode::Typography => Mode::Select,
            Mode::Link => Mode::Typography,
            Mode::Select => Mode::Link,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Typography => "Typography",
            Mode::Link => "Link",
            Mode::Select => "Select",
        }
    }
}

/// What a strategy did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutcome {
    /// The event was not for this mode.
    Ignored,
    Handled,
    /// The typing buffer held an assistant command; the editor takes it from here.
    AssistantQuery(AssistantCommand),
}

impl ModeOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, ModeOutcome::Ignored)
    }
}

/// Per-mode event handling.
pub trait ModeStrategy {
    fn on_pointer_down(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome;
    fn on_pointer_move(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome;
    fn on_pointer_up(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome;
    fn on_key_down(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> ModeOutcome;
    /// Called when leaving the mode; must abandon any in-progress gesture.
    fn on_exit(&mut self, canvas: &mut Canvas);
}

/// Current mode plus one strategy per mode.
#[derive(Debug, Default)]
pub struct ModeMachine {
    current: Mode,
    typography: TypographyMode,
    link: LinkMode,
    select: SelectMode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.current
    }

    /// Link-mode sub-state (for drawing the creation preview).
    pub fn link_state(&self) -> &LinkState {
        self.link.state()
    }

    fn strategy_mut(&mut self) -> &mut dyn ModeStrategy {
        match self.current {
            Mode::Typography => &mut self.typography,
            Mode::Link => &mut self.link,
            Mode::Select => &mut self.select,
        }
    }

    /// Switch mode. The old mode's strategy gets `on_exit` first.
    pub fn set_mode(&mut self, canvas: &mut Canvas, mode: Mode) -> bool {
        if mode == self.current {
            return false;
        }
        self.strategy_mut().on_exit(canvas);
        log::info!("Mode {} -> {}", self.current.name(), mode.name());
        self.current = mode;
        canvas.request_redraw();
        true
    }

    /// Step to the next (or previous) mode.
    pub fn cycle(&mut self, canvas: &mut Canvas, forward: bool) -> Mode {
        let target = if forward {
            self.current.next()
        } else {
            self.current.prev()
        };
        self.set_mode(canvas, target);
        self.current
    }

    pub fn pointer_down(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        self.strategy_mut().on_pointer_down(canvas, event)
    }

    pub fn pointer_move(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        self.strategy_mut().on_pointer_move(canvas, event)
    }

    pub fn pointer_up(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        self.strategy_mut().on_pointer_up(canvas, event)
    }

    pub fn key_down(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> ModeOutcome {
        self.strategy_mut().on_key_down(canvas, event)
    }

    /// Abandon whatever the current mode is doing (e.g. before undo or import).
    pub fn interrupt(&mut self, canvas: &mut Canvas) {
        self.strategy_mut().on_exit(canvas);
    }
}
