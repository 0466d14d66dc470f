//! Select mode: the full selection engine plus keyboard batch operations.

use super::{ModeOutcome, ModeStrategy};
use crate::canvas::Canvas;
use crate::input::{Key, KeyEvent, PointerEvent};
use crate::selection;

#[derive(Debug, Default)]
pub struct SelectMode;

impl ModeStrategy for SelectMode {
    fn on_pointer_down(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        selection::press(canvas, event);
        ModeOutcome::Handled
    }

    fn on_pointer_move(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        if selection::drag_to(canvas, event.position) {
            ModeOutcome::Handled
        } else {
            ModeOutcome::Ignored
        }
    }

    fn on_pointer_up(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        selection::release(canvas, event.position);
        ModeOutcome::Handled
    }

    fn on_key_down(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> ModeOutcome {
        let mods = event.modifiers;
        if let Some(direction) = event.key.arrow_direction() {
            selection::nudge(canvas, direction, mods.shift);
            return ModeOutcome::Handled;
        }
        let handled = match &event.key {
            Key::Delete | Key::Backspace => {
                selection::delete_selected(canvas);
                true
            }
            Key::Escape => {
                if !selection::cancel(canvas) {
                    selection::clear(canvas);
                }
                true
            }
            key if mods.command() && key.is_char('a') => {
                selection::select_all(canvas);
                true
            }
            Key::Char('+') | Key::Char('=') if !mods.command() && !mods.alt => {
                let ids = canvas.selection.ids().to_vec();
                canvas.rescale(&ids, 1);
                true
            }
            Key::Char('-') | Key::Char('_') if !mods.command() && !mods.alt => {
                let ids = canvas.selection.ids().to_vec();
                canvas.rescale(&ids, -1);
                true
            }
            Key::Char(']') if !mods.command() => {
                let ids = canvas.selection.ids().to_vec();
                canvas.restack(&ids, true);
                true
            }
            Key::Char('[') if !mods.command() => {
                let ids = canvas.selection.ids().to_vec();
                canvas.restack(&ids, false);
                true
            }
            _ => false,
        };
        if handled {
            ModeOutcome::Handled
        } else {
            ModeOutcome::Ignored
        }
    }

    fn on_exit(&mut self, canvas: &mut Canvas) {
        selection::cancel(canvas);
        selection::clear(canvas);
    }
}
