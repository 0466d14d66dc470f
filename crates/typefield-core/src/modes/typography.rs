//! Typography mode: type into the text box, drag text, pan the canvas.

use super::{ModeOutcome, ModeStrategy};
use crate::assistant::parse_command;
use crate::canvas::Canvas;
use crate::hit::locate;
use crate::input::{Key, KeyEvent, PointerEvent};
use crate::selection;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    /// Dragging a text object through the selection engine.
    Drag,
    /// Panning; `last` is the previous pointer position (screen).
    Pan { last: Point },
}

#[derive(Debug, Default)]
pub struct TypographyMode {
    gesture: Option<Gesture>,
}

impl TypographyMode {
    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Pan { .. }))
    }
}

impl ModeStrategy for TypographyMode {
    fn on_pointer_down(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        let text_hit = locate(event.position, canvas)
            .filter(|hit| hit.is_direct())
            .filter(|hit| canvas.document.text(hit.id).is_some());

        self.gesture = match text_hit {
            Some(hit) => {
                canvas.selection.set_single(hit.id);
                selection::begin_drag(canvas, hit.id, event.position).then_some(Gesture::Drag)
            }
            None => {
                selection::clear(canvas);
                Some(Gesture::Pan {
                    last: event.position,
                })
            }
        };
        canvas.request_redraw();
        ModeOutcome::Handled
    }

    fn on_pointer_move(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        match self.gesture.as_mut() {
            Some(Gesture::Drag) => {
                selection::drag_to(canvas, event.position);
                ModeOutcome::Handled
            }
            Some(Gesture::Pan { last }) => {
                let delta = event.position - *last;
                *last = event.position;
                canvas.viewport.pan(delta);
                canvas.request_redraw();
                ModeOutcome::Handled
            }
            None => ModeOutcome::Ignored,
        }
    }

    fn on_pointer_up(&mut self, canvas: &mut Canvas, event: &PointerEvent) -> ModeOutcome {
        match self.gesture.take() {
            Some(Gesture::Drag) => {
                selection::release(canvas, event.position);
                ModeOutcome::Handled
            }
            Some(Gesture::Pan { last }) => {
                canvas.viewport.pan(event.position - last);
                // The offset is persisted, so a finished pan counts as a change
                canvas.mark_changed();
                ModeOutcome::Handled
            }
            None => ModeOutcome::Ignored,
        }
    }

    fn on_key_down(&mut self, canvas: &mut Canvas, event: &KeyEvent) -> ModeOutcome {
        let mods = event.modifiers;
        match &event.key {
            Key::Char(c) if !mods.command() && !mods.alt => {
                canvas.typing_text.push(*c);
                canvas.mark_changed();
                ModeOutcome::Handled
            }
            Key::Enter if mods.shift => {
                canvas.typing_text.push('\n');
                canvas.mark_changed();
                ModeOutcome::Handled
            }
            Key::Enter => {
                if let Some(command) = parse_command(&canvas.typing_text) {
                    return ModeOutcome::AssistantQuery(command);
                }
                canvas.commit_typing();
                ModeOutcome::Handled
            }
            Key::Backspace => {
                if canvas.typing_text.pop().is_some() {
                    canvas.mark_changed();
                }
                ModeOutcome::Handled
            }
            Key::Escape => {
                if self.gesture.take() == Some(Gesture::Drag) {
                    selection::cancel(canvas);
                } else if !canvas.typing_text.is_empty() {
                    canvas.typing_text.clear();
                    canvas.mark_changed();
                }
                ModeOutcome::Handled
            }
            _ => ModeOutcome::Ignored,
        }
    }

    fn on_exit(&mut self, canvas: &mut Canvas) {
        if self.gesture.take() == Some(Gesture::Drag) {
            selection::cancel(canvas);
        }
        selection::clear(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantCommand;
    use crate::config::CanvasConfig;
    use crate::input::Modifiers;
    use crate::objects::TextObject;
    use kurbo::{Size, Vec2};

    fn canvas() -> Canvas {
        let mut canvas = Canvas::new(CanvasConfig::default(), Size::new(800.0, 600.0));
        canvas.viewport.camera.offset = Vec2::ZERO;
        canvas.viewport.camera.scale = 1.0;
        canvas
    }

    fn type_str(mode: &mut TypographyMode, canvas: &mut Canvas, text: &str) {
        for c in text.chars() {
            mode.on_key_down(canvas, &KeyEvent::char(c));
        }
    }

    #[test]
    fn test_typing_and_commit() {
        let mut canvas = canvas();
        let mut mode = TypographyMode::default();
        type_str(&mut mode, &mut canvas, "hi");
        mode.on_key_down(
            &mut canvas,
            &KeyEvent::new(Key::Enter).with_modifiers(Modifiers::shift()),
        );
        type_str(&mut mode, &mut canvas, "yo");
        assert_eq!(canvas.typing_text, "hi\nyo");

        mode.on_key_down(&mut canvas, &KeyEvent::new(Key::Backspace));
        assert_eq!(canvas.typing_text, "hi\ny");

        assert_eq!(
            mode.on_key_down(&mut canvas, &KeyEvent::new(Key::Enter)),
            ModeOutcome::Handled
        );
        assert!(canvas.typing_text.is_empty());
        assert_eq!(canvas.document.len(), 1);
    }

    #[test]
    fn test_command_chars_are_not_typed() {
        let mut canvas = canvas();
        let mut mode = TypographyMode::default();
        let outcome = mode.on_key_down(
            &mut canvas,
            &KeyEvent::char('z').with_modifiers(Modifiers::ctrl()),
        );
        assert_eq!(outcome, ModeOutcome::Ignored);
        assert!(canvas.typing_text.is_empty());
    }

    #[test]
    fn test_escape_clears_buffer() {
        let mut canvas = canvas();
        let mut mode = TypographyMode::default();
        type_str(&mut mode, &mut canvas, "draft");
        mode.on_key_down(&mut canvas, &KeyEvent::new(Key::Escape));
        assert!(canvas.typing_text.is_empty());
    }

    #[test]
    fn test_enter_with_command_prefix_hands_off() {
        let mut canvas = canvas();
        let mut mode = TypographyMode::default();
        type_str(&mut mode, &mut canvas, "/gpt why?");
        let outcome = mode.on_key_down(&mut canvas, &KeyEvent::new(Key::Enter));
        assert_eq!(
            outcome,
            ModeOutcome::AssistantQuery(AssistantCommand {
                question: "why?".to_string()
            })
        );
        assert!(canvas.document.is_empty());
    }

    #[test]
    fn test_pointer_on_empty_space_pans() {
        let mut canvas = canvas();
        let mut mode = TypographyMode::default();
        mode.on_pointer_down(&mut canvas, &PointerEvent::new(Point::new(10.0, 10.0)));
        assert!(mode.is_panning());
        mode.on_pointer_move(&mut canvas, &PointerEvent::new(Point::new(30.0, 15.0)));
        mode.on_pointer_up(&mut canvas, &PointerEvent::new(Point::new(40.0, 20.0)));
        assert_eq!(canvas.viewport.offset(), Vec2::new(30.0, 10.0));
        assert!(canvas.has_unsaved());
    }

    #[test]
    fn test_pointer_on_text_drags_it() {
        let mut canvas = canvas();
        let mut mode = TypographyMode::default();
        // default measure: "hello" at 20 is 55 wide, box y 80..104
        let id = canvas
            .document
            .add(TextObject::new(Point::new(100.0, 100.0), "hello", 20.0).into());
        mode.on_pointer_down(&mut canvas, &PointerEvent::new(Point::new(120.0, 90.0)));
        mode.on_pointer_move(&mut canvas, &PointerEvent::new(Point::new(160.0, 90.0)));
        mode.on_pointer_up(&mut canvas, &PointerEvent::new(Point::new(160.0, 90.0)));
        assert_eq!(canvas.document.text(id).unwrap().position, Point::new(140.0, 100.0));
        assert_eq!(canvas.viewport.offset(), Vec2::ZERO);
    }
}
