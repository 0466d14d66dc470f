//! Typefield Render Library
//!
//! Renderer abstraction for Typefield. The bundled implementation builds a
//! backend-neutral display list that a GPU or 2D backend can replay.

mod display_list;
mod renderer;
pub mod scheduler;

pub use display_list::{DisplayList, DisplayListRenderer, DrawCommand, Space};
pub use renderer::{GridStyle, Palette, RenderContext, RenderResult, Renderer, RendererError};
pub use scheduler::FrameScheduler;
