//! Renderer trait abstraction.

use kurbo::Size;
use peniko::Color;
use thiserror::Error;
use typefield_core::editor::Editor;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Viewport {width}x{height} has no drawable area")]
    EmptyViewport { width: f64, height: f64 },
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type RenderResult<T> = Result<T, RendererError>;

/// How the background grid is drawn when it is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    None,
    #[default]
    Lines,
    /// A small cross at every intersection.
    Crosses,
    Dots,
}

impl GridStyle {
    pub const ALL: [GridStyle; 4] = [
        GridStyle::None,
        GridStyle::Lines,
        GridStyle::Crosses,
        GridStyle::Dots,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Lines => "Lines",
            GridStyle::Crosses => "Crosses",
            GridStyle::Dots => "Dots",
        }
    }

    /// Case-insensitive lookup by [`GridStyle::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name))
    }
}

/// Colors a frame is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub paper: Color,
    /// Text without its own color, the text box and the caret.
    pub ink: Color,
    /// Selection outlines, drag ghosts and the marquee.
    pub accent: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            paper: Color::from_rgba8(250, 248, 242, 255),
            ink: Color::from_rgba8(30, 30, 30, 255),
            accent: Color::from_rgba8(59, 130, 246, 255),
        }
    }
}

/// Everything a renderer reads for one frame.
pub struct RenderContext<'a> {
    pub editor: &'a Editor,
    pub viewport_size: Size,
    pub palette: Palette,
    pub grid_style: GridStyle,
    /// Draw the text-box caret (off during the blink's dark phase and
    /// outside typography mode).
    pub caret_visible: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(editor: &'a Editor, viewport_size: Size) -> Self {
        Self {
            editor,
            viewport_size,
            palette: Palette::default(),
            grid_style: GridStyle::default(),
            caret_visible: true,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn with_caret(mut self, visible: bool) -> Self {
        self.caret_visible = visible;
        self
    }
}

/// A rendering backend. The frame scheduler calls [`Renderer::build_scene`]
/// at most once per tick.
pub trait Renderer: Send + Sync {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Color the frame is cleared to.
    fn clear_color(&self, ctx: &RenderContext) -> Color {
        ctx.palette.paper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_style_cycle_and_names() {
        let mut style = GridStyle::default();
        for _ in 0..GridStyle::ALL.len() {
            assert_eq!(GridStyle::from_name(style.name()), Some(style));
            style = style.next();
        }
        assert_eq!(style, GridStyle::default());
        assert_eq!(GridStyle::from_name("dots"), Some(GridStyle::Dots));
        assert_eq!(GridStyle::from_name("plaid"), None);
    }
}
