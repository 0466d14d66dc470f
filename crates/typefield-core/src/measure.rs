//! Glyph measurement.
//!
//! Every component that needs a text width (bounds, hit-testing, wrapping and
//! rendering) goes through [`GlyphMeasure`], so they can never disagree.

/// Measures the advance width of a run of text.
pub trait GlyphMeasure {
    /// Width of `text` (a single line) at `font_size`, in the same units as `font_size`.
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Default advance as a fraction of the font size.
pub const DEFAULT_ADVANCE_FACTOR: f64 = 0.55;

/// Monospace-style approximation: every character advances by a fixed fraction
/// of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxMeasure {
    pub advance_factor: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self {
            advance_factor: DEFAULT_ADVANCE_FACTOR,
        }
    }
}

impl ApproxMeasure {
    pub fn new(advance_factor: f64) -> Self {
        Self { advance_factor }
    }
}

impl GlyphMeasure for ApproxMeasure {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.advance_factor
    }
}

impl<M: GlyphMeasure + ?Sized> GlyphMeasure for &M {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        (**self).text_width(text, font_size)
    }
}

impl<M: GlyphMeasure + ?Sized> GlyphMeasure for Box<M> {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        (**self).text_width(text, font_size)
    }
}
