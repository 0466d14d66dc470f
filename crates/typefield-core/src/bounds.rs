//! Bounding boxes for canvas objects.
//!
//! [`bounds_of`] is the one place object extents are derived. Hit-testing,
//! marquee selection, link routing and rendering all call it.

use crate::document::CanvasDocument;
use crate::measure::GlyphMeasure;
use crate::objects::{CanvasObject, GuideObject, LinkObject, TextObject};
use kurbo::Rect;

/// Width of a text box with nothing measurable in it, as a fraction of the
/// effective font size, so empty text still occupies a grabbable box.
pub const MIN_TEXT_WIDTH_FACTOR: f64 = 0.5;

/// World-space bounds of a text object.
///
/// The box spans `[x, x + widest line]` horizontally and starts one font size
/// above the first baseline, extending `line_count * line_height` down. Only
/// content with zero measured width falls back to [`MIN_TEXT_WIDTH_FACTOR`].
pub fn text_bounds(text: &TextObject, measure: &dyn GlyphMeasure) -> Rect {
    let size = text.effective_size();
    let widest = text
        .lines()
        .map(|line| measure.text_width(line, size))
        .fold(0.0_f64, f64::max);
    let width = if widest > 0.0 {
        widest
    } else {
        size * MIN_TEXT_WIDTH_FACTOR
    };
    let top = text.position.y - size;
    let height = text.line_count() as f64 * text.line_height();
    Rect::new(
        text.position.x,
        top,
        text.position.x + width,
        top + height,
    )
}

/// World-space bounds of a guide.
pub fn guide_bounds(guide: &GuideObject) -> Rect {
    guide.rect()
}

/// Bounds of the two text objects a link joins, or None if either is gone.
pub fn link_endpoint_bounds(
    link: &LinkObject,
    document: &CanvasDocument,
    measure: &dyn GlyphMeasure,
) -> Option<(Rect, Rect)> {
    let from = document.text(link.from)?;
    let to = document.text(link.to)?;
    Some((text_bounds(from, measure), text_bounds(to, measure)))
}

/// World-space bounds of any object.
///
/// Links span the centers of their endpoints; unresolvable links have no bounds.
pub fn bounds_of(
    object: &CanvasObject,
    document: &CanvasDocument,
    measure: &dyn GlyphMeasure,
) -> Option<Rect> {
    match object {
        CanvasObject::Text(text) => Some(text_bounds(text, measure)),
        CanvasObject::Guide(guide) => Some(guide_bounds(guide)),
        CanvasObject::Link(link) => {
            let (from, to) = link_endpoint_bounds(link, document, measure)?;
            Some(Rect::from_points(from.center(), to.center()))
        }
    }
}

/// Union of all object bounds in the document.
pub fn content_bounds(document: &CanvasDocument, measure: &dyn GlyphMeasure) -> Option<Rect> {
    document
        .ordered()
        .filter_map(|object| bounds_of(object, document, measure))
        .reduce(|acc, r| acc.union(r))
}

/// Inclusive rectangle overlap (touching edges count).
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ApproxMeasure;
    use crate::objects::LINE_HEIGHT_FACTOR;
    use kurbo::Point;

    #[test]
    fn test_text_bounds_single_line() {
        let measure = ApproxMeasure::new(0.5);
        let text = TextObject::new(Point::new(10.0, 100.0), "abcd", 20.0);
        let bounds = text_bounds(&text, &measure);
        assert_eq!(bounds, Rect::new(10.0, 80.0, 50.0, 80.0 + 20.0 * LINE_HEIGHT_FACTOR));
    }

    #[test]
    fn test_text_bounds_multi_line_uses_widest() {
        let measure = ApproxMeasure::new(1.0);
        let text = TextObject::new(Point::ZERO, "ab\nabcdef\nx", 10.0);
        let bounds = text_bounds(&text, &measure);
        assert!((bounds.width() - 60.0).abs() < 1e-9);
        assert!((bounds.height() - 3.0 * 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_is_one_line() {
        let measure = ApproxMeasure::default();
        let text = TextObject::new(Point::new(0.0, 16.0), "", 16.0);
        let bounds = text_bounds(&text, &measure);
        assert!(bounds.width() > 0.0);
        assert!((bounds.height() - 16.0 * LINE_HEIGHT_FACTOR).abs() < 1e-9);
        assert!((bounds.y0 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_text_keeps_measured_width() {
        let measure = ApproxMeasure::new(0.1);
        let text = TextObject::new(Point::ZERO, "i", 20.0);
        let bounds = text_bounds(&text, &measure);
        assert!((bounds.width() - 2.0).abs() < 1e-9);
        assert!(bounds.width() < 20.0 * MIN_TEXT_WIDTH_FACTOR);
    }

    #[test]
    fn test_link_bounds_resolve_and_orphan() {
        let measure = ApproxMeasure::default();
        let mut document = CanvasDocument::new();
        let a = document.add(TextObject::new(Point::new(0.0, 20.0), "a", 16.0).into());
        let b = document.add(TextObject::new(Point::new(200.0, 220.0), "b", 16.0).into());
        let link = CanvasObject::from(LinkObject::new(a, b));
        assert!(bounds_of(&link, &document, &measure).is_some());

        document.remove(b);
        assert!(bounds_of(&link, &document, &measure).is_none());
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_overlap(a, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!rects_overlap(a, Rect::new(10.1, 0.0, 20.0, 10.0)));
    }
}
