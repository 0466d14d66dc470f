//! Hit-testing and collision detection.
//!
//! A hit carries a [`HitZone`] so callers can tell a click squarely inside
//! an object from one that merely grazes its border.

use crate::bounds::{bounds_of, guide_bounds, rects_overlap, text_bounds};
use crate::canvas::Canvas;
use crate::document::CanvasDocument;
use crate::links::{LinkGeometry, resolve_link};
use crate::measure::GlyphMeasure;
use crate::objects::{CanvasObject, ObjectId};
use kurbo::{BezPath, PathEl, Point, Rect};
use serde::{Deserialize, Serialize};

/// Flattening accuracy for link paths, in world units.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// How close to an object a point landed. Ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HitZone {
    /// Outside the box but within twice the tolerance.
    Near,
    /// Within the tolerance of the border (either side).
    Edge,
    /// At least the tolerance inside the box.
    Inside,
}

/// Result of locating an object under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: ObjectId,
    pub zone: HitZone,
}

impl Hit {
    /// Inside or on the edge; Near hits are hover feedback only.
    pub fn is_direct(&self) -> bool {
        self.zone >= HitZone::Edge
    }
}

/// Classify `point` against `rect` with a world-space tolerance.
pub fn classify_rect(point: Point, rect: Rect, tolerance: f64) -> Option<HitZone> {
    let inside = point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1;
    if inside {
        let depth = (point.x - rect.x0)
            .min(rect.x1 - point.x)
            .min(point.y - rect.y0)
            .min(rect.y1 - point.y);
        return Some(if depth >= tolerance {
            HitZone::Inside
        } else {
            HitZone::Edge
        });
    }

    let dx = (rect.x0 - point.x).max(point.x - rect.x1).max(0.0);
    let dy = (rect.y0 - point.y).max(point.y - rect.y1).max(0.0);
    let outside = dx.hypot(dy);
    if outside <= tolerance {
        Some(HitZone::Edge)
    } else if outside <= tolerance * 2.0 {
        Some(HitZone::Near)
    } else {
        None
    }
}

/// Distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Distance from a point to a (flattened) path.
pub fn point_to_path_dist(point: Point, path: &BezPath) -> f64 {
    let mut best = f64::INFINITY;
    let mut run: Vec<Point> = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            best = best.min(point_to_polyline_dist(point, &run));
            run.clear();
            run.push(p);
        }
        PathEl::LineTo(p) => run.push(p),
        _ => {}
    });
    best.min(point_to_polyline_dist(point, &run))
}

/// Hit zone of a single object at a world point.
pub fn hit_object(
    object: &CanvasObject,
    point: Point,
    tolerance: f64,
    document: &CanvasDocument,
    measure: &dyn GlyphMeasure,
    geometry: &LinkGeometry,
) -> Option<HitZone> {
    match object {
        CanvasObject::Text(text) => classify_rect(point, text_bounds(text, measure), tolerance),
        CanvasObject::Guide(guide) => classify_rect(point, guide_bounds(guide), tolerance),
        CanvasObject::Link(link) => {
            let resolved = resolve_link(link, document, measure, geometry)?;
            let dist = point_to_path_dist(point, &resolved.body);
            (dist <= tolerance).then_some(HitZone::Edge)
        }
    }
}

/// Find the object under a world point.
///
/// The strongest zone wins. Within a zone, text and links beat guides, and
/// then the object later in z-order (frontmost) wins.
pub fn locate_world(
    point: Point,
    tolerance: f64,
    document: &CanvasDocument,
    measure: &dyn GlyphMeasure,
    geometry: &LinkGeometry,
) -> Option<Hit> {
    let mut best: Option<((HitZone, u8, usize), Hit)> = None;
    for (index, object) in document.ordered().enumerate() {
        let Some(zone) = hit_object(object, point, tolerance, document, measure, geometry) else {
            continue;
        };
        let layer = if object.is_guide() { 0 } else { 1 };
        let rank = (zone, layer, index);
        if best.as_ref().is_none_or(|(r, _)| rank > *r) {
            best = Some((
                rank,
                Hit {
                    id: object.id(),
                    zone,
                },
            ));
        }
    }
    best.map(|(_, hit)| hit)
}

/// Find the object under a screen point.
pub fn locate(point_screen: Point, canvas: &Canvas) -> Option<Hit> {
    let camera = &canvas.viewport.camera;
    locate_world(
        camera.screen_to_world(point_screen),
        camera.screen_len_to_world(canvas.config.hit_tolerance),
        &canvas.document,
        canvas.measure(),
        &canvas.link_geometry(),
    )
}

/// Ids of objects whose bounds overlap `rect` (world), touching edges included.
pub fn objects_in_rect(
    rect: Rect,
    document: &CanvasDocument,
    measure: &dyn GlyphMeasure,
) -> Vec<ObjectId> {
    document
        .ordered()
        .filter(|object| {
            bounds_of(object, document, measure).is_some_and(|b| rects_overlap(b, rect))
        })
        .map(CanvasObject::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkGeometry;
    use crate::measure::ApproxMeasure;
    use crate::objects::{GuideObject, LinkObject, TextObject};

    fn setup() -> (CanvasDocument, ApproxMeasure, LinkGeometry) {
        (
            CanvasDocument::new(),
            ApproxMeasure::new(0.5),
            LinkGeometry::default(),
        )
    }

    #[test]
    fn test_classify_zones() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(classify_rect(Point::new(50.0, 25.0), rect, 5.0), Some(HitZone::Inside));
        assert_eq!(classify_rect(Point::new(2.0, 25.0), rect, 5.0), Some(HitZone::Edge));
        assert_eq!(classify_rect(Point::new(-3.0, 25.0), rect, 5.0), Some(HitZone::Edge));
        assert_eq!(classify_rect(Point::new(-8.0, 25.0), rect, 5.0), Some(HitZone::Near));
        assert_eq!(classify_rect(Point::new(-11.0, 25.0), rect, 5.0), None);
    }

    #[test]
    fn test_text_containment() {
        let (mut doc, measure, geometry) = setup();
        // "hello" at size 20: box x 0..50, y 80..104
        let id = doc.add(TextObject::new(Point::new(0.0, 100.0), "hello", 20.0).into());

        let hit = locate_world(Point::new(25.0, 92.0), 5.0, &doc, &measure, &geometry).unwrap();
        assert_eq!(hit, Hit { id, zone: HitZone::Inside });
        assert!(hit.is_direct());

        let miss = locate_world(Point::new(25.0, 200.0), 5.0, &doc, &measure, &geometry);
        assert!(miss.is_none());
    }

    #[test]
    fn test_frontmost_wins_within_zone() {
        let (mut doc, measure, geometry) = setup();
        let _back = doc.add(TextObject::new(Point::new(0.0, 100.0), "hello", 20.0).into());
        let front = doc.add(TextObject::new(Point::new(0.0, 100.0), "hello", 20.0).into());
        let hit = locate_world(Point::new(25.0, 92.0), 5.0, &doc, &measure, &geometry).unwrap();
        assert_eq!(hit.id, front);
    }

    #[test]
    fn test_text_beats_guide_in_same_zone() {
        let (mut doc, measure, geometry) = setup();
        let text = doc.add(TextObject::new(Point::new(0.0, 100.0), "hello", 20.0).into());
        let _guide = doc.add(GuideObject::new(Point::new(-50.0, 0.0), 300.0, 300.0).into());
        let hit = locate_world(Point::new(25.0, 92.0), 5.0, &doc, &measure, &geometry).unwrap();
        assert_eq!(hit.id, text);
    }

    #[test]
    fn test_stronger_zone_beats_front() {
        let (mut doc, measure, geometry) = setup();
        let guide = doc.add(GuideObject::new(Point::new(0.0, 0.0), 100.0, 100.0).into());
        // Text whose box ends just left of the probe point
        let _text = doc.add(TextObject::new(Point::new(0.0, 70.0), "ab", 20.0).into());
        let hit = locate_world(Point::new(26.0, 60.0), 5.0, &doc, &measure, &geometry).unwrap();
        assert_eq!(hit, Hit { id: guide, zone: HitZone::Inside });
    }

    #[test]
    fn test_link_hit_and_orphan() {
        let (mut doc, measure, geometry) = setup();
        let a = doc.add(TextObject::new(Point::new(0.0, 20.0), "aa", 20.0).into());
        let b = doc.add(TextObject::new(Point::new(300.0, 20.0), "bb", 20.0).into());
        let link = doc.add(LinkObject::new(a, b).with_arrowhead(false).into());

        // Straight link runs along y = 12 between the facing edges
        let hit = locate_world(Point::new(150.0, 14.0), 5.0, &doc, &measure, &geometry).unwrap();
        assert_eq!(hit, Hit { id: link, zone: HitZone::Edge });

        doc.remove(b);
        assert!(locate_world(Point::new(150.0, 14.0), 5.0, &doc, &measure, &geometry).is_none());
    }

    #[test]
    fn test_degenerate_segment_distance() {
        let p = Point::new(3.0, 4.0);
        assert!((point_to_segment_dist(p, Point::ZERO, Point::ZERO) - 5.0).abs() < 1e-9);
        assert!((point_to_polyline_dist(p, &[Point::ZERO]) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_objects_in_rect_inclusive() {
        let (mut doc, measure, _) = setup();
        // box x 0..50, y 80..104
        let a = doc.add(TextObject::new(Point::new(0.0, 100.0), "hello", 20.0).into());
        let _b = doc.add(TextObject::new(Point::new(500.0, 500.0), "far", 20.0).into());
        let ids = objects_in_rect(Rect::new(50.0, 104.0, 60.0, 120.0), &doc, &measure);
        assert_eq!(ids, vec![a]);
    }
}
