//! Link geometry: endpoint selection and curve construction.
//!
//! Endpoint choice and curve shape are separate concerns. Every curve style
//! consumes the same [`LinkEndpoints`], so switching styles never moves the
//! attachment points.

use crate::bounds::link_endpoint_bounds;
use crate::config::CanvasConfig;
use crate::document::CanvasDocument;
use crate::measure::GlyphMeasure;
use crate::objects::{LinkObject, LinkStyle};
use kurbo::{BezPath, ParamCurve, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default arrowhead length in world units.
pub const ARROWHEAD_SIZE: f64 = 10.0;

/// Side of a bounding box a link attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// Search order for endpoint selection.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

    /// Outward unit normal.
    pub fn normal(self) -> Vec2 {
        match self {
            Edge::Top => Vec2::new(0.0, -1.0),
            Edge::Right => Vec2::new(1.0, 0.0),
            Edge::Bottom => Vec2::new(0.0, 1.0),
            Edge::Left => Vec2::new(-1.0, 0.0),
        }
    }
}

/// Tunables for link routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkGeometry {
    /// Outward push applied to each edge midpoint.
    pub padding: f64,
    /// Vertical offset between centers when the boxes overlap.
    pub overlap_offset: f64,
    pub head_size: f64,
}

impl Default for LinkGeometry {
    fn default() -> Self {
        Self::from(&CanvasConfig::default())
    }
}

impl From<&CanvasConfig> for LinkGeometry {
    fn from(config: &CanvasConfig) -> Self {
        Self {
            padding: config.link_padding,
            overlap_offset: config.overlap_offset,
            head_size: ARROWHEAD_SIZE,
        }
    }
}

/// The two attachment points of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkEndpoints {
    pub start: Point,
    pub end: Point,
    /// Edge of the source box, None for the overlap fallback.
    pub start_edge: Option<Edge>,
    pub end_edge: Option<Edge>,
}

impl LinkEndpoints {
    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Same endpoints, reversed.
    pub fn swapped(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            start_edge: self.end_edge,
            end_edge: self.start_edge,
        }
    }
}

/// Midpoint of `edge`, pushed outward by `padding`.
pub fn edge_anchor(rect: Rect, edge: Edge, padding: f64) -> Point {
    let center = rect.center();
    let mid = match edge {
        Edge::Top => Point::new(center.x, rect.y0),
        Edge::Right => Point::new(rect.x1, center.y),
        Edge::Bottom => Point::new(center.x, rect.y1),
        Edge::Left => Point::new(rect.x0, center.y),
    };
    mid + edge.normal() * padding
}

/// The padded edge anchor of `rect` closest to `point`.
pub fn nearest_anchor(rect: Rect, point: Point, padding: f64) -> (Edge, Point) {
    let mut best = (Edge::Top, edge_anchor(rect, Edge::Top, padding));
    let mut best_dist = best.1.distance(point);
    for edge in Edge::ALL.into_iter().skip(1) {
        let anchor = edge_anchor(rect, edge, padding);
        let dist = anchor.distance(point);
        if dist < best_dist {
            best = (edge, anchor);
            best_dist = dist;
        }
    }
    best
}

/// Pick the attachment points for a link between two boxes.
///
/// All sixteen edge-midpoint pairs are compared and the closest wins; ties
/// keep the first pair found. The scan always runs from the box that sorts
/// first, so swapping the arguments only swaps the result. Overlapping boxes
/// have no meaningful edge pair, so the link runs between the centers with a
/// fixed vertical offset.
pub fn calculate_link_endpoints(from: Rect, to: Rect, geometry: &LinkGeometry) -> LinkEndpoints {
    if from.intersect(to).area() > 0.0 {
        return LinkEndpoints {
            start: from.center(),
            end: to.center() + Vec2::new(0.0, geometry.overlap_offset),
            start_edge: None,
            end_edge: None,
        };
    }

    let key = |rect: Rect| [rect.x0, rect.y0, rect.x1, rect.y1];
    if key(to) < key(from) {
        closest_edge_pair(to, from, geometry.padding).swapped()
    } else {
        closest_edge_pair(from, to, geometry.padding)
    }
}

fn closest_edge_pair(from: Rect, to: Rect, padding: f64) -> LinkEndpoints {
    let mut best = LinkEndpoints {
        start: edge_anchor(from, Edge::Top, padding),
        end: edge_anchor(to, Edge::Top, padding),
        start_edge: Some(Edge::Top),
        end_edge: Some(Edge::Top),
    };
    let mut best_dist = best.length();
    for from_edge in Edge::ALL {
        let start = edge_anchor(from, from_edge, padding);
        for to_edge in Edge::ALL {
            let end = edge_anchor(to, to_edge, padding);
            let dist = start.distance(end);
            if dist < best_dist {
                best_dist = dist;
                best = LinkEndpoints {
                    start,
                    end,
                    start_edge: Some(from_edge),
                    end_edge: Some(to_edge),
                };
            }
        }
    }
    best
}

/// A curve family that turns endpoints into a path.
pub trait LinkCurve {
    fn path(&self, ends: &LinkEndpoints) -> BezPath;
}

/// Straight segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightCurve;

impl LinkCurve for StraightCurve {
    fn path(&self, ends: &LinkEndpoints) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(ends.start);
        path.line_to(ends.end);
        path
    }
}

/// Cubic bezier leaving each endpoint along its edge normal.
#[derive(Debug, Clone, Copy)]
pub struct BezierCurve {
    /// Control arm length as a fraction of the endpoint distance.
    pub tension: f64,
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self { tension: 0.4 }
    }
}

impl LinkCurve for BezierCurve {
    fn path(&self, ends: &LinkEndpoints) -> BezPath {
        let chord = ends.end - ends.start;
        let arm = ends.length() * self.tension;
        let chord_dir = if chord.hypot() > f64::EPSILON {
            chord.normalize()
        } else {
            Vec2::ZERO
        };
        let out = ends.start_edge.map(Edge::normal).unwrap_or(chord_dir);
        let back = ends.end_edge.map(Edge::normal).unwrap_or(-chord_dir);

        let mut path = BezPath::new();
        path.move_to(ends.start);
        path.curve_to(ends.start + out * arm, ends.end + back * arm, ends.end);
        path
    }
}

/// Catmull-Rom spline through a midpoint bowed off the chord.
#[derive(Debug, Clone, Copy)]
pub struct CatmullRomCurve {
    /// Sideways displacement of the midpoint as a fraction of the chord length.
    pub bow: f64,
}

impl Default for CatmullRomCurve {
    fn default() -> Self {
        Self { bow: 0.15 }
    }
}

impl LinkCurve for CatmullRomCurve {
    fn path(&self, ends: &LinkEndpoints) -> BezPath {
        let chord = ends.end - ends.start;
        let perp = Vec2::new(-chord.y, chord.x);
        let mid = ends.start.midpoint(ends.end) + perp * self.bow;
        catmull_rom_path(&[ends.start, mid, ends.end])
    }
}

/// Catmull-Rom spline through `points`, converted to cubic bezier segments.
pub fn catmull_rom_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = points.first() else {
        return path;
    };
    path.move_to(first);

    let tension = 0.5;
    for i in 0..points.len().saturating_sub(1) {
        let p0 = points[if i == 0 { 0 } else { i - 1 }];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];

        let t1 = (p2 - p0) * tension;
        let t2 = (p3 - p1) * tension;

        let cp1 = p1 + t1 / 3.0;
        let cp2 = p2 - t2 / 3.0;

        path.curve_to(cp1, cp2, p2);
    }
    path
}

static STRAIGHT: StraightCurve = StraightCurve;
static BEZIER: BezierCurve = BezierCurve { tension: 0.4 };
static CATMULL_ROM: CatmullRomCurve = CatmullRomCurve { bow: 0.15 };

/// The curve strategy for a link style.
pub fn curve_for(style: LinkStyle) -> &'static dyn LinkCurve {
    match style {
        LinkStyle::Straight => &STRAIGHT,
        LinkStyle::Bezier => &BEZIER,
        LinkStyle::CatmullRom => &CATMULL_ROM,
    }
}

/// Direction the path is travelling at its end, if it has any length.
fn end_direction(path: &BezPath) -> Option<Vec2> {
    let seg = path.segments().last()?;
    let end = seg.eval(1.0);
    let before = seg.eval(0.95);
    let dir = end - before;
    let len = dir.hypot();
    (len > f64::EPSILON).then(|| dir / len)
}

/// Two-stroke arrowhead at the end of `path`.
///
/// Returns None for zero-length paths, whose direction is undefined.
pub fn arrowhead(path: &BezPath, head_size: f64) -> Option<BezPath> {
    let dir = end_direction(path)?;
    let tip = path.segments().last()?.eval(1.0);
    let perp = Vec2::new(-dir.y, dir.x);

    let head_back = tip - dir * head_size;
    let head_left = head_back + perp * head_size * 0.5;
    let head_right = head_back - perp * head_size * 0.5;

    let mut head = BezPath::new();
    head.move_to(tip);
    head.line_to(head_left);
    head.move_to(tip);
    head.line_to(head_right);
    Some(head)
}

/// Fully resolved link geometry, ready for hit-testing or drawing.
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    pub endpoints: LinkEndpoints,
    pub body: BezPath,
    pub head: Option<BezPath>,
}

/// Resolve a link against the document. None if either endpoint is gone.
pub fn resolve_link(
    link: &LinkObject,
    document: &CanvasDocument,
    measure: &dyn GlyphMeasure,
    geometry: &LinkGeometry,
) -> Option<ResolvedLink> {
    let (from, to) = link_endpoint_bounds(link, document, measure)?;
    let endpoints = calculate_link_endpoints(from, to, geometry);
    let body = curve_for(link.style).path(&endpoints);
    let head = if link.arrowhead {
        arrowhead(&body, geometry.head_size)
    } else {
        None
    };
    Some(ResolvedLink {
        endpoints,
        body,
        head,
    })
}

/// Straight preview from the source box toward the pointer (world space).
pub fn preview_path(from: Rect, pointer: Point, geometry: &LinkGeometry) -> BezPath {
    let (_, start) = nearest_anchor(from, pointer, geometry.padding);
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(pointer);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> LinkGeometry {
        LinkGeometry {
            padding: 4.0,
            overlap_offset: 12.0,
            head_size: 10.0,
        }
    }

    #[test]
    fn test_side_by_side_uses_facing_edges() {
        let a = Rect::new(0.0, 0.0, 50.0, 20.0);
        let b = Rect::new(200.0, 0.0, 250.0, 20.0);
        let ends = calculate_link_endpoints(a, b, &geometry());
        assert_eq!(ends.start_edge, Some(Edge::Right));
        assert_eq!(ends.end_edge, Some(Edge::Left));
        assert_eq!(ends.start, Point::new(54.0, 10.0));
        assert_eq!(ends.end, Point::new(196.0, 10.0));
    }

    #[test]
    fn test_stacked_uses_vertical_edges() {
        let a = Rect::new(0.0, 0.0, 50.0, 20.0);
        let b = Rect::new(10.0, 300.0, 60.0, 320.0);
        let ends = calculate_link_endpoints(a, b, &geometry());
        assert_eq!(ends.start_edge, Some(Edge::Bottom));
        assert_eq!(ends.end_edge, Some(Edge::Top));
    }

    #[test]
    fn test_endpoint_symmetry() {
        let boxes = [
            (Rect::new(0.0, 0.0, 80.0, 20.0), Rect::new(150.0, 60.0, 190.0, 75.0)),
            (Rect::new(-40.0, 10.0, 0.0, 30.0), Rect::new(30.0, -200.0, 100.0, -170.0)),
            (Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(500.0, 23.0, 530.0, 33.0)),
        ];
        for (a, b) in boxes {
            let forward = calculate_link_endpoints(a, b, &geometry());
            let backward = calculate_link_endpoints(b, a, &geometry());
            assert_eq!(forward, backward.swapped());
        }
    }

    #[test]
    fn test_endpoint_symmetry_on_tied_distances() {
        // Diagonal neighbour: Bottom/Right and Left/Top are equally close
        let a = Rect::new(0.0, 0.0, 40.0, 20.0);
        let b = Rect::new(-120.0, 140.0, -80.0, 160.0);
        let forward = calculate_link_endpoints(a, b, &geometry());
        let backward = calculate_link_endpoints(b, a, &geometry());
        assert_eq!(forward, backward.swapped());
    }

    #[test]
    fn test_endpoint_symmetry_grid_sweep() {
        let a = Rect::new(0.0, 0.0, 40.0, 20.0);
        for padding in [0.0, 4.0, 8.0] {
            let geometry = LinkGeometry {
                padding,
                ..geometry()
            };
            for width in [20.0, 40.0] {
                for height in [20.0, 40.0] {
                    for ix in -8..=8 {
                        for iy in -8..=8 {
                            let origin = Point::new(ix as f64 * 20.0, iy as f64 * 20.0);
                            let b = Rect::from_origin_size(origin, (width, height));
                            if a.intersect(b).area() > 0.0 {
                                continue;
                            }
                            let forward = calculate_link_endpoints(a, b, &geometry);
                            let backward = calculate_link_endpoints(b, a, &geometry);
                            assert_eq!(forward, backward.swapped(), "a={a:?} b={b:?} padding={padding}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_overlap_falls_back_to_centers() {
        let a = Rect::new(0.0, 0.0, 100.0, 40.0);
        let b = Rect::new(50.0, 20.0, 150.0, 60.0);
        let ends = calculate_link_endpoints(a, b, &geometry());
        assert_eq!(ends.start, a.center());
        assert_eq!(ends.end, b.center() + Vec2::new(0.0, 12.0));
        assert!(ends.start_edge.is_none());
    }

    #[test]
    fn test_curves_share_endpoints() {
        let ends = LinkEndpoints {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 50.0),
            start_edge: Some(Edge::Right),
            end_edge: Some(Edge::Left),
        };
        for style in [LinkStyle::Straight, LinkStyle::Bezier, LinkStyle::CatmullRom] {
            let path = curve_for(style).path(&ends);
            let segs: Vec<_> = path.segments().collect();
            assert!(!segs.is_empty());
            let first = segs[0].eval(0.0);
            let last = segs[segs.len() - 1].eval(1.0);
            assert!((first - ends.start).hypot() < 1e-9, "{style:?}");
            assert!((last - ends.end).hypot() < 1e-9, "{style:?}");
        }
    }

    #[test]
    fn test_arrowhead_points_back_along_path() {
        let ends = LinkEndpoints {
            start: Point::new(0.0, 0.0),
            end: Point::new(100.0, 0.0),
            start_edge: None,
            end_edge: None,
        };
        let body = StraightCurve.path(&ends);
        let head = arrowhead(&body, 10.0).unwrap();
        let xs: Vec<f64> = head.segments().map(|s| s.eval(1.0).x).collect();
        assert_eq!(xs.len(), 2);
        assert!(xs.iter().all(|&x| (x - 90.0).abs() < 1e-9));
    }

    #[test]
    fn test_zero_length_has_no_arrowhead() {
        let ends = LinkEndpoints {
            start: Point::new(5.0, 5.0),
            end: Point::new(5.0, 5.0),
            start_edge: None,
            end_edge: None,
        };
        assert!(arrowhead(&StraightCurve.path(&ends), 10.0).is_none());
    }

    #[test]
    fn test_preview_starts_at_nearest_anchor() {
        let from = Rect::new(0.0, 0.0, 40.0, 20.0);
        let path = preview_path(from, Point::new(300.0, 10.0), &geometry());
        let seg = path.segments().next().unwrap();
        assert_eq!(seg.eval(0.0), Point::new(44.0, 10.0));
    }
}
