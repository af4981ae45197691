//! Geometry helpers: distances, containment and connector clipping.
//!
//! Everything here is a pure function of its inputs. Entity types build a
//! [`Boundary`] describing their outline and the editor asks it where a
//! connector should stop.

use kurbo::{Point, Rect, Vec2};
use std::f64::consts::PI;

/// Number of parametric steps used when sampling a quadratic curve.
pub const BEZIER_SAMPLES: usize = 20;

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
    (point - proj).hypot()
}

/// Evaluate a quadratic Bezier at parameter `t`.
pub fn quad_point(p0: Point, ctrl: Point, p2: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * ctrl.x + t * t * p2.x,
        mt * mt * p0.y + 2.0 * mt * t * ctrl.y + t * t * p2.y,
    )
}

/// Approximate distance from a point to a quadratic Bezier.
///
/// The curve is sampled at `BEZIER_SAMPLES + 1` evenly spaced parameters
/// (both ends included) and the closest sample wins.
pub fn point_to_quad_dist(point: Point, p0: Point, ctrl: Point, p2: Point) -> f64 {
    (0..=BEZIER_SAMPLES)
        .map(|i| {
            let t = i as f64 / BEZIER_SAMPLES as f64;
            point.distance(quad_point(p0, ctrl, p2, t))
        })
        .fold(f64::INFINITY, f64::min)
}

/// Parametric position along `a-b` where it crosses segment `c-d`.
///
/// Returns `None` for parallel segments or when the crossing lies outside
/// either segment.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<f64> {
    let r = b - a;
    let s = d - c;
    let denom = r.cross(s);
    if denom.abs() < 1e-12 {
        return None;
    }
    let ac = c - a;
    let t = ac.cross(s) / denom;
    let u = ac.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Inclusive point-in-rectangle test (points on the border count).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether two rectangles overlap. Touching borders count as overlap, so a
/// zero-area rectangle (a single point, a horizontal stroke) can still hit.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Axis-aligned bounds of a point set, or `None` when empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)),
    )
}

/// Vertices of a triangle inscribed in `rect`: apex at top center, base along the bottom.
pub fn triangle_vertices(rect: Rect) -> Vec<Point> {
    vec![
        Point::new(rect.center().x, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// Vertices of a diamond touching the N/E/S/W midpoints of `rect`.
pub fn diamond_vertices(rect: Rect) -> Vec<Point> {
    let c = rect.center();
    vec![
        Point::new(c.x, rect.y0),
        Point::new(rect.x1, c.y),
        Point::new(c.x, rect.y1),
        Point::new(rect.x0, c.y),
    ]
}

/// Regular hexagon of radius `min(w, h) / 2`, first vertex on the +x axis.
pub fn hexagon_vertices(rect: Rect) -> Vec<Point> {
    let c = rect.center();
    let radius = rect.width().min(rect.height()) / 2.0;
    (0..6)
        .map(|i| {
            let angle = i as f64 * PI / 3.0;
            c + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Five-pointed star with inner radius 0.4 of the outer, first spike pointing up.
pub fn star_vertices(rect: Rect) -> Vec<Point> {
    const SPIKES: usize = 5;
    let c = rect.center();
    let outer = rect.width().min(rect.height()) / 2.0;
    let inner = outer * 0.4;
    (0..SPIKES * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = i as f64 * PI / SPIKES as f64 - PI / 2.0;
            c + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Which crossing of a boundary a clip should keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// First crossing along the segment (the connector's source).
    Near,
    /// Last crossing along the segment (the connector's target).
    Far,
}

/// Outline of an entity used to clip connectors.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Rect(Rect),
    /// Circles are ellipses with equal radii.
    Ellipse { center: Point, radii: Vec2 },
    Polygon { center: Point, vertices: Vec<Point> },
}

impl Boundary {
    /// Circle of the given radius.
    pub fn circle(center: Point, radius: f64) -> Self {
        Boundary::Ellipse {
            center,
            radii: Vec2::new(radius, radius),
        }
    }

    /// Polygon whose reference center is the center of `rect`.
    pub fn polygon(rect: Rect, vertices: Vec<Point>) -> Self {
        Boundary::Polygon {
            center: rect.center(),
            vertices,
        }
    }

    /// The anchor point connectors aim at.
    pub fn center(&self) -> Point {
        match self {
            Boundary::Rect(rect) => rect.center(),
            Boundary::Ellipse { center, .. } | Boundary::Polygon { center, .. } => *center,
        }
    }

    /// Where the segment `from -> to` crosses this outline.
    ///
    /// `Side::Near` keeps the crossing closest to `from`, `Side::Far` the one
    /// closest to `to`. When the segment never crosses the outline the center
    /// is returned.
    pub fn clip(&self, from: Point, to: Point, side: Side) -> Point {
        let hits = match self {
            Boundary::Rect(rect) => polygon_hits(&rect_vertices(*rect), from, to),
            Boundary::Ellipse { center, radii } => ellipse_hits(*center, *radii, from, to),
            Boundary::Polygon { vertices, .. } => polygon_hits(vertices, from, to),
        };
        let pick = match side {
            Side::Near => hits.into_iter().reduce(f64::min),
            Side::Far => hits.into_iter().reduce(f64::max),
        };
        match pick {
            Some(t) => from.lerp(to, t),
            None => self.center(),
        }
    }
}

fn rect_vertices(rect: Rect) -> Vec<Point> {
    vec![
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

fn polygon_hits(vertices: &[Point], from: Point, to: Point) -> Vec<f64> {
    let n = vertices.len();
    (0..n)
        .filter_map(|i| segment_intersection(from, to, vertices[i], vertices[(i + 1) % n]))
        .collect()
}

fn ellipse_hits(center: Point, radii: Vec2, from: Point, to: Point) -> Vec<f64> {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return Vec::new();
    }
    let d = to - from;
    let o = from - center;
    let (rx2, ry2) = (radii.x * radii.x, radii.y * radii.y);
    let a = d.x * d.x / rx2 + d.y * d.y / ry2;
    if a < f64::EPSILON {
        return Vec::new();
    }
    let b = 2.0 * (o.x * d.x / rx2 + o.y * d.y / ry2);
    let c = o.x * o.x / rx2 + o.y * o.y / ry2 - 1.0;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sqrt_d = disc.sqrt();
    [(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)]
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline_distance(boundary: &Boundary, p: Point) -> f64 {
        match boundary {
            Boundary::Rect(rect) => {
                let v = rect_vertices(*rect);
                polyline_closed_dist(&v, p)
            }
            Boundary::Ellipse { center, radii } => {
                let o = p - *center;
                let r = ((o.x / radii.x).powi(2) + (o.y / radii.y).powi(2)).sqrt();
                (r - 1.0).abs() * radii.x.max(radii.y)
            }
            Boundary::Polygon { vertices, .. } => polyline_closed_dist(vertices, p),
        }
    }

    fn polyline_closed_dist(v: &[Point], p: Point) -> f64 {
        (0..v.len())
            .map(|i| point_to_segment_dist(p, v[i], v[(i + 1) % v.len()]))
            .fold(f64::INFINITY, f64::min)
    }

    fn sample_boundaries() -> Vec<Boundary> {
        let rect = Rect::new(0.0, 0.0, 120.0, 60.0);
        vec![
            Boundary::Rect(rect),
            Boundary::circle(rect.center(), 30.0),
            Boundary::Ellipse {
                center: rect.center(),
                radii: Vec2::new(60.0, 30.0),
            },
            Boundary::polygon(rect, triangle_vertices(rect)),
            Boundary::polygon(rect, diamond_vertices(rect)),
            Boundary::polygon(rect, hexagon_vertices(rect)),
        ]
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < f64::EPSILON);
        assert!((point_to_segment_dist(Point::new(14.0, 3.0), a, b) - 5.0).abs() < 1e-10);
        // Degenerate segment
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_quad_distance_hits_endpoints_and_apex() {
        let p0 = Point::new(0.0, 0.0);
        let ctrl = Point::new(50.0, 100.0);
        let p2 = Point::new(100.0, 0.0);
        assert!(point_to_quad_dist(p0, p0, ctrl, p2) < f64::EPSILON);
        assert!(point_to_quad_dist(p2, p0, ctrl, p2) < f64::EPSILON);
        // Apex of the curve is at t = 0.5, y = 50
        assert!(point_to_quad_dist(Point::new(50.0, 50.0), p0, ctrl, p2) < 1e-10);
        assert!(point_to_quad_dist(Point::new(50.0, 0.0), p0, ctrl, p2) > 40.0);
    }

    #[test]
    fn test_segment_intersection() {
        let t = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, -5.0),
            Point::new(5.0, 5.0),
        );
        assert!((t.unwrap() - 0.5).abs() < f64::EPSILON);

        let parallel = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        );
        assert!(parallel.is_none());
    }

    #[test]
    fn test_rects_overlap_touching() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_overlap(a, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(rects_overlap(a, Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(!rects_overlap(a, Rect::new(10.1, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_points_bounds() {
        assert!(points_bounds(&[]).is_none());
        let r = points_bounds(&[Point::new(3.0, 1.0), Point::new(-2.0, 4.0)]).unwrap();
        assert_eq!(r, Rect::new(-2.0, 1.0, 3.0, 4.0));
    }

    #[test]
    fn test_clip_lands_on_outline_in_all_directions() {
        for boundary in sample_boundaries() {
            let c = boundary.center();
            for i in 0..16 {
                let angle = i as f64 * PI / 8.0;
                let far = c + Vec2::from_angle(angle) * 300.0;
                for (from, to, side) in [(c, far, Side::Near), (far, c, Side::Far)] {
                    let p = boundary.clip(from, to, side);
                    assert!(
                        outline_distance(&boundary, p) < 0.5,
                        "{boundary:?} angle {angle} -> {p:?}"
                    );
                    let along = (p - c).dot(far - c);
                    assert!(along > 0.0);
                    assert!(p.distance(c) < far.distance(c));
                }
            }
        }
    }

    #[test]
    fn test_clip_rect_left_edge() {
        let b = Boundary::Rect(Rect::new(260.0, 80.0, 340.0, 120.0));
        let p = b.clip(Point::new(100.0, 100.0), Point::new(300.0, 100.0), Side::Far);
        assert!((p.x - 260.0).abs() < 1e-10);
        assert!((p.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_clip_without_crossing_falls_back_to_center() {
        let b = Boundary::circle(Point::new(0.0, 0.0), 10.0);
        let p = b.clip(Point::new(100.0, 100.0), Point::new(200.0, 100.0), Side::Near);
        assert_eq!(p, Point::ZERO);
    }

    #[test]
    fn test_hexagon_and_star_vertices() {
        let rect = Rect::new(0.0, 0.0, 100.0, 80.0);
        let hex = hexagon_vertices(rect);
        assert_eq!(hex.len(), 6);
        assert!((hex[0].x - 90.0).abs() < 1e-10);
        let star = star_vertices(rect);
        assert_eq!(star.len(), 10);
        // First spike points straight up
        assert!((star[0].x - 50.0).abs() < 1e-10);
        assert!((star[0].y - 0.0).abs() < 1e-10);
    }
}
