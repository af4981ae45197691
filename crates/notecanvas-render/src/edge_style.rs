//! Connector styling resolved at draw time: dashes, wave strokes and arrowheads.

use kurbo::{BezPath, Point, Stroke, Vec2};
use notecanvas_core::entities::{ArrowStyle, LineStyle};
use notecanvas_core::EdgeGeometry;
use std::f64::consts::PI;

/// Length of an arrowhead barb.
pub const ARROW_LENGTH: f64 = 12.0;
/// Half the opening angle of an arrowhead.
pub const ARROW_HALF_ANGLE: f64 = PI / 6.0;
/// Side barbs of the diamond head, relative to its length.
const DIAMOND_FACTOR: f64 = 0.7;
/// Reach of the second barb of a double head.
const DOUBLE_REACH: f64 = 2.2;

const WAVE_AMPLITUDE: f64 = 5.0;
const WAVE_SEGMENT: f64 = 20.0;
const WAVE_MIN_SEGMENTS: usize = 10;

/// How much of the line an arrowhead covers. The line stops this far
/// short of the tip.
pub fn arrow_max_length(style: &ArrowStyle) -> f64 {
    match style.resolved() {
        ArrowStyle::None => 0.0,
        ArrowStyle::Double => ARROW_LENGTH * DOUBLE_REACH,
        _ => ARROW_LENGTH,
    }
}

/// Stroke for an edge body with the style's dash pattern applied. Waves
/// are drawn as a path and stay continuous.
pub fn edge_stroke(style: &LineStyle, width: f64) -> Stroke {
    let stroke = Stroke::new(width);
    let dashes = style.dash_pattern();
    if dashes.is_empty() {
        stroke
    } else {
        stroke.with_dashes(0.0, dashes)
    }
}

/// Direction of travel at the target end: the chord for straight edges,
/// the Bezier derivative at t = 1 for curved ones.
pub fn end_angle(start: Point, end: Point, control: Option<Point>) -> f64 {
    let tangent = match control {
        Some(cp) => (end - cp) * 2.0,
        None => end - start,
    };
    tangent.atan2()
}

/// A sine wave from `from` to `to`, displaced along y.
pub fn wave_path(from: Point, to: Point) -> BezPath {
    let delta = to - from;
    let segments = ((delta.hypot() / WAVE_SEGMENT).floor() as usize).max(WAVE_MIN_SEGMENTS);
    let mut path = BezPath::new();
    for i in 0..=segments {
        let t = i as f64 / segments as f64;
        let p = from + delta * t + Vec2::new(0.0, (t * PI * 4.0).sin() * WAVE_AMPLITUDE);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

/// One painted piece of an arrowhead.
#[derive(Debug, Clone, PartialEq)]
pub enum HeadPart {
    Fill(BezPath),
    Stroke(BezPath),
}

/// Point `len` units back from `tip` along `angle`.
fn back(tip: Point, angle: f64, len: f64) -> Point {
    tip - Vec2::from_angle(angle) * len
}

fn closed(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(*p);
        } else {
            path.line_to(*p);
        }
    }
    path.close_path();
    path
}

/// Arrowhead pieces for `style`, pointing along `angle` with the tip at `tip`.
pub fn arrowhead(style: &ArrowStyle, tip: Point, angle: f64) -> Vec<HeadPart> {
    let left = |len: f64| back(tip, angle - ARROW_HALF_ANGLE, len);
    let right = |len: f64| back(tip, angle + ARROW_HALF_ANGLE, len);
    match style.resolved() {
        ArrowStyle::None => Vec::new(),
        ArrowStyle::Open => {
            let mut path = BezPath::new();
            path.move_to(tip);
            path.line_to(left(ARROW_LENGTH));
            path.move_to(tip);
            path.line_to(right(ARROW_LENGTH));
            vec![HeadPart::Stroke(path)]
        }
        ArrowStyle::Diamond => vec![HeadPart::Fill(closed(&[
            tip,
            left(ARROW_LENGTH * DIAMOND_FACTOR),
            back(tip, angle, ARROW_LENGTH),
            right(ARROW_LENGTH * DIAMOND_FACTOR),
        ]))],
        ArrowStyle::Double => vec![
            HeadPart::Fill(closed(&[
                tip,
                left(ARROW_LENGTH),
                back(tip, angle, ARROW_LENGTH * DIAMOND_FACTOR),
                right(ARROW_LENGTH),
            ])),
            HeadPart::Fill(closed(&[
                back(tip, angle, ARROW_LENGTH * 1.5),
                left(ARROW_LENGTH * DOUBLE_REACH),
                back(tip, angle, ARROW_LENGTH * 1.9),
                right(ARROW_LENGTH * DOUBLE_REACH),
            ])),
        ],
        // Normal, Closed and anything unrecognized
        _ => vec![HeadPart::Fill(closed(&[tip, left(ARROW_LENGTH), right(ARROW_LENGTH)]))],
    }
}

/// Everything needed to paint one edge.
#[derive(Debug, Clone)]
pub struct EdgeShapes {
    pub body: BezPath,
    pub stroke: Stroke,
    pub head: Vec<HeadPart>,
}

/// Build the body and head of an edge from its clipped geometry.
pub fn edge_shapes(
    geom: &EdgeGeometry,
    line: &LineStyle,
    arrow: &ArrowStyle,
    width: f64,
) -> EdgeShapes {
    let angle = end_angle(geom.start, geom.end, geom.control);
    let shortened = back(geom.end, angle, arrow_max_length(arrow));

    let (body, stroke) = match geom.control {
        Some(cp) => {
            let mut path = BezPath::new();
            path.move_to(geom.start);
            path.quad_to(cp, shortened);
            (path, edge_stroke(line, width))
        }
        None if line.resolved() == LineStyle::Wave => {
            (wave_path(geom.start, shortened), Stroke::new(width))
        }
        None => {
            let mut path = BezPath::new();
            path.move_to(geom.start);
            path.line_to(shortened);
            (path, edge_stroke(line, width))
        }
    };

    EdgeShapes {
        body,
        stroke,
        head: arrowhead(arrow, geom.end, angle),
    }
}
