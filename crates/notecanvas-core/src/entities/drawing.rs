//! Freehand pencil stroke.

use super::{Entity, EntityKind, new_id};
use crate::geometry::points_bounds;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand pencil stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Drawing {
    pub id: String,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
}

impl Default for Drawing {
    fn default() -> Self {
        Self {
            id: String::new(),
            points: Vec::new(),
            color: "#5865f2".to_string(),
            width: 2.0,
        }
    }
}

impl Drawing {
    /// Start a stroke at `start`.
    pub fn new(start: Point, color: &str, width: f64) -> Self {
        Self {
            id: new_id(EntityKind::Drawing),
            points: vec![start],
            color: color.to_string(),
            width,
        }
    }

    /// Append a sampled pointer position.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Distance from `point` to the closest recorded point.
    pub fn nearest_distance(&self, point: Point) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.distance(point))
            .reduce(f64::min)
    }
}

impl Entity for Drawing {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Drawing
    }

    fn bounds(&self) -> Rect {
        points_bounds(&self.points).unwrap_or(Rect::ZERO)
    }

    fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        self.nearest_distance(point)
            .is_some_and(|d| d < tolerance)
    }

    fn origin(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    /// Moves every point so the first one lands on `origin`.
    fn set_origin(&mut self, origin: Point) {
        let delta = origin - self.origin();
        for p in &mut self.points {
            *p += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_uses_nearest_point() {
        let mut d = Drawing::new(Point::new(0.0, 0.0), "#000", 2.0);
        d.push(Point::new(100.0, 0.0));
        assert!(d.contains_point(Point::new(5.0, 5.0), 20.0));
        // Between the points but far from both
        assert!(!d.contains_point(Point::new(50.0, 0.0), 20.0));
    }

    #[test]
    fn test_set_origin_translates_all_points() {
        let mut d = Drawing::new(Point::new(10.0, 10.0), "#000", 2.0);
        d.push(Point::new(20.0, 30.0));
        d.set_origin(Point::new(0.0, 0.0));
        assert_eq!(d.points, vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)]);
    }

    #[test]
    fn test_single_point_bounds() {
        let d = Drawing::new(Point::new(3.0, 4.0), "#000", 2.0);
        assert_eq!(d.bounds(), Rect::new(3.0, 4.0, 3.0, 4.0));
    }
}
