//! Titled frame. Only its border band is clickable.

use super::{Entity, EntityKind, new_id};
use crate::geometry::rect_contains;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Width of the clickable band on the left, right and bottom.
const BORDER_BAND: f64 = 20.0;
/// Height of the clickable band along the title bar.
const TITLE_BAND: f64 = 30.0;

pub const DEFAULT_FRAME_TITLE: &str = "Группа";

/// A titled border. Only the border band is hit-testable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frame {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub color: String,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 150.0,
            title: DEFAULT_FRAME_TITLE.to_string(),
            color: "#5865f2".to_string(),
        }
    }
}

impl Frame {
    /// A default-sized frame centered on `center`.
    pub fn new(center: Point, color: &str) -> Self {
        let defaults = Self::default();
        Self {
            id: new_id(EntityKind::Frame),
            x: center.x - defaults.width / 2.0,
            y: center.y - defaults.height / 2.0,
            color: color.to_string(),
            ..defaults
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// The interior that does not count as a hit.
    pub fn interior(&self) -> Rect {
        let r = self.rect();
        Rect::new(
            r.x0 + BORDER_BAND,
            r.y0 + TITLE_BAND,
            r.x1 - BORDER_BAND,
            r.y1 - BORDER_BAND,
        )
    }
}

impl Entity for Frame {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Frame
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn contains_point(&self, point: Point, _tolerance: f64) -> bool {
        let interior = self.interior();
        let in_interior = interior.x0 <= interior.x1
            && interior.y0 <= interior.y1
            && rect_contains(interior, point);
        rect_contains(self.rect(), point) && !in_interior
    }

    fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_border_band_hits() {
        let f = Frame::new(Point::new(100.0, 75.0), "#fff");
        assert_eq!(f.rect(), Rect::new(0.0, 0.0, 200.0, 150.0));
        assert!(f.contains_point(Point::new(5.0, 75.0), 0.0));
        assert!(f.contains_point(Point::new(100.0, 25.0), 0.0));
        assert!(f.contains_point(Point::new(100.0, 140.0), 0.0));
        assert!(!f.contains_point(Point::new(100.0, 75.0), 0.0));
        assert!(!f.contains_point(Point::new(250.0, 75.0), 0.0));
    }
}
