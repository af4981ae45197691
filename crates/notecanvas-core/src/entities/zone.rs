//! Background zone: a translucent region with corner resize handles.

use super::{Entity, EntityKind, new_id};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Corner handle of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];

    /// Position of this handle on `rect`.
    pub fn position(self, rect: Rect) -> Point {
        match self {
            ResizeHandle::NorthWest => Point::new(rect.x0, rect.y0),
            ResizeHandle::NorthEast => Point::new(rect.x1, rect.y0),
            ResizeHandle::SouthWest => Point::new(rect.x0, rect.y1),
            ResizeHandle::SouthEast => Point::new(rect.x1, rect.y1),
        }
    }

    /// The diagonally opposite corner, which stays fixed during a resize.
    pub fn opposite(self) -> ResizeHandle {
        match self {
            ResizeHandle::NorthWest => ResizeHandle::SouthEast,
            ResizeHandle::NorthEast => ResizeHandle::SouthWest,
            ResizeHandle::SouthWest => ResizeHandle::NorthEast,
            ResizeHandle::SouthEast => ResizeHandle::NorthWest,
        }
    }
}

/// A translucent background region with a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub color: String,
    pub opacity: f64,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 150.0,
            title: String::new(),
            color: "#5865f2".to_string(),
            opacity: 0.15,
        }
    }
}

impl Zone {
    /// A 200x150 zone centered on `center`.
    pub fn new(center: Point, color: &str) -> Self {
        let defaults = Self::default();
        Self {
            id: new_id(EntityKind::Zone),
            x: center.x - defaults.width / 2.0,
            y: center.y - defaults.height / 2.0,
            color: color.to_string(),
            ..defaults
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Handle within `tolerance` (per axis) of `point`.
    pub fn handle_at(&self, point: Point, tolerance: f64) -> Option<ResizeHandle> {
        let rect = self.rect();
        ResizeHandle::ALL.into_iter().find(|h| {
            let pos = h.position(rect);
            (point.x - pos.x).abs() < tolerance && (point.y - pos.y).abs() < tolerance
        })
    }

    /// Drag `handle` to `pointer`. The opposite corner stays put and neither
    /// side shrinks below `min_size`.
    pub fn resize(&mut self, handle: ResizeHandle, pointer: Point, min_size: f64) {
        let anchor = handle.opposite().position(self.rect());
        let (x0, x1) = match handle {
            ResizeHandle::NorthWest | ResizeHandle::SouthWest => {
                (pointer.x.min(anchor.x - min_size), anchor.x)
            }
            ResizeHandle::NorthEast | ResizeHandle::SouthEast => {
                (anchor.x, pointer.x.max(anchor.x + min_size))
            }
        };
        let (y0, y1) = match handle {
            ResizeHandle::NorthWest | ResizeHandle::NorthEast => {
                (pointer.y.min(anchor.y - min_size), anchor.y)
            }
            ResizeHandle::SouthWest | ResizeHandle::SouthEast => {
                (anchor.y, pointer.y.max(anchor.y + min_size))
            }
        };
        self.x = x0;
        self.y = y0;
        self.width = x1 - x0;
        self.height = y1 - y0;
    }
}

impl Entity for Zone {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Zone
    }

    fn bounds(&self) -> Rect {
        self.rect()
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

    fn zone() -> Zone {
        Zone {
            id: "z".into(),
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 150.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_handle_hit() {
        let z = zone();
        assert_eq!(z.handle_at(Point::new(198.0, 148.0), 12.0), Some(ResizeHandle::SouthEast));
        assert_eq!(z.handle_at(Point::new(-5.0, 5.0), 12.0), Some(ResizeHandle::NorthWest));
        assert_eq!(z.handle_at(Point::new(100.0, 75.0), 12.0), None);
    }

    #[test]
    fn test_resize_se() {
        let mut z = zone();
        z.resize(ResizeHandle::SouthEast, Point::new(300.0, 250.0), 50.0);
        assert_eq!(z.rect(), Rect::new(0.0, 0.0, 300.0, 250.0));
    }

    #[test]
    fn test_resize_nw_keeps_opposite_corner() {
        let mut z = zone();
        z.resize(ResizeHandle::NorthWest, Point::new(-50.0, 20.0), 50.0);
        assert_eq!(z.rect(), Rect::new(-50.0, 20.0, 200.0, 150.0));
    }

    #[test]
    fn test_resize_floor_every_handle() {
        for handle in ResizeHandle::ALL {
            for pointer in [
                Point::new(100.0, 75.0),
                Point::new(-500.0, 900.0),
                Point::new(900.0, -500.0),
                Point::new(199.0, 149.0),
            ] {
                let mut z = zone();
                let anchor = handle.opposite().position(z.rect());
                z.resize(handle, pointer, 50.0);
                assert!(z.width >= 50.0 && z.height >= 50.0, "{handle:?} {pointer:?}");
                assert_eq!(handle.opposite().position(z.rect()), anchor);
            }
        }
    }
}
