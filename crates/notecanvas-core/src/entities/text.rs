//! Free text label anchored at its baseline.

use super::{Entity, EntityKind, new_id};
use crate::metrics::text_width;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Free text anchored at its baseline origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Text {
    pub id: String,
    /// Left end of the baseline.
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: String,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            text: String::new(),
            color: "#5865f2".to_string(),
            font_size: 16.0,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl Text {
    pub fn new(anchor: Point, text: impl Into<String>, color: &str) -> Self {
        Self {
            id: new_id(EntityKind::Text),
            x: anchor.x,
            y: anchor.y,
            text: text.into(),
            color: color.to_string(),
            ..Default::default()
        }
    }

    /// Estimated rendered width.
    pub fn width(&self) -> f64 {
        text_width(&self.text, self.font_size)
    }
}

impl Entity for Text {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Text
    }

    /// The box spans one font size above the baseline.
    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y - self.font_size, self.x + self.width(), self.y)
    }

    fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }
}
