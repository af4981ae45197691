//! Sticky note that grows to fit its wrapped text.

use super::{Entity, EntityKind, new_id};
use crate::metrics;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Paper colors new stickers pick from.
pub const STICKER_COLORS: [&str; 4] = ["#fee75c", "#ffb3ba", "#bae1ff", "#baffc9"];

/// A sticky note that sizes itself to its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sticker {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub color: String,
}

impl Default for Sticker {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            width: metrics::STICKER_MIN_SIZE.width,
            height: metrics::STICKER_MIN_SIZE.height,
            text: String::new(),
            color: STICKER_COLORS[0].to_string(),
        }
    }
}

impl Sticker {
    /// An empty sticker centered on `center` in a randomly picked paper color.
    pub fn new(center: Point) -> Self {
        let pick = Uuid::new_v4().as_bytes()[0] as usize % STICKER_COLORS.len();
        let size = metrics::STICKER_MIN_SIZE;
        Self {
            id: new_id(EntityKind::Sticker),
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            color: STICKER_COLORS[pick].to_string(),
            ..Default::default()
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Resize for the current text. The top-left corner stays put.
    pub fn fit_to_text(&mut self) {
        let size = metrics::fit_sticker(&self.text, Size::new(self.width, self.height));
        self.width = size.width;
        self.height = size.height;
    }
}

impl Entity for Sticker {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Sticker
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
