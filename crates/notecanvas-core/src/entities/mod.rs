//! Entity definitions for the canvas scene.

mod drawing;
mod edge;
mod frame;
mod node;
mod raster;
mod sticker;
mod style;
mod text;
mod zone;

pub use drawing::Drawing;
pub use edge::{Edge, bow_control_point};
pub use frame::{DEFAULT_FRAME_TITLE, Frame};
pub use node::{Node, TODO_CHECKBOX_SIZE};
pub use raster::{Bitmap, Image, ImageFormat, fit_within};
pub use sticker::{STICKER_COLORS, Sticker};
pub use style::{ArrowStyle, LineStyle, NodeShape, parse_hex_color};
pub use text::Text;
pub use zone::{ResizeHandle, Zone};

use crate::geometry::{Boundary, rect_contains};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of an entity. Ids are unique per kind, so a `(kind, id)` pair
/// identifies any entity in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Edge,
    Drawing,
    Text,
    Zone,
    Sticker,
    Frame,
    Image,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Node,
        EntityKind::Edge,
        EntityKind::Drawing,
        EntityKind::Text,
        EntityKind::Zone,
        EntityKind::Sticker,
        EntityKind::Frame,
        EntityKind::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Drawing => "drawing",
            EntityKind::Text => "text",
            EntityKind::Zone => "zone",
            EntityKind::Sticker => "sticker",
            EntityKind::Frame => "frame",
            EntityKind::Image => "image",
        }
    }

    /// Prefix used when minting ids for this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Image => "img",
            other => other.as_str(),
        }
    }

    /// Whether edges may attach to entities of this kind.
    pub fn is_connectable(self) -> bool {
        !matches!(self, EntityKind::Edge | EntityKind::Drawing)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an entity by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Mint a fresh id for an entity of `kind`.
pub fn new_id(kind: EntityKind) -> String {
    format!("{}_{}", kind.id_prefix(), Uuid::new_v4().simple())
}

/// Common behavior of positioned entities (everything except edges, whose
/// geometry depends on the entities they connect).
pub trait Entity {
    fn id(&self) -> &str;

    fn kind(&self) -> EntityKind;

    /// Axis-aligned bounds in scene coordinates.
    fn bounds(&self) -> Rect;

    /// Anchor point for connectors.
    fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Whether `point` hits this entity. Only freehand strokes use `tolerance`.
    fn contains_point(&self, point: Point, _tolerance: f64) -> bool {
        rect_contains(self.bounds(), point)
    }

    /// Outline used to clip connectors.
    fn boundary(&self) -> Boundary {
        Boundary::Rect(self.bounds())
    }

    /// Position moved by drags: the top-left corner, the text baseline
    /// anchor, or a stroke's first point.
    fn origin(&self) -> Point;

    fn set_origin(&mut self, origin: Point);

    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_prefix() {
        let id = new_id(EntityKind::Image);
        assert!(id.starts_with("img_"));
        assert_ne!(id, new_id(EntityKind::Image));
        assert!(new_id(EntityKind::Node).starts_with("node_"));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&EntityKind::Sticker).unwrap();
        assert_eq!(json, "\"sticker\"");
        let kind: EntityKind = serde_json::from_str("\"frame\"").unwrap();
        assert_eq!(kind, EntityKind::Frame);
    }

    #[test]
    fn test_connectable_kinds() {
        let connectable: Vec<_> = EntityKind::ALL
            .into_iter()
            .filter(|k| k.is_connectable())
            .collect();
        assert_eq!(connectable.len(), 6);
        assert!(!EntityKind::Edge.is_connectable());
        assert!(!EntityKind::Drawing.is_connectable());
    }
}
