//! Connector between two entities.

use super::{ArrowStyle, EntityKind, EntityRef, LineStyle, new_id};
use kurbo::Point;
use serde::{Deserialize, Serialize};

fn legacy_endpoint_kind() -> EntityKind {
    EntityKind::Node
}

fn default_color() -> String {
    "#5865f2".to_string()
}

fn default_width() -> f64 {
    2.0
}

/// An edge references its endpoints by `(kind, id)`. Documents that predate
/// typed endpoints omit the kinds; those endpoints are nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    #[serde(default = "legacy_endpoint_kind")]
    pub from_type: EntityKind,
    pub from: String,
    #[serde(default = "legacy_endpoint_kind")]
    pub to_type: EntityKind,
    pub to: String,
    #[serde(default)]
    pub style: LineStyle,
    #[serde(default)]
    pub arrow_style: ArrowStyle,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_point: Option<Point>,
}

impl Edge {
    /// A solid, straight edge with a normal arrowhead.
    pub fn new(from: EntityRef, to: EntityRef) -> Self {
        Self {
            id: new_id(EntityKind::Edge),
            from_type: from.kind,
            from: from.id,
            to_type: to.kind,
            to: to.id,
            style: LineStyle::default(),
            arrow_style: ArrowStyle::default(),
            color: default_color(),
            width: default_width(),
            control_point: None,
        }
    }

    pub fn from_ref(&self) -> EntityRef {
        EntityRef::new(self.from_type, self.from.clone())
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.to_type, self.to.clone())
    }

    /// Whether either endpoint is `target`.
    pub fn touches(&self, target: &EntityRef) -> bool {
        (self.from_type == target.kind && self.from == target.id)
            || (self.to_type == target.kind && self.to == target.id)
    }

    /// Curved edges carry a control point.
    pub fn is_curved(&self) -> bool {
        self.control_point.is_some()
    }
}

/// Control point that bows a connector between two centers: the midpoint,
/// pushed perpendicular to the from->to direction by `min(50, 0.3 * len)`.
pub fn bow_control_point(from: Point, to: Point) -> Option<Point> {
    let d = to - from;
    let len = d.hypot();
    if len < f64::EPSILON {
        return None;
    }
    let offset = (len * 0.3).min(50.0);
    let mid = from.midpoint(to);
    Some(Point::new(mid.x - d.y / len * offset, mid.y + d.x / len * offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_edge_defaults_to_nodes() {
        let json = r#"{"id":"e1","from":"a","to":"b"}"#;
        let edge: Edge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.from_type, EntityKind::Node);
        assert_eq!(edge.to_type, EntityKind::Node);
        assert_eq!(edge.arrow_style, ArrowStyle::Normal);
        assert!(edge.control_point.is_none());
    }

    #[test]
    fn test_touches() {
        let edge = Edge::new(
            EntityRef::new(EntityKind::Sticker, "s1"),
            EntityRef::new(EntityKind::Node, "n1"),
        );
        assert!(edge.touches(&EntityRef::new(EntityKind::Sticker, "s1")));
        assert!(edge.touches(&EntityRef::new(EntityKind::Node, "n1")));
        // Same id, different kind
        assert!(!edge.touches(&EntityRef::new(EntityKind::Node, "s1")));
    }

    #[test]
    fn test_bow_control_point() {
        let cp = bow_control_point(Point::new(0.0, 0.0), Point::new(100.0, 0.0)).unwrap();
        assert!((cp.x - 50.0).abs() < 1e-10);
        assert!((cp.y - 30.0).abs() < 1e-10);

        let long = bow_control_point(Point::new(0.0, 0.0), Point::new(0.0, 1000.0)).unwrap();
        assert!((long.x + 50.0).abs() < 1e-10);
        assert!((long.y - 500.0).abs() < 1e-10);

        assert!(bow_control_point(Point::ZERO, Point::ZERO).is_none());
    }

    #[test]
    fn test_control_point_serialized_as_xy() {
        let mut edge = Edge::new(
            EntityRef::new(EntityKind::Node, "a"),
            EntityRef::new(EntityKind::Node, "b"),
        );
        edge.control_point = Some(Point::new(1.0, 2.0));
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["controlPoint"]["x"], 1.0);
        assert_eq!(value["fromType"], "node");
        assert_eq!(value["arrowStyle"], "normal");
    }
}
