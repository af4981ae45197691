//! Diagram node: a labelled shape.

use super::{Entity, EntityKind, NodeShape, new_id};
use crate::geometry::{
    Boundary, diamond_vertices, hexagon_vertices, triangle_vertices,
};
use crate::metrics;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Side length of the TODO checkbox drawn left of a node.
pub const TODO_CHECKBOX_SIZE: f64 = 18.0;
/// Gap between the checkbox and the node.
const TODO_CHECKBOX_GAP: f64 = 12.0;

/// A labelled shape that edges can connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
    pub shape: NodeShape,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    /// `None` hides the checkbox; `Some(done)` shows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<bool>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            id: String::new(),
            x: 0.0,
            y: 0.0,
            width: 120.0,
            height: 60.0,
            text: String::new(),
            shape: NodeShape::default(),
            fill_color: "#252525".to_string(),
            stroke_color: "#5865f2".to_string(),
            stroke_width: 2.0,
            todo: None,
        }
    }
}

impl Node {
    /// Create a node centered on `center`, sized to fit `text`.
    pub fn new(center: Point, text: impl Into<String>, shape: NodeShape) -> Self {
        let mut node = Self {
            id: new_id(EntityKind::Node),
            x: center.x - 60.0,
            y: center.y - 30.0,
            text: text.into(),
            shape,
            ..Default::default()
        };
        node.fit_to_text();
        node
    }

    pub fn with_colors(mut self, fill: &str, stroke: &str) -> Self {
        self.fill_color = fill.to_string();
        self.stroke_color = stroke.to_string();
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Resize to fit the label, keeping the center in place.
    pub fn fit_to_text(&mut self) {
        let center = self.rect().center();
        let size = metrics::fit_node(&self.text, &self.shape);
        self.width = size.width;
        self.height = size.height;
        self.x = center.x - size.width / 2.0;
        self.y = center.y - size.height / 2.0;
    }

    /// Hit region of the TODO checkbox, if the node has one.
    pub fn todo_checkbox(&self) -> Option<Rect> {
        self.todo?;
        let x = self.x - TODO_CHECKBOX_SIZE - TODO_CHECKBOX_GAP;
        let y = self.y + (self.height - TODO_CHECKBOX_SIZE) / 2.0;
        Some(Rect::new(x, y, x + TODO_CHECKBOX_SIZE, y + TODO_CHECKBOX_SIZE))
    }

    /// Absent becomes done; otherwise the flag flips.
    pub fn toggle_todo(&mut self) {
        self.todo = Some(!self.todo.unwrap_or(false));
    }

    /// Checked TODO.
    pub fn is_done(&self) -> bool {
        self.todo == Some(true)
    }
}

impl Entity for Node {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Node
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn boundary(&self) -> Boundary {
        let rect = self.rect();
        let min_radius = rect.width().min(rect.height()) / 2.0;
        match self.shape.resolved() {
            NodeShape::Circle | NodeShape::Star => Boundary::circle(rect.center(), min_radius),
            NodeShape::Ellipse => Boundary::Ellipse {
                center: rect.center(),
                radii: Vec2::new(rect.width() / 2.0, rect.height() / 2.0),
            },
            NodeShape::Triangle => Boundary::polygon(rect, triangle_vertices(rect)),
            NodeShape::Diamond => Boundary::polygon(rect, diamond_vertices(rect)),
            NodeShape::Hexagon => Boundary::polygon(rect, hexagon_vertices(rect)),
            _ => Boundary::Rect(rect),
        }
    }

    fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }
}
