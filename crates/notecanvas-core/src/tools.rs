//! Tool selection, creation defaults and connector capture.

use crate::entities::{ArrowStyle, Edge, EntityRef, LineStyle, NodeShape, bow_control_point};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tool selection errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    Unknown(String),
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pencil,
    Node,
    Line,
    Arrow,
    CurvedArrow,
    Text,
    Zone,
    Sticker,
    Frame,
}

impl ToolKind {
    pub const ALL: [ToolKind; 11] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Pencil,
        ToolKind::Node,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::CurvedArrow,
        ToolKind::Text,
        ToolKind::Zone,
        ToolKind::Sticker,
        ToolKind::Frame,
    ];

    /// Name used by `set_tool` and in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Pencil => "pencil",
            ToolKind::Node => "node",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::CurvedArrow => "curved-arrow",
            ToolKind::Text => "text",
            ToolKind::Zone => "zone",
            ToolKind::Sticker => "sticker",
            ToolKind::Frame => "frame",
        }
    }

    /// Tools that connect two entities with an edge.
    pub fn is_connector(self) -> bool {
        matches!(self, ToolKind::Line | ToolKind::Arrow | ToolKind::CurvedArrow)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ToolError::Unknown(s.to_string()))
    }
}

/// Styles applied to newly created entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    /// Color of strokes, edges, texts, zones and frames.
    pub line_color: String,
    pub stroke_color: String,
    pub fill_color: String,
    pub line_width: f64,
    pub line_style: LineStyle,
    pub arrow_style: ArrowStyle,
    pub node_shape: NodeShape,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            line_color: "#5865f2".to_string(),
            stroke_color: "#5865f2".to_string(),
            fill_color: "#252525".to_string(),
            line_width: 2.0,
            line_style: LineStyle::Solid,
            arrow_style: ArrowStyle::Normal,
            node_shape: NodeShape::Rectangle,
        }
    }
}

impl ToolDefaults {
    /// Build the edge a connector `tool` creates between two entities whose
    /// centers are `from_center` and `to_center`.
    pub fn connector(
        &self,
        tool: ToolKind,
        from: EntityRef,
        to: EntityRef,
        from_center: Point,
        to_center: Point,
    ) -> Edge {
        let mut edge = Edge::new(from, to);
        edge.style = self.line_style.clone();
        edge.arrow_style = match tool {
            ToolKind::Line => ArrowStyle::None,
            _ => self.arrow_style.clone(),
        };
        edge.color = self.line_color.clone();
        edge.width = self.line_width;
        if tool == ToolKind::CurvedArrow {
            edge.control_point = bow_control_point(from_center, to_center);
        }
        edge
    }
}

/// The current tool plus its in-progress connector capture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub defaults: ToolDefaults,
    connecting_from: Option<EntityRef>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools. Any pending connector endpoint is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.connecting_from = None;
    }

    /// The captured "from" endpoint awaiting its partner.
    pub fn pending(&self) -> Option<&EntityRef> {
        self.connecting_from.as_ref()
    }

    /// Drop the pending connector endpoint.
    pub fn cancel(&mut self) {
        self.connecting_from = None;
    }

    /// Feed a clicked connectable entity into the two-phase capture. Returns
    /// the `(from, to)` pair once a second, different entity is clicked.
    /// Only connector tools capture.
    pub fn capture_endpoint(&mut self, target: EntityRef) -> Option<(EntityRef, EntityRef)> {
        if !self.current_tool.is_connector() {
            return None;
        }
        match self.connecting_from.take() {
            None => {
                self.connecting_from = Some(target);
                None
            }
            Some(from) if from == target => {
                self.connecting_from = Some(from);
                None
            }
            Some(from) => Some((from, target)),
        }
    }
}
