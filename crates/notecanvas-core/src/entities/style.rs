//! Style enums shared by entities and the renderer.
//!
//! Every enum keeps unknown strings in an `Other` variant so documents written
//! by newer builds survive a load/export cycle. Renderers resolve unknown
//! values to the default variant through `resolved()`.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Outline of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeShape {
    #[default]
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Diamond,
    Star,
    Hexagon,
    Other(String),
}

impl NodeShape {
    pub fn as_str(&self) -> &str {
        match self {
            NodeShape::Rectangle => "rectangle",
            NodeShape::Circle => "circle",
            NodeShape::Ellipse => "ellipse",
            NodeShape::Triangle => "triangle",
            NodeShape::Diamond => "diamond",
            NodeShape::Star => "star",
            NodeShape::Hexagon => "hexagon",
            NodeShape::Other(s) => s,
        }
    }

    /// The shape to draw: unknown values fall back to a rectangle.
    pub fn resolved(&self) -> NodeShape {
        match self {
            NodeShape::Other(_) => NodeShape::Rectangle,
            known => known.clone(),
        }
    }
}

impl From<String> for NodeShape {
    fn from(s: String) -> Self {
        match s.as_str() {
            "rectangle" => NodeShape::Rectangle,
            "circle" => NodeShape::Circle,
            "ellipse" => NodeShape::Ellipse,
            "triangle" => NodeShape::Triangle,
            "diamond" => NodeShape::Diamond,
            "star" => NodeShape::Star,
            "hexagon" => NodeShape::Hexagon,
            _ => NodeShape::Other(s),
        }
    }
}

impl From<NodeShape> for String {
    fn from(shape: NodeShape) -> Self {
        shape.as_str().to_string()
    }
}

/// Stroke pattern of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    Wave,
    Other(String),
}

impl LineStyle {
    pub fn as_str(&self) -> &str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::DashDot => "dashdot",
            LineStyle::Wave => "wave",
            LineStyle::Other(s) => s,
        }
    }

    /// Unknown styles draw as solid.
    pub fn resolved(&self) -> LineStyle {
        match self {
            LineStyle::Other(_) => LineStyle::Solid,
            known => known.clone(),
        }
    }

    /// Dash pattern for this style; empty means a continuous stroke.
    pub fn dash_pattern(&self) -> &'static [f64] {
        match self.resolved() {
            LineStyle::Dashed => &[10.0, 5.0],
            LineStyle::Dotted => &[2.0, 5.0],
            LineStyle::DashDot => &[10.0, 5.0, 2.0, 5.0],
            _ => &[],
        }
    }
}

impl From<String> for LineStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "solid" => LineStyle::Solid,
            "dashed" => LineStyle::Dashed,
            "dotted" => LineStyle::Dotted,
            "dashdot" => LineStyle::DashDot,
            "wave" => LineStyle::Wave,
            _ => LineStyle::Other(s),
        }
    }
}

impl From<LineStyle> for String {
    fn from(style: LineStyle) -> Self {
        style.as_str().to_string()
    }
}

/// Arrowhead drawn at the target end of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArrowStyle {
    None,
    #[default]
    Normal,
    Open,
    Closed,
    Diamond,
    Double,
    Other(String),
}

impl ArrowStyle {
    pub fn as_str(&self) -> &str {
        match self {
            ArrowStyle::None => "none",
            ArrowStyle::Normal => "normal",
            ArrowStyle::Open => "open",
            ArrowStyle::Closed => "closed",
            ArrowStyle::Diamond => "diamond",
            ArrowStyle::Double => "double",
            ArrowStyle::Other(s) => s,
        }
    }

    /// Unknown heads draw as normal.
    pub fn resolved(&self) -> ArrowStyle {
        match self {
            ArrowStyle::Other(_) => ArrowStyle::Normal,
            known => known.clone(),
        }
    }
}

impl From<String> for ArrowStyle {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => ArrowStyle::None,
            "normal" => ArrowStyle::Normal,
            "open" => ArrowStyle::Open,
            "closed" => ArrowStyle::Closed,
            "diamond" => ArrowStyle::Diamond,
            "double" => ArrowStyle::Double,
            _ => ArrowStyle::Other(s),
        }
    }
}

impl From<ArrowStyle> for String {
    fn from(style: ArrowStyle) -> Self {
        style.as_str().to_string()
    }
}

/// Parse a CSS hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
        }
        6 => Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some(Color::from_rgba8(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}
