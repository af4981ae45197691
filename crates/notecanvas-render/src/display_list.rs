//! Backend-neutral draw commands.
//!
//! A [`DisplayList`] records fills, strokes, text runs and images in paint
//! order. A backend replays it onto its own surface; nothing here touches a
//! GPU or a font stack.

use kurbo::{Affine, BezPath, Point, Rect, Shape, Stroke};
use notecanvas_core::entities::Bitmap;
use notecanvas_core::EntityRef;
use peniko::Color;
use std::sync::Arc;

/// Flattening tolerance used when converting shapes to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Paint layers, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Grid,
    Zones,
    Frames,
    Drawings,
    Images,
    Stickers,
    Nodes,
    Edges,
    /// Zone resize handles and the pending connector source.
    Handles,
    Texts,
    SelectionOutline,
    Marquee,
}

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Vertical anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
    Top,
}

/// A single line of text to lay out and paint.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub origin: Point,
    pub text: String,
    pub font_size: f64,
    pub bold: bool,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextRun {
    pub fn new(origin: Point, text: impl Into<String>, font_size: f64, color: Color) -> Self {
        Self {
            origin,
            text: text.into(),
            font_size,
            bold: false,
            color,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn aligned(mut self, align: TextAlign, baseline: TextBaseline) -> Self {
        self.align = align;
        self.baseline = baseline;
        self
    }
}

/// One recorded paint operation. Geometry is in scene space; `transform` maps it to device pixels.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Fill {
        transform: Affine,
        color: Color,
        path: BezPath,
    },
    Stroke {
        transform: Affine,
        style: Stroke,
        color: Color,
        path: BezPath,
    },
    Text {
        transform: Affine,
        run: TextRun,
    },
    Image {
        transform: Affine,
        rect: Rect,
        bitmap: Arc<Bitmap>,
    },
}

/// A command with the layer it was painted in and the entity it belongs to.
#[derive(Debug, Clone)]
pub struct DisplayItem {
    pub layer: Layer,
    pub target: Option<EntityRef>,
    pub command: DrawCommand,
}

/// Recorded frame.
#[derive(Debug, Clone)]
pub struct DisplayList {
    items: Vec<DisplayItem>,
    layer: Layer,
    target: Option<EntityRef>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            layer: Layer::Grid,
            target: None,
        }
    }

    /// Drop all recorded commands.
    pub fn reset(&mut self) {
        self.items.clear();
        self.layer = Layer::Grid;
        self.target = None;
    }

    /// Commands recorded from now on belong to `layer`.
    pub fn begin_layer(&mut self, layer: Layer) {
        self.layer = layer;
        self.target = None;
    }

    /// Attribute following commands to `target`.
    pub fn set_target(&mut self, target: Option<EntityRef>) {
        self.target = target;
    }

    fn push(&mut self, command: DrawCommand) {
        self.items.push(DisplayItem {
            layer: self.layer,
            target: self.target.clone(),
            command,
        });
    }

    /// Record a fill of `shape`.
    pub fn fill(&mut self, transform: Affine, color: Color, shape: &impl Shape) {
        self.push(DrawCommand::Fill {
            transform,
            color,
            path: shape.to_path(PATH_TOLERANCE),
        });
    }

    /// Record a stroke of `shape`.
    pub fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, shape: &impl Shape) {
        self.push(DrawCommand::Stroke {
            transform,
            style: style.clone(),
            color,
            path: shape.to_path(PATH_TOLERANCE),
        });
    }

    pub fn text(&mut self, transform: Affine, run: TextRun) {
        self.push(DrawCommand::Text { transform, run });
    }

    pub fn image(&mut self, transform: Affine, rect: Rect, bitmap: Arc<Bitmap>) {
        self.push(DrawCommand::Image {
            transform,
            rect,
            bitmap,
        });
    }

    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Layers in the order they were painted, consecutive repeats collapsed.
    pub fn layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = self.items.iter().map(|i| i.layer).collect();
        layers.dedup();
        layers
    }

    /// Commands attributed to `target`.
    pub fn commands_for<'a>(&'a self, target: &'a EntityRef) -> impl Iterator<Item = &'a DrawCommand> {
        self.items
            .iter()
            .filter(move |i| i.target.as_ref() == Some(target))
            .map(|i| &i.command)
    }

    /// Commands painted in `layer`.
    pub fn in_layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.items
            .iter()
            .filter(move |i| i.layer == layer)
            .map(|i| &i.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecanvas_core::EntityKind;

    #[test]
    fn test_records_layer_and_target() {
        let mut list = DisplayList::new();
        list.begin_layer(Layer::Nodes);
        let node = EntityRef::new(EntityKind::Node, "n1");
        list.set_target(Some(node.clone()));
        list.fill(Affine::IDENTITY, Color::WHITE, &Rect::new(0.0, 0.0, 10.0, 10.0));
        list.begin_layer(Layer::Marquee);
        list.stroke(
            &Stroke::new(1.0),
            Affine::IDENTITY,
            Color::BLACK,
            &Rect::new(0.0, 0.0, 5.0, 5.0),
        );

        assert_eq!(list.len(), 2);
        assert_eq!(list.layers(), vec![Layer::Nodes, Layer::Marquee]);
        assert_eq!(list.commands_for(&node).count(), 1);
        assert!(list.items()[1].target.is_none());
        assert_eq!(list.in_layer(Layer::Marquee).count(), 1);
    }

    #[test]
    fn test_reset_clears() {
        let mut list = DisplayList::new();
        list.begin_layer(Layer::Texts);
        list.text(
            Affine::IDENTITY,
            TextRun::new(Point::ZERO, "hi", 16.0, Color::WHITE).bold(),
        );
        list.reset();
        assert!(list.is_empty());
        assert!(list.layers().is_empty());
    }

    #[test]
    fn test_layers_are_ordered() {
        assert!(Layer::Grid < Layer::Zones);
        assert!(Layer::Nodes < Layer::Edges);
        assert!(Layer::Texts < Layer::SelectionOutline);
        assert!(Layer::SelectionOutline < Layer::Marquee);
    }
}
