//! Display-list renderer: paints the scene into a [`DisplayList`].

use crate::display_list::{DisplayList, Layer, TextAlign, TextBaseline, TextRun};
use crate::edge_style::{HeadPart, edge_shapes};
use crate::renderer::{GridStyle, RenderContext, RenderResult, Renderer, RendererError};
use kurbo::{Affine, BezPath, Cap, Circle, Ellipse, Join, Point, Rect, Stroke};
use notecanvas_core::entities::{
    Drawing, Edge, Entity, EntityKind, EntityRef, Frame, Image, Node, NodeShape, ResizeHandle,
    Sticker, Text, Zone, parse_hex_color,
};
use notecanvas_core::geometry::{diamond_vertices, hexagon_vertices, star_vertices, triangle_vertices};
use notecanvas_core::metrics::{self, NODE_FONT_SIZE, STICKER_FONT_SIZE, STICKER_LINE_HEIGHT};
use notecanvas_core::{Scene, Selection, ToolKind};
use peniko::Color;

/// Label color for nodes and the TODO checkbox outline.
const LABEL_COLOR: Color = Color::from_rgba8(0xdc, 0xdd, 0xde, 255);
const STICKER_TEXT_COLOR: Color = Color::from_rgba8(0x33, 0x33, 0x33, 255);
const FALLBACK_COLOR: Color = Color::from_rgba8(0x58, 0x65, 0xf2, 255);
/// Opacity of nodes whose TODO is done.
const DONE_ALPHA: f32 = 0.6;
const CONTROL_POINT_RADIUS: f64 = 6.0;
const ZONE_HANDLE_RADIUS: f64 = 8.0;
const STICKER_TEXT_PADDING: f64 = 8.0;
const FRAME_TITLE_HEIGHT: f64 = 28.0;
/// Outline inflation of the multi-selection overlay.
const MULTI_SELECTION_INFLATE: f64 = 3.0;

/// Parse a stored color, falling back to the accent color.
fn color(s: &str) -> Color {
    parse_hex_color(s).unwrap_or(FALLBACK_COLOR)
}

/// Subtract `percent` of full scale from each channel.
fn darken(color: Color, percent: f64) -> Color {
    let c = color.to_rgba8();
    let amount = (2.55 * percent).round() as u8;
    Color::from_rgba8(
        c.r.saturating_sub(amount),
        c.g.saturating_sub(amount),
        c.b.saturating_sub(amount),
        c.a,
    )
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(*p);
        } else {
            path.line_to(*p);
        }
    }
    path.close_path();
    path
}

/// Outline of a node for its shape.
pub fn node_path(node: &Node) -> BezPath {
    use kurbo::Shape;
    let rect = node.rect();
    let center = rect.center();
    let radius = rect.width().min(rect.height()) / 2.0;
    match node.shape.resolved() {
        NodeShape::Circle => Circle::new(center, radius).to_path(0.1),
        NodeShape::Ellipse => {
            Ellipse::new(center, (rect.width() / 2.0, rect.height() / 2.0), 0.0).to_path(0.1)
        }
        NodeShape::Triangle => polygon(&triangle_vertices(rect)),
        NodeShape::Diamond => polygon(&diamond_vertices(rect)),
        NodeShape::Star => polygon(&star_vertices(rect)),
        NodeShape::Hexagon => polygon(&hexagon_vertices(rect)),
        _ => rect.to_path(0.1),
    }
}

/// Renderer that records each frame as a [`DisplayList`].
pub struct DisplayListRenderer {
    list: DisplayList,
    selection_color: Color,
    /// Current zoom level (for zoom-independent UI elements).
    zoom: f64,
}

impl Default for DisplayListRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self {
            list: DisplayList::new(),
            selection_color: Color::from_rgba8(0x43, 0xb5, 0x81, 255),
            zoom: 1.0,
        }
    }

    /// The last built frame.
    pub fn list(&self) -> &DisplayList {
        &self.list
    }

    /// Take the last built frame, leaving an empty list.
    pub fn take_list(&mut self) -> DisplayList {
        std::mem::take(&mut self.list)
    }

    fn begin(&mut self, layer: Layer) {
        self.list.begin_layer(layer);
    }

    fn target(&mut self, r: EntityRef) {
        self.list.set_target(Some(r));
    }

    /// Outline `rect` grown by `inflate`, in the selection color.
    fn highlight(&mut self, rect: Rect, inflate: f64, width: f64, transform: Affine) {
        let stroke = Stroke::new(width);
        self.list
            .stroke(&stroke, transform, self.selection_color, &rect.inflate(inflate, inflate));
    }

    fn render_grid(&mut self, ctx: &RenderContext, transform: Affine) -> RenderResult<()> {
        if ctx.grid_style == GridStyle::None {
            return Ok(());
        }
        if transform.determinant().abs() < f64::EPSILON {
            return Err(RendererError::RenderFailed(
                "camera transform is not invertible".to_string(),
            ));
        }
        let grid_size = ctx.editor.config().grid_size;
        let inv = transform.inverse();
        let top_left = inv * Point::ZERO;
        let bottom_right = inv * Point::new(ctx.viewport_size.width, ctx.viewport_size.height);
        let start_x = (top_left.x / grid_size).floor() * grid_size;
        let start_y = (top_left.y / grid_size).floor() * grid_size;
        let end_x = (bottom_right.x / grid_size).ceil() * grid_size;
        let end_y = (bottom_right.y / grid_size).ceil() * grid_size;

        let mut path = BezPath::new();
        match ctx.grid_style {
            GridStyle::Lines => {
                let mut x = start_x;
                while x <= end_x {
                    path.move_to(Point::new(x, start_y));
                    path.line_to(Point::new(x, end_y));
                    x += grid_size;
                }
                let mut y = start_y;
                while y <= end_y {
                    path.move_to(Point::new(start_x, y));
                    path.line_to(Point::new(end_x, y));
                    y += grid_size;
                }
                let stroke = Stroke::new(1.0 / self.zoom);
                self.list.stroke(&stroke, transform, ctx.grid_color, &path);
            }
            GridStyle::Dots => {
                let half = 1.5 / self.zoom;
                let mut x = start_x;
                while x <= end_x {
                    let mut y = start_y;
                    while y <= end_y {
                        let dot = Rect::new(x - half, y - half, x + half, y + half);
                        path.extend(kurbo::Shape::path_elements(&dot, 0.1));
                        y += grid_size;
                    }
                    x += grid_size;
                }
                self.list.fill(transform, ctx.grid_color, &path);
            }
            GridStyle::None => {}
        }
        Ok(())
    }

    fn render_zone(&mut self, zone: &Zone, selected: bool, transform: Affine) {
        let rect = zone.rect();
        let base = color(&zone.color);
        self.list
            .fill(transform, base.with_alpha(zone.opacity as f32), &rect);
        let border = if selected {
            Stroke::new(3.0)
        } else {
            Stroke::new(2.0).with_dashes(0.0, [5.0, 5.0])
        };
        self.list.stroke(&border, transform, base.with_alpha(0.5), &rect);
        if !zone.title.is_empty() {
            let run = TextRun::new(
                Point::new(rect.x0 + 8.0, rect.y0 + 8.0),
                zone.title.clone(),
                14.0,
                base.with_alpha(0.8),
            )
            .bold()
            .aligned(TextAlign::Left, TextBaseline::Top);
            self.list.text(transform, run);
        }
        if selected {
            self.highlight(rect, 2.0, 2.0, transform);
        }
    }

    fn render_frame(&mut self, frame: &Frame, selected: bool, transform: Affine) {
        let rect = frame.rect();
        let base = color(&frame.color);
        let title_bar = Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + FRAME_TITLE_HEIGHT);
        self.list.fill(transform, base.with_alpha(0.2), &title_bar);
        let width = if selected { 3.0 } else { 2.0 };
        self.list
            .stroke(&Stroke::new(width), transform, base.with_alpha(0.6), &rect);
        let title = if frame.title.is_empty() {
            notecanvas_core::entities::DEFAULT_FRAME_TITLE
        } else {
            frame.title.as_str()
        };
        let run = TextRun::new(
            Point::new(rect.x0 + 10.0, rect.y0 + FRAME_TITLE_HEIGHT / 2.0),
            title,
            13.0,
            base,
        )
        .bold()
        .aligned(TextAlign::Left, TextBaseline::Middle);
        self.list.text(transform, run);
        if selected {
            self.highlight(rect, 2.0, 2.0, transform);
        }
    }

    fn render_drawing(&mut self, drawing: &Drawing, selected: bool, transform: Affine) {
        let Some((first, rest)) = drawing.points.split_first() else {
            return;
        };
        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        let (paint, width) = if selected {
            (self.selection_color, drawing.width + 2.0)
        } else {
            (color(&drawing.color), drawing.width)
        };
        let stroke = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
        self.list.stroke(&stroke, transform, paint, &path);
    }

    fn render_image(&mut self, image: &Image, selected: bool, transform: Affine) {
        if selected {
            self.highlight(image.rect(), 2.0, 3.0, transform);
        }
        self.list
            .image(transform, image.rect(), std::sync::Arc::clone(&image.bitmap));
    }

    fn render_sticker(&mut self, sticker: &Sticker, selected: bool, transform: Affine) {
        let rect = sticker.rect();
        let paper = color(&sticker.color);
        let shadow = rect + kurbo::Vec2::new(3.0, 3.0);
        self.list
            .fill(transform, Color::from_rgba8(0, 0, 0, 77), &shadow);
        self.list.fill(transform, paper, &rect);

        let corner = 20.0_f64.min(rect.width() * 0.15).min(rect.height() * 0.25);
        let fold_tip = Point::new(rect.x1 - corner, rect.y0);
        self.list.fill(
            transform,
            darken(paper, 20.0),
            &polygon(&[fold_tip, Point::new(rect.x1, rect.y0 + corner), Point::new(rect.x1, rect.y0)]),
        );
        self.list.fill(
            transform,
            darken(paper, 40.0),
            &polygon(&[
                fold_tip,
                Point::new(rect.x1 - corner, rect.y0 + corner),
                Point::new(rect.x1, rect.y0 + corner),
            ]),
        );

        if !sticker.text.is_empty() {
            let max_width = rect.width() - STICKER_TEXT_PADDING * 2.0;
            let lines = metrics::wrap_lines(&sticker.text, STICKER_FONT_SIZE, max_width);
            for (i, line) in lines.into_iter().enumerate() {
                let origin = Point::new(
                    rect.x0 + STICKER_TEXT_PADDING,
                    rect.y0 + STICKER_TEXT_PADDING + i as f64 * STICKER_LINE_HEIGHT,
                );
                let run = TextRun::new(origin, line, STICKER_FONT_SIZE, STICKER_TEXT_COLOR)
                    .aligned(TextAlign::Left, TextBaseline::Top);
                self.list.text(transform, run);
            }
        }
        if selected {
            self.highlight(rect, 2.0, 3.0, transform);
        }
    }

    fn render_node(&mut self, node: &Node, selected: bool, transform: Affine) {
        let alpha = if node.is_done() { DONE_ALPHA } else { 1.0 };
        let path = node_path(node);
        self.list
            .fill(transform, color(&node.fill_color).multiply_alpha(alpha), &path);
        let (outline, width) = if selected {
            (self.selection_color, 3.0)
        } else {
            (color(&node.stroke_color), node.stroke_width)
        };
        self.list
            .stroke(&Stroke::new(width), transform, outline.multiply_alpha(alpha), &path);

        let run = TextRun::new(node.rect().center(), node.text.clone(), NODE_FONT_SIZE, LABEL_COLOR)
            .aligned(TextAlign::Center, TextBaseline::Middle);
        self.list.text(transform, run);

        if let Some(checkbox) = node.todo_checkbox() {
            self.list
                .stroke(&Stroke::new(2.0), transform, LABEL_COLOR, &checkbox);
            if node.is_done() {
                let done = self.selection_color;
                self.list.fill(transform, done.with_alpha(0.15), &checkbox);
                let size = checkbox.width();
                let mut tick = BezPath::new();
                tick.move_to(Point::new(checkbox.x0 + 5.0, checkbox.y0 + size / 2.0));
                tick.line_to(Point::new(checkbox.x0 + size / 2.0, checkbox.y1 - 5.0));
                tick.line_to(Point::new(checkbox.x1 - 5.0, checkbox.y0 + 5.0));
                let stroke = Stroke::new(2.5).with_caps(Cap::Round).with_join(Join::Round);
                self.list.stroke(&stroke, transform, done, &tick);
            }
        }
    }

    fn render_edge(&mut self, scene: &Scene, edge: &Edge, selected: bool, transform: Affine) {
        let Some(geom) = scene.edge_geometry(edge) else {
            log::debug!("Skipping edge {} with an unresolved endpoint", edge.id);
            return;
        };
        let shapes = edge_shapes(&geom, &edge.style, &edge.arrow_style, edge.width);
        let (paint, stroke) = if selected {
            let mut stroke = shapes.stroke.clone();
            stroke.width = edge.width + 2.0;
            (self.selection_color, stroke)
        } else {
            (color(&edge.color), shapes.stroke.clone())
        };
        self.list.stroke(&stroke, transform, paint, &shapes.body);
        // Heads keep the edge color; only the line is highlighted.
        let head_paint = color(&edge.color);
        for part in &shapes.head {
            match part {
                HeadPart::Fill(path) => self.list.fill(transform, head_paint, path),
                HeadPart::Stroke(path) => {
                    self.list
                        .stroke(&Stroke::new(edge.width), transform, head_paint, path)
                }
            }
        }
        if selected {
            if let Some(cp) = geom.control {
                let handle = Circle::new(cp, CONTROL_POINT_RADIUS);
                self.list.fill(transform, self.selection_color, &handle);
                self.list
                    .stroke(&Stroke::new(2.0), transform, Color::WHITE, &handle);
            }
        }
    }

    fn render_text(&mut self, text: &Text, selected: bool, transform: Affine) {
        let paint = if selected {
            self.selection_color
        } else {
            color(&text.color)
        };
        let run = TextRun::new(text.origin(), text.text.clone(), text.font_size, paint);
        self.list.text(transform, run);
    }

    fn render_zone_handles(&mut self, zone: &Zone, transform: Affine) {
        for handle in ResizeHandle::ALL {
            let dot = Circle::new(handle.position(zone.rect()), ZONE_HANDLE_RADIUS);
            self.list.fill(transform, self.selection_color, &dot);
            self.list
                .stroke(&Stroke::new(2.0), transform, Color::WHITE, &dot);
        }
    }

    fn render_pending_source(&mut self, bounds: Rect, transform: Affine) {
        let dash = 4.0 / self.zoom;
        let stroke = Stroke::new(2.0 / self.zoom).with_dashes(0.0, [dash, dash]);
        self.list.stroke(
            &stroke,
            transform,
            self.selection_color,
            &bounds.inflate(4.0, 4.0),
        );
    }

    fn render_multi_selection(&mut self, scene: &Scene, selection: &Selection, transform: Affine) {
        if selection.len() <= 1 {
            return;
        }
        let stroke = Stroke::new(2.0).with_dashes(0.0, [4.0, 4.0]);
        for r in selection.iter() {
            self.list.set_target(Some(r.clone()));
            if let Some(bounds) = scene.bounds_of(r) {
                let outline = bounds.inflate(MULTI_SELECTION_INFLATE, MULTI_SELECTION_INFLATE);
                self.list
                    .stroke(&stroke, transform, self.selection_color, &outline);
            }
        }
    }

    /// Render a selection rectangle (marquee).
    /// Stroke width and dash pattern are scaled inversely with zoom.
    fn render_marquee(&mut self, rect: Rect, marquee_color: Color, transform: Affine) {
        self.list.fill(transform, marquee_color.with_alpha(0.1), &rect);
        let dash = 5.0 / self.zoom;
        let stroke = Stroke::new(1.0 / self.zoom).with_dashes(0.0, [dash, dash]);
        self.list.stroke(&stroke, transform, marquee_color, &rect);
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.list.reset();
        self.selection_color = ctx.selection_color;
        self.zoom = ctx.editor.viewport().scale;

        let editor = ctx.editor;
        let scene = editor.scene();
        let selection = editor.selection();
        let transform = ctx.transform();
        let is_selected = |kind: EntityKind, id: &str| selection.contains(&EntityRef::new(kind, id));

        self.begin(Layer::Grid);
        self.render_grid(ctx, transform)?;

        self.begin(Layer::Zones);
        for zone in &scene.zones {
            self.target(zone.entity_ref());
            self.render_zone(zone, is_selected(EntityKind::Zone, &zone.id), transform);
        }

        self.begin(Layer::Frames);
        for frame in &scene.frames {
            self.target(frame.entity_ref());
            self.render_frame(frame, is_selected(EntityKind::Frame, &frame.id), transform);
        }

        self.begin(Layer::Drawings);
        for drawing in &scene.drawings {
            self.target(drawing.entity_ref());
            self.render_drawing(drawing, is_selected(EntityKind::Drawing, &drawing.id), transform);
        }

        self.begin(Layer::Images);
        for image in &scene.images {
            self.target(image.entity_ref());
            self.render_image(image, is_selected(EntityKind::Image, &image.id), transform);
        }

        self.begin(Layer::Stickers);
        for sticker in &scene.stickers {
            self.target(sticker.entity_ref());
            self.render_sticker(sticker, is_selected(EntityKind::Sticker, &sticker.id), transform);
        }

        self.begin(Layer::Nodes);
        for node in &scene.nodes {
            self.target(node.entity_ref());
            self.render_node(node, is_selected(EntityKind::Node, &node.id), transform);
        }

        self.begin(Layer::Edges);
        for edge in &scene.edges {
            self.target(EntityRef::new(EntityKind::Edge, edge.id.clone()));
            self.render_edge(scene, edge, is_selected(EntityKind::Edge, &edge.id), transform);
        }

        self.begin(Layer::Handles);
        if editor.tool() == ToolKind::Pan {
            if let Some(zone) = selection
                .single_of(EntityKind::Zone)
                .and_then(|id| scene.zones.iter().find(|z| z.id == id))
            {
                self.target(zone.entity_ref());
                self.render_zone_handles(zone, transform);
            }
        }
        if let Some(source) = editor.pending_connector() {
            if let Some(bounds) = scene.bounds_of(source) {
                self.target(source.clone());
                self.render_pending_source(bounds, transform);
            }
        }

        self.begin(Layer::Texts);
        for text in &scene.texts {
            self.target(text.entity_ref());
            self.render_text(text, is_selected(EntityKind::Text, &text.id), transform);
        }

        self.begin(Layer::SelectionOutline);
        self.render_multi_selection(scene, selection, transform);

        self.begin(Layer::Marquee);
        if let Some(marquee) = editor.marquee() {
            self.render_marquee(marquee.rect(), ctx.marquee_color, transform);
        }

        log::trace!(
            "Built frame: {} commands, {} selected",
            self.list.len(),
            selection.len()
        );
        Ok(())
    }
}
