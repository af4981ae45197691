//! The canvas editor: tool state machine, selection and document lifecycle.
//!
//! All methods run synchronously on the host's UI thread. The only
//! background work is image decoding, which reports back through
//! [`Editor::poll_images`].

use crate::camera::Viewport;
use crate::codec::data_url;
use crate::codec::hydrate::ImageHydrator;
use crate::codec::{CodecResult, SceneDocument};
use crate::config::EditorConfig;
use crate::entities::{
    ArrowStyle, Bitmap, Drawing, Entity, EntityKind, EntityRef, Frame, Image, LineStyle, Node,
    NodeShape, ResizeHandle, Sticker, Text, Zone,
};
use crate::input::{InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::scene::Scene;
use crate::selection::{GroupDrag, Marquee, Selection};
use crate::tools::{ToolDefaults, ToolError, ToolKind, ToolManager};
use kurbo::{Point, Size, Vec2};
use std::time::Duration;

/// Label given to new nodes.
pub const DEFAULT_NODE_TEXT: &str = "Блок";
/// Content given to new free texts.
pub const DEFAULT_TEXT: &str = "Текст";

/// What an inline edit prompt changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditKind {
    NodeText,
    TextContent,
    ZoneTitle,
    StickerText,
    FrameTitle,
}

/// A request for the host to prompt the user for a string.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditRequest {
    pub target: EntityRef,
    pub kind: TextEditKind,
    /// Value to pre-fill.
    pub current: String,
}

/// Statistics passed to the change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub entity_count: usize,
}

/// Host callback fired after each presented frame.
pub type ChangeCallback = Box<dyn FnMut(&ChangeSummary)>;

/// The pointer interaction in progress between a down and an up.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Pan,
    Stroke(String),
    Marquee(Marquee),
    Move(GroupDrag),
    ControlPoint(String),
    ZoneMove { id: String, offset: Vec2 },
    ZoneResize { id: String, handle: ResizeHandle },
}

/// An interactive canvas over one [`Scene`].
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    viewport: Viewport,
    selection: Selection,
    tools: ToolManager,
    input: InputState,
    gesture: Gesture,
    hydrator: ImageHydrator,
    text_edit: Option<TextEditRequest>,
    needs_redraw: bool,
    on_change: Option<ChangeCallback>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// An empty editor using `config`.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            viewport: Viewport::with_config(&config),
            hydrator: ImageHydrator::new(config.background_decode),
            config,
            scene: Scene::new(),
            selection: Selection::new(),
            tools: ToolManager::new(),
            input: InputState::new(),
            gesture: Gesture::Idle,
            text_edit: None,
            needs_redraw: true,
            on_change: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Direct viewport access for hosts that drive zoom themselves.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        self.needs_redraw = true;
        &mut self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The active tool.
    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn tool_defaults(&self) -> &ToolDefaults {
        &self.tools.defaults
    }

    /// Source entity captured by a connector tool, awaiting its target.
    pub fn pending_connector(&self) -> Option<&EntityRef> {
        self.tools.pending()
    }

    /// The rubber band being dragged, if any.
    pub fn marquee(&self) -> Option<&Marquee> {
        match &self.gesture {
            Gesture::Marquee(m) => Some(m),
            _ => None,
        }
    }

    /// The open inline edit prompt, if any.
    pub fn text_edit(&self) -> Option<&TextEditRequest> {
        self.text_edit.as_ref()
    }

    // ---- change notification ----

    /// Register the callback fired once per presented frame.
    pub fn on_change(&mut self, callback: impl FnMut(&ChangeSummary) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Whether state changed since the last presented frame.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Called by the renderer after drawing a frame. Clears the redraw flag
    /// and notifies the host.
    pub fn frame_presented(&mut self) {
        self.needs_redraw = false;
        let summary = self.change_summary();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&summary);
        }
    }

    pub fn change_summary(&self) -> ChangeSummary {
        ChangeSummary {
            node_count: self.scene.nodes.len(),
            edge_count: self.scene.edges.len(),
            entity_count: self.scene.len(),
        }
    }

    // ---- pointer & keyboard ----

    /// Dispatch a pointer event to the matching handler.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Scroll { position, delta } => self.wheel(position, delta.y),
            PointerEvent::DoubleClick { position } => self.double_click(position),
        }
    }

    /// Primary entry point for presses. `screen` is in viewport pixels.
    pub fn pointer_down(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) {
        self.input.handle_pointer_event(&PointerEvent::Down {
            position: screen,
            button,
            modifiers,
        });
        let point = self.viewport.screen_to_scene(screen);
        let tool = self.tools.current_tool;

        if tool == ToolKind::Select && button == MouseButton::Left {
            if let Some(node) = self.scene.todo_checkbox_at(point).map(|n| n.id.clone()) {
                if let Some(node) = self.scene.node_mut(&node) {
                    node.toggle_todo();
                }
                self.needs_redraw = true;
                return;
            }
        }

        if button == MouseButton::Right || tool == ToolKind::Pan {
            if tool == ToolKind::Pan && button == MouseButton::Left && self.grab_zone(point) {
                return;
            }
            self.gesture = Gesture::Pan;
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        match tool {
            ToolKind::Select => self.select_down(point, modifiers),
            ToolKind::Pencil => {
                let d = &self.tools.defaults;
                let stroke = Drawing::new(point, &d.line_color, d.line_width);
                self.gesture = Gesture::Stroke(stroke.id.clone());
                self.add_entity(stroke, |s, e| s.drawings.push(e));
            }
            ToolKind::Node => {
                let d = &self.tools.defaults;
                let node = Node::new(point, DEFAULT_NODE_TEXT, d.node_shape.clone())
                    .with_colors(&d.fill_color, &d.stroke_color);
                self.add_entity(node, |s, e| s.nodes.push(e));
            }
            ToolKind::Text => {
                let text = Text::new(point, DEFAULT_TEXT, &self.tools.defaults.line_color);
                let request = TextEditRequest {
                    target: text.entity_ref(),
                    kind: TextEditKind::TextContent,
                    current: text.text.clone(),
                };
                self.add_entity(text, |s, e| s.texts.push(e));
                self.text_edit = Some(request);
            }
            ToolKind::Zone => {
                let zone = Zone::new(point, &self.tools.defaults.line_color);
                self.add_entity(zone, |s, e| s.zones.push(e));
            }
            ToolKind::Sticker => {
                let sticker = Sticker::new(point);
                let request = TextEditRequest {
                    target: sticker.entity_ref(),
                    kind: TextEditKind::StickerText,
                    current: String::new(),
                };
                self.add_entity(sticker, |s, e| s.stickers.push(e));
                self.text_edit = Some(request);
            }
            ToolKind::Frame => {
                let frame = Frame::new(point, &self.tools.defaults.line_color);
                self.add_entity(frame, |s, e| s.frames.push(e));
            }
            ToolKind::Line | ToolKind::Arrow | ToolKind::CurvedArrow => self.connect_at(point),
            ToolKind::Pan => {}
        }
    }

    /// Insert a freshly created entity and select it.
    fn add_entity<E: Entity>(&mut self, entity: E, insert: impl FnOnce(&mut Scene, E)) {
        let r = entity.entity_ref();
        log::debug!("Created {}", r);
        insert(&mut self.scene, entity);
        self.selection.set(r);
        self.needs_redraw = true;
    }

    /// Pan tool: start resizing or moving the zone under `point`.
    fn grab_zone(&mut self, point: Point) -> bool {
        let tolerance = self.config.resize_handle_tolerance;
        if let Some((zone, handle)) = self.scene.zone_handle_at(point, tolerance) {
            self.selection.set(zone.entity_ref());
            self.gesture = Gesture::ZoneResize {
                id: zone.id.clone(),
                handle,
            };
            self.needs_redraw = true;
            return true;
        }
        if let Some(zone) = self.scene.zone_at(point) {
            self.selection.set(zone.entity_ref());
            self.gesture = Gesture::ZoneMove {
                id: zone.id.clone(),
                offset: point - zone.origin(),
            };
            self.needs_redraw = true;
            return true;
        }
        false
    }

    fn connect_at(&mut self, point: Point) {
        let Some(target) = self.scene.connectable_at(point) else {
            return;
        };
        self.needs_redraw = true;
        let Some((from, to)) = self.tools.capture_endpoint(target) else {
            return;
        };
        let centers = self
            .scene
            .entity(&from)
            .map(|e| e.center())
            .zip(self.scene.entity(&to).map(|e| e.center()));
        let Some((from_center, to_center)) = centers else {
            log::warn!("Connector endpoint vanished before {} -> {} was created", from, to);
            return;
        };
        let edge = self.tools.defaults.connector(
            self.tools.current_tool,
            from,
            to,
            from_center,
            to_center,
        );
        log::debug!("Created edge {} ({} -> {})", edge.id, edge.from_ref(), edge.to_ref());
        self.scene.edges.push(edge);
        self.selection.clear();
    }

    fn select_down(&mut self, point: Point, modifiers: Modifiers) {
        let toggle = modifiers.toggles_selection();
        let tol = self.config.hit_tolerances();
        self.needs_redraw = true;

        if let Some(edge) = self.scene.control_point_at(point, tol.control_point) {
            let id = edge.id.clone();
            if !toggle {
                self.selection.clear();
            }
            self.selection.add(EntityRef::new(EntityKind::Edge, id.clone()));
            self.gesture = Gesture::ControlPoint(id);
            return;
        }

        match self.scene.hit_test(point, &tol) {
            Some(hit) if toggle => self.selection.toggle(hit),
            Some(hit) => {
                if !self.selection.contains(&hit) {
                    self.selection.set(hit);
                }
                let drag = GroupDrag::capture(&self.scene, &self.selection, point);
                if !drag.is_empty() {
                    self.gesture = Gesture::Move(drag);
                }
            }
            None => {
                if !toggle {
                    self.selection.clear();
                }
                self.gesture = Gesture::Marquee(Marquee::new(point, toggle));
            }
        }
    }

    /// Continue the gesture started by the last press.
    pub fn pointer_move(&mut self, screen: Point) {
        self.input
            .handle_pointer_event(&PointerEvent::Move { position: screen });
        let point = self.viewport.screen_to_scene(screen);

        match &mut self.gesture {
            Gesture::Idle => return,
            Gesture::Pan => self.viewport.pan(self.input.pointer_delta()),
            Gesture::Stroke(id) => {
                if let Some(d) = self.scene.drawings.iter_mut().find(|d| d.id == *id) {
                    d.push(point);
                }
            }
            Gesture::Marquee(m) => m.end = point,
            Gesture::Move(drag) => drag.apply(&mut self.scene, point),
            Gesture::ControlPoint(id) => {
                if let Some(edge) = self.scene.edge_mut(id) {
                    edge.control_point = Some(point);
                }
            }
            Gesture::ZoneMove { id, offset } => {
                if let Some(zone) = self.scene.zone_mut(id) {
                    zone.set_origin(point - *offset);
                }
            }
            Gesture::ZoneResize { id, handle } => {
                if let Some(zone) = self.scene.zone_mut(id) {
                    zone.resize(*handle, point, self.config.zone_min_size);
                }
            }
        }
        self.needs_redraw = true;
    }

    /// Finish the current gesture.
    pub fn pointer_up(&mut self, screen: Point, button: MouseButton) {
        self.input.handle_pointer_event(&PointerEvent::Up {
            position: screen,
            button,
        });
        let point = self.viewport.screen_to_scene(screen);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return,
            Gesture::Marquee(mut m) => {
                m.end = point;
                self.finish_marquee(&m);
            }
            _ => {}
        }
        self.needs_redraw = true;
    }

    fn finish_marquee(&mut self, marquee: &Marquee) {
        if marquee.is_click(self.config.marquee_threshold) {
            return;
        }
        if !marquee.additive {
            self.selection.clear();
        }
        for r in self.scene.refs_in_rect(marquee.rect()) {
            self.selection.add(r);
        }
    }

    /// Select tool: edit the label of the single selected object, or toggle
    /// the curve of a selected edge at the click location.
    pub fn double_click(&mut self, screen: Point) {
        if self.tools.current_tool != ToolKind::Select {
            return;
        }
        let point = self.viewport.screen_to_scene(screen);
        let Some(target) = self.selection.only().cloned() else {
            return;
        };
        let request = match target.kind {
            EntityKind::Node => self
                .scene
                .node(&target.id)
                .map(|n| (TextEditKind::NodeText, n.text.clone())),
            EntityKind::Text => self
                .scene
                .texts
                .iter()
                .find(|t| t.id == target.id)
                .map(|t| (TextEditKind::TextContent, t.text.clone())),
            EntityKind::Zone => self
                .scene
                .zones
                .iter()
                .find(|z| z.id == target.id)
                .map(|z| (TextEditKind::ZoneTitle, z.title.clone())),
            EntityKind::Sticker => self
                .scene
                .stickers
                .iter()
                .find(|s| s.id == target.id)
                .map(|s| (TextEditKind::StickerText, s.text.clone())),
            EntityKind::Frame => self
                .scene
                .frames
                .iter()
                .find(|f| f.id == target.id)
                .map(|f| (TextEditKind::FrameTitle, f.title.clone())),
            EntityKind::Edge => {
                if let Some(edge) = self.scene.edge_mut(&target.id) {
                    edge.control_point = match edge.control_point {
                        Some(_) => None,
                        None => Some(point),
                    };
                    self.needs_redraw = true;
                }
                None
            }
            EntityKind::Drawing | EntityKind::Image => None,
        };
        if let Some((kind, current)) = request {
            self.text_edit = Some(TextEditRequest {
                target,
                kind,
                current,
            });
        }
    }

    /// Answer the open edit prompt. `None` cancels it.
    pub fn commit_text_edit(&mut self, value: Option<String>) {
        let Some(request) = self.text_edit.take() else {
            return;
        };
        let Some(value) = value else {
            return;
        };
        let id = request.target.id.as_str();
        match request.kind {
            TextEditKind::NodeText => {
                if let Some(node) = self.scene.node_mut(id) {
                    node.text = value;
                    node.fit_to_text();
                }
            }
            TextEditKind::TextContent => {
                if let Some(text) = self.scene.text_mut(id) {
                    text.text = value;
                }
            }
            TextEditKind::ZoneTitle => {
                if let Some(zone) = self.scene.zone_mut(id) {
                    zone.title = value;
                }
            }
            TextEditKind::StickerText => {
                if let Some(sticker) = self.scene.sticker_mut(id) {
                    sticker.text = value;
                    sticker.fit_to_text();
                }
            }
            TextEditKind::FrameTitle => {
                if let Some(frame) = self.scene.frame_mut(id) {
                    frame.title = value;
                }
            }
        }
        self.needs_redraw = true;
    }

    /// Zoom around the cursor.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        self.input.handle_pointer_event(&PointerEvent::Scroll {
            position: screen,
            delta: Vec2::new(0.0, delta_y),
        });
        self.viewport.wheel(screen, delta_y);
        self.needs_redraw = true;
    }

    /// Returns `true` if the key was handled.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        match event.key {
            Key::Delete | Key::Backspace => {
                self.delete_selected();
                true
            }
            Key::Character('a' | 'A') if event.modifiers.command() => {
                self.select_all();
                true
            }
            Key::Escape => {
                self.tools.cancel();
                self.selection.clear();
                self.gesture = Gesture::Idle;
                self.needs_redraw = true;
                true
            }
            Key::Character(_) => false,
        }
    }

    // ---- UI-binding setters ----

    /// Switch tools by name, e.g. `"curved-arrow"`.
    pub fn set_tool(&mut self, name: &str) -> Result<(), ToolError> {
        let tool = name.parse::<ToolKind>().inspect_err(|e| log::warn!("{}", e))?;
        self.set_tool_kind(tool);
        Ok(())
    }

    /// Switch tools; the pending connector capture is dropped.
    pub fn set_tool_kind(&mut self, tool: ToolKind) {
        log::debug!("Tool: {} -> {}", self.tools.current_tool, tool);
        self.tools.set_tool(tool);
        self.gesture = Gesture::Idle;
        self.needs_redraw = true;
    }

    /// Line color for new strokes, edges, texts, zones and frames, and the
    /// outline of new nodes.
    pub fn set_stroke_color(&mut self, color: &str) {
        self.tools.defaults.line_color = color.to_string();
        self.tools.defaults.stroke_color = color.to_string();
    }

    /// Fill for new nodes.
    pub fn set_fill_color(&mut self, color: &str) {
        self.tools.defaults.fill_color = color.to_string();
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.tools.defaults.line_width = width;
    }

    /// Line style for new edges.
    pub fn set_line_style(&mut self, style: LineStyle) {
        self.tools.defaults.line_style = style;
    }

    /// Arrowhead for new arrow and curved-arrow edges.
    pub fn set_arrow_style(&mut self, style: ArrowStyle) {
        self.tools.defaults.arrow_style = style;
    }

    /// Shape for new nodes. A single selected node is reshaped too.
    pub fn set_node_shape(&mut self, shape: NodeShape) {
        if let Some(id) = self.selection.single_of(EntityKind::Node).map(str::to_string) {
            if let Some(node) = self.scene.node_mut(&id) {
                node.shape = shape.clone();
                node.fit_to_text();
                self.needs_redraw = true;
            }
        }
        self.tools.defaults.node_shape = shape;
    }

    // ---- actions ----

    /// Delete everything selected, with the edges attached to it.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let mut removed = 0;
        for r in self.selection.to_vec() {
            if self.scene.delete(&r) {
                removed += 1;
            }
        }
        self.selection.retain_live(&self.scene);
        log::debug!("Deleted {} selected entities", removed);
        self.needs_redraw = true;
    }

    /// Select every entity, zones and edges included.
    pub fn select_all(&mut self) {
        self.selection.clear();
        for r in self.scene.all_refs() {
            self.selection.add(r);
        }
        self.needs_redraw = true;
    }

    /// Flip the TODO flag of the single selected node. An absent flag
    /// becomes `true`.
    pub fn toggle_todo(&mut self) -> bool {
        let Some(id) = self.selection.single_of(EntityKind::Node).map(str::to_string) else {
            return false;
        };
        let Some(node) = self.scene.node_mut(&id) else {
            return false;
        };
        node.toggle_todo();
        self.needs_redraw = true;
        true
    }

    /// Insert an encoded image centered in a viewport of `viewport_size`
    /// screen pixels, and select it.
    pub fn insert_image(&mut self, bytes: &[u8], viewport_size: Size) -> CodecResult<EntityRef> {
        let bitmap = Bitmap::decode(bytes)?;
        let center = self.viewport.screen_to_scene(Point::new(
            viewport_size.width / 2.0,
            viewport_size.height / 2.0,
        ));
        let image = Image::place(
            center,
            data_url::encode(bytes),
            bitmap,
            self.config.image_max_size,
        );
        let r = image.entity_ref();
        self.add_entity(image, |s, e| s.images.push(e));
        Ok(r)
    }

    // ---- document lifecycle ----

    /// Replace the scene with a JSON document. Malformed input is logged
    /// and leaves an empty scene.
    pub fn load(&mut self, json: &str) {
        match SceneDocument::from_json(json) {
            Ok(document) => self.load_document(document),
            Err(e) => {
                log::error!("Failed to load canvas document: {}", e);
                self.reset();
            }
        }
    }

    /// Replace the scene. Images appear once their decode completes.
    pub fn load_document(&mut self, document: SceneDocument) {
        log::info!(
            "Loading canvas: {} nodes, {} edges, {} entities, {} images",
            document.nodes.len(),
            document.edges.len(),
            document.entity_count(),
            document.images.len()
        );
        let (scene, images) = document.into_scene();
        self.clear_interaction();
        self.scene = scene;
        let dangling = self.scene.dangling_edges().count();
        if dangling > 0 {
            log::warn!("Document has {} edge(s) with unresolved endpoints", dangling);
        }
        self.hydrator.begin(images);
        self.needs_redraw = true;
    }

    /// Empty the scene and drop any in-flight image decodes.
    pub fn reset(&mut self) {
        self.clear_interaction();
        self.scene.clear();
        self.hydrator.cancel();
        self.needs_redraw = true;
    }

    fn clear_interaction(&mut self) {
        self.selection.clear();
        self.tools.cancel();
        self.gesture = Gesture::Idle;
        self.text_edit = None;
    }

    /// Snapshot the scene, including images still being decoded.
    pub fn export(&self) -> SceneDocument {
        SceneDocument::from_scene(&self.scene, self.hydrator.pending())
    }

    pub fn export_json(&self) -> CodecResult<String> {
        self.export().to_json()
    }

    /// Move finished image decodes into the scene. Returns how many arrived.
    pub fn poll_images(&mut self) -> usize {
        let ready = self.hydrator.poll();
        self.adopt_images(ready)
    }

    /// Like [`Editor::poll_images`] but blocks until outstanding decodes
    /// report or `timeout` passes.
    pub fn wait_for_images(&mut self, timeout: Duration) -> usize {
        let ready = self.hydrator.wait(timeout);
        self.adopt_images(ready)
    }

    /// Images of the current document still decoding (or that failed to).
    pub fn pending_images(&self) -> usize {
        self.hydrator.pending().len()
    }

    fn adopt_images(&mut self, ready: Vec<Image>) -> usize {
        let count = ready.len();
        if count > 0 {
            self.scene.images.extend(ready);
            self.needs_redraw = true;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor {
        Editor::new(EditorConfig {
            background_decode: false,
            ..Default::default()
        })
    }

    fn click(editor: &mut Editor, at: Point) {
        editor.pointer_down(at, MouseButton::Left, Modifiers::NONE);
        editor.pointer_up(at, MouseButton::Left);
    }

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        }
    }

    #[test]
    fn test_node_tool_creates_and_selects() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        ed.set_fill_color("#111111");
        click(&mut ed, Point::new(100.0, 100.0));
        let node = &ed.scene().nodes[0];
        assert_eq!(node.text, DEFAULT_NODE_TEXT);
        assert_eq!(node.fill_color, "#111111");
        assert_eq!(ed.selection().single_of(EntityKind::Node), Some(node.id.as_str()));
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let mut ed = editor();
        assert!(ed.set_tool("laser").is_err());
        assert_eq!(ed.tool(), ToolKind::Select);
    }

    #[test]
    fn test_connector_two_phase_capture() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("line").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        assert!(ed.pending_connector().is_some());
        click(&mut ed, Point::new(100.0, 100.0));
        assert!(ed.scene().edges.is_empty());
        click(&mut ed, Point::new(500.0, 500.0));
        assert!(ed.scene().edges.is_empty());
        click(&mut ed, Point::new(300.0, 100.0));
        assert_eq!(ed.scene().edges.len(), 1);
        assert_eq!(ed.scene().edges[0].arrow_style, ArrowStyle::None);
        assert!(ed.pending_connector().is_none());
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn test_switching_tools_drops_capture() {
        let mut ed = editor();
        ed.set_tool("sticker").unwrap();
        click(&mut ed, Point::new(0.0, 0.0));
        ed.commit_text_edit(None);
        ed.set_tool("arrow").unwrap();
        click(&mut ed, Point::new(0.0, 0.0));
        assert!(ed.pending_connector().is_some());
        ed.set_tool("arrow").unwrap();
        assert!(ed.pending_connector().is_none());
    }

    #[test]
    fn test_text_tool_opens_prompt() {
        let mut ed = editor();
        ed.set_tool("text").unwrap();
        click(&mut ed, Point::new(10.0, 10.0));
        let request = ed.text_edit().unwrap().clone();
        assert_eq!(request.kind, TextEditKind::TextContent);
        assert_eq!(request.current, DEFAULT_TEXT);
        ed.commit_text_edit(Some(String::new()));
        assert_eq!(ed.scene().texts.len(), 1);
        assert_eq!(ed.scene().texts[0].text, "");
        assert!(ed.text_edit().is_none());
    }

    #[test]
    fn test_dragging_lone_edge_moves_nothing() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("line").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("select").unwrap();
        let before = ed.scene().clone();

        ed.pointer_down(Point::new(200.0, 102.0), MouseButton::Left, Modifiers::NONE);
        ed.pointer_move(Point::new(240.0, 160.0));
        ed.pointer_up(Point::new(240.0, 160.0), MouseButton::Left);
        assert_eq!(ed.selection().only().map(|r| r.kind), Some(EntityKind::Edge));
        assert_eq!(ed.scene(), &before);
    }

    #[test]
    fn test_delete_selected_drops_cascaded_edges_from_selection() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("arrow").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("select").unwrap();
        ed.select_all();
        assert_eq!(ed.selection().len(), 3);
        ed.delete_selected();
        assert!(ed.scene().is_empty());
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn test_ctrl_click_toggles_selection() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("select").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        ed.pointer_down(Point::new(300.0, 100.0), MouseButton::Left, ctrl());
        ed.pointer_up(Point::new(300.0, 100.0), MouseButton::Left);
        assert_eq!(ed.selection().len(), 2);
        ed.pointer_down(Point::new(100.0, 100.0), MouseButton::Left, ctrl());
        ed.pointer_up(Point::new(100.0, 100.0), MouseButton::Left);
        assert_eq!(ed.selection().len(), 1);
    }

    #[test]
    fn test_click_on_member_keeps_multi_selection() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("select").unwrap();
        ed.select_all();
        click(&mut ed, Point::new(300.0, 100.0));
        assert_eq!(ed.selection().len(), 2);
        click(&mut ed, Point::new(700.0, 700.0));
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn test_todo_checkbox_click() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        assert!(ed.toggle_todo());
        assert_eq!(ed.scene().nodes[0].todo, Some(true));
        ed.set_tool("select").unwrap();
        let checkbox = ed.scene().nodes[0].todo_checkbox().unwrap();
        click(&mut ed, checkbox.center());
        assert_eq!(ed.scene().nodes[0].todo, Some(false));
    }

    #[test]
    fn test_double_click_toggles_edge_curve() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("line").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        click(&mut ed, Point::new(300.0, 100.0));
        ed.set_tool("select").unwrap();
        click(&mut ed, Point::new(200.0, 102.0));
        assert_eq!(ed.selection().only().map(|r| r.kind), Some(EntityKind::Edge));
        ed.double_click(Point::new(200.0, 102.0));
        assert_eq!(ed.scene().edges[0].control_point, Some(Point::new(200.0, 102.0)));

        // Drag the handle
        ed.pointer_down(Point::new(200.0, 102.0), MouseButton::Left, Modifiers::NONE);
        ed.pointer_move(Point::new(200.0, 180.0));
        ed.pointer_up(Point::new(200.0, 180.0), MouseButton::Left);
        assert_eq!(ed.scene().edges[0].control_point, Some(Point::new(200.0, 180.0)));

        ed.double_click(Point::new(200.0, 140.0));
        assert!(ed.scene().edges[0].control_point.is_none());
    }

    #[test]
    fn test_double_click_node_edits_and_refits() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        ed.set_tool("select").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        ed.double_click(Point::new(100.0, 100.0));
        assert_eq!(ed.text_edit().map(|r| r.kind), Some(TextEditKind::NodeText));
        ed.commit_text_edit(Some("a much longer label for this node".into()));
        let node = &ed.scene().nodes[0];
        assert!(node.width > 80.0);
        assert!((node.rect().center().x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_pan_tool_moves_and_resizes_zones() {
        let mut ed = editor();
        ed.set_tool("zone").unwrap();
        click(&mut ed, Point::new(100.0, 75.0));
        ed.set_tool("pan").unwrap();

        ed.pointer_down(Point::new(100.0, 75.0), MouseButton::Left, Modifiers::NONE);
        ed.pointer_move(Point::new(110.0, 85.0));
        ed.pointer_up(Point::new(110.0, 85.0), MouseButton::Left);
        assert_eq!(ed.scene().zones[0].origin(), Point::new(10.0, 10.0));

        ed.pointer_down(Point::new(210.0, 160.0), MouseButton::Left, Modifiers::NONE);
        ed.pointer_move(Point::new(0.0, 0.0));
        ed.pointer_up(Point::new(0.0, 0.0), MouseButton::Left);
        let zone = &ed.scene().zones[0];
        assert!((zone.width - 50.0).abs() < f64::EPSILON);
        assert!((zone.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(zone.origin(), Point::new(10.0, 10.0));

        // Empty space pans the view
        ed.pointer_down(Point::new(500.0, 500.0), MouseButton::Left, Modifiers::NONE);
        ed.pointer_move(Point::new(520.0, 510.0));
        ed.pointer_up(Point::new(520.0, 510.0), MouseButton::Left);
        assert_eq!(ed.viewport().offset, Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_right_drag_pans_in_any_tool() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        ed.pointer_down(Point::new(0.0, 0.0), MouseButton::Right, Modifiers::NONE);
        ed.pointer_move(Point::new(-30.0, 40.0));
        ed.pointer_up(Point::new(-30.0, 40.0), MouseButton::Right);
        assert!(ed.scene().nodes.is_empty());
        assert_eq!(ed.viewport().offset, Vec2::new(-30.0, 40.0));
    }

    #[test]
    fn test_pencil_stroke() {
        let mut ed = editor();
        ed.set_tool("pencil").unwrap();
        ed.set_stroke_color("#ff0000");
        ed.pointer_down(Point::new(0.0, 0.0), MouseButton::Left, Modifiers::NONE);
        ed.pointer_move(Point::new(5.0, 5.0));
        ed.pointer_move(Point::new(10.0, 5.0));
        ed.pointer_up(Point::new(10.0, 5.0), MouseButton::Left);
        ed.pointer_move(Point::new(50.0, 50.0));
        let stroke = &ed.scene().drawings[0];
        assert_eq!(stroke.points.len(), 3);
        assert_eq!(stroke.color, "#ff0000");
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut ed = editor();
        ed.set_tool("frame").unwrap();
        click(&mut ed, Point::new(0.0, 0.0));
        ed.set_tool("zone").unwrap();
        click(&mut ed, Point::new(500.0, 0.0));
        ed.selection.clear();

        let select_all = KeyEvent::new(Key::Character('a')).with_modifiers(ctrl());
        assert!(ed.key_down(&select_all));
        assert_eq!(ed.selection().len(), 2);
        assert!(!ed.key_down(&KeyEvent::new(Key::Character('a'))));
        assert!(ed.key_down(&KeyEvent::new(Key::Escape)));
        assert!(ed.selection().is_empty());
        ed.select_all();
        assert!(ed.key_down(&KeyEvent::new(Key::Delete)));
        assert!(ed.scene().is_empty());
    }

    #[test]
    fn test_set_node_shape_reshapes_selected_node() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(100.0, 100.0));
        ed.set_node_shape(NodeShape::Circle);
        let node = &ed.scene().nodes[0];
        assert_eq!(node.shape, NodeShape::Circle);
        assert!((node.width - node.height).abs() < f64::EPSILON);
        assert_eq!(ed.tool_defaults().node_shape, NodeShape::Circle);
    }

    #[test]
    fn test_change_callback_fires_per_frame() {
        let mut ed = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ed.on_change(move |s| sink.borrow_mut().push(*s));
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(0.0, 0.0));
        assert!(ed.needs_redraw());
        ed.frame_presented();
        assert!(!ed.needs_redraw());
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].node_count, 1);
    }

    #[test]
    fn test_load_garbage_resets() {
        let mut ed = editor();
        ed.set_tool("node").unwrap();
        click(&mut ed, Point::new(0.0, 0.0));
        ed.load("{invalid json");
        assert!(ed.scene().is_empty());
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn test_insert_image_centers_in_viewport() {
        let img = image::RgbaImage::from_pixel(800, 400, image::Rgba([1, 2, 3, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let mut ed = editor();
        let r = ed
            .insert_image(bytes.get_ref(), Size::new(1000.0, 600.0))
            .unwrap();
        assert_eq!(ed.selection().only(), Some(&r));
        let image = &ed.scene().images[0];
        assert!((image.width - 400.0).abs() < 1e-9);
        assert!((image.height - 200.0).abs() < 1e-9);
        assert_eq!(image.rect().center(), Point::new(500.0, 300.0));
        assert!(image.data_url.starts_with("data:image/png;base64,"));

        assert!(ed.insert_image(b"nope", Size::new(10.0, 10.0)).is_err());
    }
}
