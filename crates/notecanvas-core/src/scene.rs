//! Scene model: typed entity collections, lookup, hit-testing and deletion.

use crate::entities::{
    Drawing, Edge, Entity, EntityKind, EntityRef, Frame, Image, Node, ResizeHandle, Sticker,
    Text, Zone,
};
use crate::geometry::{Side, point_to_quad_dist, point_to_segment_dist, points_bounds, rects_overlap};
use kurbo::{Point, Rect};

/// Hit-test tolerances in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerances {
    pub edge: f64,
    pub curve: f64,
    pub control_point: f64,
    pub drawing: f64,
}

impl Default for HitTolerances {
    fn default() -> Self {
        Self {
            edge: 10.0,
            curve: 15.0,
            control_point: 10.0,
            drawing: 20.0,
        }
    }
}

/// Resolved geometry of an edge whose endpoints both exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub from_center: Point,
    pub to_center: Point,
    /// Where the connector leaves the source outline.
    pub start: Point,
    /// Where the connector meets the target outline.
    pub end: Point,
    pub control: Option<Point>,
}

impl EdgeGeometry {
    /// Distance from `point` to the center-to-center path of the edge.
    pub fn distance(&self, point: Point) -> f64 {
        match self.control {
            Some(ctrl) => point_to_quad_dist(point, self.from_center, ctrl, self.to_center),
            None => point_to_segment_dist(point, self.from_center, self.to_center),
        }
    }

    /// Bounds of the centers and the control point.
    pub fn bounds(&self) -> Rect {
        let mut pts = vec![self.from_center, self.to_center];
        pts.extend(self.control);
        points_bounds(&pts).unwrap_or(Rect::ZERO)
    }
}

fn find<'a, E: Entity>(items: &'a [E], id: &str) -> Option<&'a E> {
    items.iter().find(|e| e.id() == id)
}

fn find_mut<'a, E: Entity>(items: &'a mut [E], id: &str) -> Option<&'a mut E> {
    items.iter_mut().find(|e| e.id() == id)
}

/// Most recently added entity under `point`.
fn topmost<E: Entity>(items: &[E], point: Point, tolerance: f64) -> Option<&E> {
    items.iter().rev().find(|e| e.contains_point(point, tolerance))
}

/// Remove the entity with `id`; `true` if something was removed.
fn remove_by_id<E: Entity>(items: &mut Vec<E>, id: &str) -> bool {
    let before = items.len();
    items.retain(|e| e.id() != id);
    items.len() != before
}

/// All entities of one canvas, stored per kind in insertion (z) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub drawings: Vec<Drawing>,
    pub texts: Vec<Text>,
    pub zones: Vec<Zone>,
    pub stickers: Vec<Sticker>,
    pub frames: Vec<Frame>,
    pub images: Vec<Image>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entities of every kind.
    pub fn len(&self) -> usize {
        self.nodes.len()
            + self.edges.len()
            + self.drawings.len()
            + self.texts.len()
            + self.zones.len()
            + self.stickers.len()
            + self.frames.len()
            + self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        find(&self.nodes, id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        find_mut(&mut self.nodes, id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn zone_mut(&mut self, id: &str) -> Option<&mut Zone> {
        find_mut(&mut self.zones, id)
    }

    pub fn sticker_mut(&mut self, id: &str) -> Option<&mut Sticker> {
        find_mut(&mut self.stickers, id)
    }

    pub fn text_mut(&mut self, id: &str) -> Option<&mut Text> {
        find_mut(&mut self.texts, id)
    }

    pub fn frame_mut(&mut self, id: &str) -> Option<&mut Frame> {
        find_mut(&mut self.frames, id)
    }

    /// Look up a positioned entity. Edges have no standalone geometry and
    /// resolve to `None`; use [`Scene::edge`] for them.
    pub fn entity(&self, r: &EntityRef) -> Option<&dyn Entity> {
        let id = r.id.as_str();
        match r.kind {
            EntityKind::Node => find(&self.nodes, id).map(|e| e as &dyn Entity),
            EntityKind::Drawing => find(&self.drawings, id).map(|e| e as &dyn Entity),
            EntityKind::Text => find(&self.texts, id).map(|e| e as &dyn Entity),
            EntityKind::Zone => find(&self.zones, id).map(|e| e as &dyn Entity),
            EntityKind::Sticker => find(&self.stickers, id).map(|e| e as &dyn Entity),
            EntityKind::Frame => find(&self.frames, id).map(|e| e as &dyn Entity),
            EntityKind::Image => find(&self.images, id).map(|e| e as &dyn Entity),
            EntityKind::Edge => None,
        }
    }

    /// Mutable counterpart of [`Scene::entity`].
    pub fn entity_mut(&mut self, r: &EntityRef) -> Option<&mut dyn Entity> {
        let id = r.id.as_str();
        match r.kind {
            EntityKind::Node => find_mut(&mut self.nodes, id).map(|e| e as &mut dyn Entity),
            EntityKind::Drawing => find_mut(&mut self.drawings, id).map(|e| e as &mut dyn Entity),
            EntityKind::Text => find_mut(&mut self.texts, id).map(|e| e as &mut dyn Entity),
            EntityKind::Zone => find_mut(&mut self.zones, id).map(|e| e as &mut dyn Entity),
            EntityKind::Sticker => find_mut(&mut self.stickers, id).map(|e| e as &mut dyn Entity),
            EntityKind::Frame => find_mut(&mut self.frames, id).map(|e| e as &mut dyn Entity),
            EntityKind::Image => find_mut(&mut self.images, id).map(|e| e as &mut dyn Entity),
            EntityKind::Edge => None,
        }
    }

    /// Whether `r` names a live entity of any kind.
    pub fn contains(&self, r: &EntityRef) -> bool {
        match r.kind {
            EntityKind::Edge => self.edge(&r.id).is_some(),
            _ => self.entity(r).is_some(),
        }
    }

    /// Resolve both endpoints of `edge` and clip the connector to their
    /// outlines. `None` when an endpoint is missing.
    pub fn edge_geometry(&self, edge: &Edge) -> Option<EdgeGeometry> {
        let from = self.entity(&edge.from_ref())?;
        let to = self.entity(&edge.to_ref())?;
        let from_center = from.center();
        let to_center = to.center();
        Some(EdgeGeometry {
            from_center,
            to_center,
            start: from.boundary().clip(from_center, to_center, Side::Near),
            end: to.boundary().clip(from_center, to_center, Side::Far),
            control: edge.control_point,
        })
    }

    /// Axis-aligned bounds of any entity, edges included.
    pub fn bounds_of(&self, r: &EntityRef) -> Option<Rect> {
        match r.kind {
            EntityKind::Edge => {
                let edge = self.edge(&r.id)?;
                Some(self.edge_geometry(edge)?.bounds())
            }
            _ => self.entity(r).map(|e| e.bounds()),
        }
    }

    pub fn origin_of(&self, r: &EntityRef) -> Option<Point> {
        self.entity(r).map(|e| e.origin())
    }

    /// Move an entity's origin. Edges follow their endpoints and are ignored.
    pub fn set_origin(&mut self, r: &EntityRef, origin: Point) {
        if let Some(e) = self.entity_mut(r) {
            e.set_origin(origin);
        }
    }

    /// Every entity reference, back to front per kind.
    pub fn all_refs(&self) -> Vec<EntityRef> {
        let mut refs = Vec::with_capacity(self.len());
        refs.extend(self.zones.iter().map(|e| e.entity_ref()));
        refs.extend(self.frames.iter().map(|e| e.entity_ref()));
        refs.extend(self.drawings.iter().map(|e| e.entity_ref()));
        refs.extend(self.images.iter().map(|e| e.entity_ref()));
        refs.extend(self.stickers.iter().map(|e| e.entity_ref()));
        refs.extend(self.nodes.iter().map(|e| e.entity_ref()));
        refs.extend(
            self.edges
                .iter()
                .map(|e| EntityRef::new(EntityKind::Edge, e.id.clone())),
        );
        refs.extend(self.texts.iter().map(|e| e.entity_ref()));
        refs
    }

    /// Entities (zones excepted) whose bounds overlap `rect`, touching included.
    /// Edges with an unresolved endpoint are skipped.
    pub fn refs_in_rect(&self, rect: Rect) -> Vec<EntityRef> {
        self.all_refs()
            .into_iter()
            .filter(|r| r.kind != EntityKind::Zone)
            .filter(|r| self.bounds_of(r).is_some_and(|b| rects_overlap(b, rect)))
            .collect()
    }

    /// The select tool's hit test: node > sticker > image > edge > drawing >
    /// text > frame. Zones never hit here.
    pub fn hit_test(&self, point: Point, tol: &HitTolerances) -> Option<EntityRef> {
        if let Some(n) = topmost(&self.nodes, point, 0.0) {
            return Some(n.entity_ref());
        }
        if let Some(s) = topmost(&self.stickers, point, 0.0) {
            return Some(s.entity_ref());
        }
        if let Some(i) = topmost(&self.images, point, 0.0) {
            return Some(i.entity_ref());
        }
        if let Some(e) = self.edge_at(point, tol) {
            return Some(EntityRef::new(EntityKind::Edge, e.id.clone()));
        }
        if let Some(d) = self.drawing_at(point, tol.drawing) {
            return Some(d.entity_ref());
        }
        if let Some(t) = topmost(&self.texts, point, 0.0) {
            return Some(t.entity_ref());
        }
        topmost(&self.frames, point, 0.0).map(|f| f.entity_ref())
    }

    /// Connector target under `point`: node > sticker > image > text > frame > zone.
    pub fn connectable_at(&self, point: Point) -> Option<EntityRef> {
        topmost(&self.nodes, point, 0.0)
            .map(|e| e.entity_ref())
            .or_else(|| topmost(&self.stickers, point, 0.0).map(|e| e.entity_ref()))
            .or_else(|| topmost(&self.images, point, 0.0).map(|e| e.entity_ref()))
            .or_else(|| topmost(&self.texts, point, 0.0).map(|e| e.entity_ref()))
            .or_else(|| topmost(&self.frames, point, 0.0).map(|e| e.entity_ref()))
            .or_else(|| topmost(&self.zones, point, 0.0).map(|e| e.entity_ref()))
    }

    /// First edge within tolerance. Curved edges use the Bezier distance.
    pub fn edge_at(&self, point: Point, tol: &HitTolerances) -> Option<&Edge> {
        self.edges.iter().find(|edge| {
            let Some(geom) = self.edge_geometry(edge) else {
                return false;
            };
            let limit = if edge.is_curved() { tol.curve } else { tol.edge };
            geom.distance(point) < limit
        })
    }

    /// Edge whose control point handle is under `point`.
    pub fn control_point_at(&self, point: Point, tolerance: f64) -> Option<&Edge> {
        self.edges.iter().find(|edge| {
            edge.control_point
                .is_some_and(|cp| cp.distance(point) < tolerance)
        })
    }

    /// Stroke with the closest point to `point`, if any is within `tolerance`.
    pub fn drawing_at(&self, point: Point, tolerance: f64) -> Option<&Drawing> {
        self.drawings
            .iter()
            .filter_map(|d| d.nearest_distance(point).map(|dist| (d, dist)))
            .filter(|(_, dist)| *dist < tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(d, _)| d)
    }

    /// Topmost zone containing `point`.
    pub fn zone_at(&self, point: Point) -> Option<&Zone> {
        topmost(&self.zones, point, 0.0)
    }

    /// Zone corner handle within `tolerance` of `point`.
    pub fn zone_handle_at(&self, point: Point, tolerance: f64) -> Option<(&Zone, ResizeHandle)> {
        self.zones
            .iter()
            .rev()
            .find_map(|z| z.handle_at(point, tolerance).map(|h| (z, h)))
    }

    /// Node whose TODO checkbox is under `point`.
    pub fn todo_checkbox_at(&self, point: Point) -> Option<&Node> {
        self.nodes.iter().find(|n| {
            n.todo_checkbox()
                .is_some_and(|r| crate::geometry::rect_contains(r, point))
        })
    }

    /// Delete an entity. Deleting anything but an edge also removes every
    /// edge attached to it. Returns `false` if nothing matched.
    pub fn delete(&mut self, r: &EntityRef) -> bool {
        let id = r.id.as_str();
        let removed = match r.kind {
            EntityKind::Edge => {
                let before = self.edges.len();
                self.edges.retain(|e| e.id != id);
                return self.edges.len() != before;
            }
            EntityKind::Node => remove_by_id(&mut self.nodes, id),
            EntityKind::Drawing => remove_by_id(&mut self.drawings, id),
            EntityKind::Text => remove_by_id(&mut self.texts, id),
            EntityKind::Zone => remove_by_id(&mut self.zones, id),
            EntityKind::Sticker => remove_by_id(&mut self.stickers, id),
            EntityKind::Frame => remove_by_id(&mut self.frames, id),
            EntityKind::Image => remove_by_id(&mut self.images, id),
        };
        if removed {
            let before = self.edges.len();
            self.edges.retain(|e| !e.touches(r));
            let cascaded = before - self.edges.len();
            if cascaded > 0 {
                log::debug!("Deleted {} with {} attached edge(s)", r, cascaded);
            }
        }
        removed
    }

    /// Edges whose endpoints cannot be resolved.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| !self.contains(&e.from_ref()) || !self.contains(&e.to_ref()))
    }
}
