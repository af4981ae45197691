//! Selection set, marquee capture and group drags.

use crate::entities::{EntityKind, EntityRef};
use crate::scene::Scene;
use kurbo::{Point, Rect, Vec2};

/// The canonical selection: an ordered set of entity references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<EntityRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.items.iter()
    }

    pub fn contains(&self, r: &EntityRef) -> bool {
        self.items.contains(r)
    }

    /// Add `r` unless it is already selected.
    pub fn add(&mut self, r: EntityRef) {
        if !self.contains(&r) {
            self.items.push(r);
        }
    }

    /// Remove `r`; `true` if it was selected.
    pub fn remove(&mut self, r: &EntityRef) -> bool {
        let before = self.items.len();
        self.items.retain(|s| s != r);
        self.items.len() != before
    }

    /// Flip membership of `r`.
    pub fn toggle(&mut self, r: EntityRef) {
        if !self.remove(&r) {
            self.items.push(r);
        }
    }

    /// Replace the selection with exactly `r`.
    pub fn set(&mut self, r: EntityRef) {
        self.items.clear();
        self.items.push(r);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The selected entity if exactly one is selected.
    pub fn only(&self) -> Option<&EntityRef> {
        match self.items.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    /// Id of the single selected entity, if it is of `kind`.
    pub fn single_of(&self, kind: EntityKind) -> Option<&str> {
        self.only()
            .filter(|r| r.kind == kind)
            .map(|r| r.id.as_str())
    }

    /// Drop references that no longer resolve in `scene`.
    pub fn retain_live(&mut self, scene: &Scene) {
        self.items.retain(|r| scene.contains(r));
    }

    pub fn to_vec(&self) -> Vec<EntityRef> {
        self.items.clone()
    }
}

/// An in-progress rubber-band selection in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub start: Point,
    pub end: Point,
    /// Extend the existing selection instead of replacing it.
    pub additive: bool,
}

impl Marquee {
    pub fn new(start: Point, additive: bool) -> Self {
        Self {
            start,
            end: start,
            additive,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    /// Too small on both axes to count as a drag.
    pub fn is_click(&self, threshold: f64) -> bool {
        let r = self.rect();
        r.width() < threshold && r.height() < threshold
    }
}

/// Origins and pointer offsets captured when a group drag starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupDrag {
    offsets: Vec<(EntityRef, Vec2)>,
}

impl GroupDrag {
    /// Capture every selected entity that has an origin. Edges follow
    /// their endpoints and are skipped.
    pub fn capture(scene: &Scene, selection: &Selection, pointer: Point) -> Self {
        let offsets = selection
            .iter()
            .filter_map(|r| scene.origin_of(r).map(|origin| (r.clone(), pointer - origin)))
            .collect();
        Self { offsets }
    }

    /// Nothing to move, e.g. only edges were selected.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Move every captured entity so it keeps its offset from `pointer`.
    pub fn apply(&self, scene: &mut Scene, pointer: Point) {
        for (r, offset) in &self.offsets {
            scene.set_origin(r, pointer - *offset);
        }
    }
}
