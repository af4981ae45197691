//! Viewport: pan offset and zoom scale.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// The view transform of the canvas.
///
/// Screen coordinates map to scene coordinates as
/// `scene = (screen - offset) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Pan offset in screen pixels.
    pub offset: Vec2,
    /// Zoom scale; 1.0 is 100%.
    pub scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.1,
            max_scale: 3.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A viewport with limits and wheel factors from `config`.
    pub fn with_config(config: &crate::EditorConfig) -> Self {
        Self {
            min_scale: config.min_zoom,
            max_scale: config.max_zoom,
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
            ..Self::default()
        }
    }

    /// Scene to screen transform, for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    /// Inverse of [`Viewport::screen_to_scene`].
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        self.transform() * scene
    }

    /// Pan by a raw screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Apply a wheel step at `cursor`. Positive `delta_y` zooms out.
    /// The scene point under the cursor stays fixed.
    pub fn wheel(&mut self, cursor: Point, delta_y: f64) {
        let factor = if delta_y > 0.0 {
            self.zoom_out_factor
        } else {
            self.zoom_in_factor
        };
        self.zoom_at(cursor, factor);
    }

    /// Multiply the scale by `factor`, clamped, keeping `cursor` fixed.
    pub fn zoom_at(&mut self, cursor: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }
        let ratio = new_scale / self.scale;
        let cursor = cursor.to_vec2();
        self.offset = cursor - (cursor - self.offset) * ratio;
        self.scale = new_scale;
    }

    /// Back to 100% with no pan.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }
}
