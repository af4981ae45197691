//! Scene <-> document conversion.
//!
//! A document is a JSON object with one array per entity kind. Images are
//! stored as data URLs plus placement and decode asynchronously on load
//! (see [`hydrate`]).

pub mod data_url;
pub mod hydrate;

use crate::entities::{Bitmap, Drawing, Edge, Frame, Image, Node, Sticker, Text, Zone};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Codec errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Serialized form of an image entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRecord {
    pub id: String,
    pub data_url: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ImageRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            data_url: String::new(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        }
    }
}

impl ImageRecord {
    /// Serialize a hydrated image back to its record.
    pub fn from_image(image: &Image) -> Self {
        Self {
            id: image.id.clone(),
            data_url: image.data_url.clone(),
            x: image.x,
            y: image.y,
            width: image.width,
            height: image.height,
        }
    }

    /// Attach a decoded bitmap. Placement comes from the record, not the bitmap.
    pub fn into_image(self, bitmap: Bitmap) -> Image {
        Image {
            id: self.id,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            data_url: self.data_url,
            bitmap: Arc::new(bitmap),
        }
    }

    /// Decode the embedded payload.
    pub fn decode(&self) -> CodecResult<Bitmap> {
        let bytes = data_url::decode(&self.data_url)?;
        Ok(Bitmap::decode(&bytes)?)
    }
}

/// The document exchanged with the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub drawings: Vec<Drawing>,
    pub texts: Vec<Text>,
    pub zones: Vec<Zone>,
    pub stickers: Vec<Sticker>,
    pub frames: Vec<Frame>,
    pub images: Vec<ImageRecord>,
}

impl SceneDocument {
    /// Parse a document. Missing arrays come back empty.
    pub fn from_json(json: &str) -> CodecResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CodecResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Snapshot `scene`. `pending` images (still decoding) are written after
    /// the hydrated ones.
    pub fn from_scene(scene: &Scene, pending: &[ImageRecord]) -> Self {
        let images = scene
            .images
            .iter()
            .map(ImageRecord::from_image)
            .chain(pending.iter().cloned())
            .collect();
        Self {
            nodes: scene.nodes.clone(),
            edges: scene.edges.clone(),
            drawings: scene.drawings.clone(),
            texts: scene.texts.clone(),
            zones: scene.zones.clone(),
            stickers: scene.stickers.clone(),
            frames: scene.frames.clone(),
            images,
        }
    }

    /// Split into a scene without images and the image records to hydrate.
    pub fn into_scene(self) -> (Scene, Vec<ImageRecord>) {
        let scene = Scene {
            nodes: self.nodes,
            edges: self.edges,
            drawings: self.drawings,
            texts: self.texts,
            zones: self.zones,
            stickers: self.stickers,
            frames: self.frames,
            images: Vec::new(),
        };
        (scene, self.images)
    }

    /// Number of entities of every kind.
    pub fn entity_count(&self) -> usize {
        self.nodes.len()
            + self.edges.len()
            + self.drawings.len()
            + self.texts.len()
            + self.zones.len()
            + self.stickers.len()
            + self.frames.len()
            + self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ArrowStyle, Entity, EntityKind, EntityRef, LineStyle, NodeShape};
    use kurbo::Point;

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let doc = SceneDocument::from_json(r#"{"nodes":[{"id":"n1","x":5}]}"#).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert!((doc.nodes[0].x - 5.0).abs() < f64::EPSILON);
        assert!((doc.nodes[0].width - 120.0).abs() < f64::EPSILON);
        assert!(doc.edges.is_empty() && doc.images.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            SceneDocument::from_json("{invalid json"),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_styles_survive_export() {
        let json = r#"{
            "nodes":[{"id":"n","shape":"octagon"}],
            "edges":[{"id":"e","from":"n","to":"n","style":"zigzag","arrowStyle":"fancy"}]
        }"#;
        let doc = SceneDocument::from_json(json).unwrap();
        assert_eq!(doc.nodes[0].shape, NodeShape::Other("octagon".into()));
        assert_eq!(doc.edges[0].style.resolved(), LineStyle::Solid);
        assert_eq!(doc.edges[0].arrow_style.resolved(), ArrowStyle::Normal);

        let out = doc.to_json().unwrap();
        assert!(out.contains("\"octagon\""));
        assert!(out.contains("\"zigzag\""));
        assert!(out.contains("\"fancy\""));
    }

    #[test]
    fn test_scene_round_trip() {
        let mut scene = Scene::new();
        let mut node = Node::new(Point::new(10.0, 20.0), "hello", NodeShape::Hexagon);
        node.todo = Some(false);
        let text = Text::new(Point::new(0.0, 50.0), "label", "#fff");
        let mut edge = Edge::new(node.entity_ref(), text.entity_ref());
        edge.control_point = Some(Point::new(3.0, 4.0));
        let mut stroke = Drawing::new(Point::new(1.0, 1.0), "#f00", 3.0);
        stroke.push(Point::new(2.0, 5.0));
        scene.nodes.push(node);
        scene.texts.push(text);
        scene.edges.push(edge);
        scene.drawings.push(stroke);
        scene.zones.push(Zone::new(Point::new(0.0, 0.0), "#0f0"));
        scene.stickers.push(Sticker::new(Point::new(9.0, 9.0)));
        scene.frames.push(Frame::new(Point::new(7.0, 7.0), "#00f"));

        let json = SceneDocument::from_scene(&scene, &[]).to_json().unwrap();
        let (loaded, images) = SceneDocument::from_json(&json).unwrap().into_scene();
        assert!(images.is_empty());
        assert_eq!(loaded, scene);
    }

    #[test]
    fn test_edge_endpoint_kinds_are_written() {
        let edge = Edge::new(
            EntityRef::new(EntityKind::Sticker, "s"),
            EntityRef::new(EntityKind::Zone, "z"),
        );
        let json = serde_json::to_string(&edge).unwrap();
        assert!(json.contains(r#""fromType":"sticker""#));
        assert!(json.contains(r#""toType":"zone""#));
    }

    #[test]
    fn test_pending_images_are_exported() {
        let pending = ImageRecord {
            id: "img_1".into(),
            data_url: "data:image/png;base64,AAAA".into(),
            ..Default::default()
        };
        let doc = SceneDocument::from_scene(&Scene::new(), std::slice::from_ref(&pending));
        assert_eq!(doc.images, vec![pending]);
    }
}
