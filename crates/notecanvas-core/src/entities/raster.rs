//! Embedded raster image.

use super::{Entity, EntityKind, new_id};
use kurbo::{Point, Rect, Size};
use std::sync::Arc;

/// Encoded image format, detected from the payload's magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Sniff the format from the leading bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        None
    }
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    /// Decode an encoded image (any format the `image` crate was built with).
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// Scale `source` down to fit a `max` x `max` box, keeping the aspect ratio.
/// Smaller images keep their size.
pub fn fit_within(source: Size, max: f64) -> Size {
    if source.width <= max && source.height <= max {
        return source;
    }
    let ratio = (max / source.width).min(max / source.height);
    Size::new(source.width * ratio, source.height * ratio)
}

/// An image whose bitmap has finished decoding. Images that are still
/// decoding live outside the scene until they are ready.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Self-describing source written back on export.
    pub data_url: String,
    pub bitmap: Arc<Bitmap>,
}

impl Image {
    /// Place a decoded bitmap centered on `center`, scaled to fit `max_size`.
    pub fn place(center: Point, data_url: String, bitmap: Bitmap, max_size: f64) -> Self {
        let size = fit_within(bitmap.size(), max_size);
        Self {
            id: new_id(EntityKind::Image),
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
            data_url,
            bitmap: Arc::new(bitmap),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

impl Entity for Image {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Image
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_magic_bytes() {
        let png = tiny_png();
        assert_eq!(ImageFormat::from_magic_bytes(&png), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"nope"), None);
    }

    #[test]
    fn test_decode_bitmap() {
        let bitmap = Bitmap::decode(&tiny_png()).unwrap();
        assert_eq!((bitmap.width, bitmap.height), (4, 2));
        assert_eq!(bitmap.rgba.len(), 4 * 2 * 4);
        assert_eq!(&bitmap.rgba[0..4], &[255, 0, 0, 255]);
        assert!(Bitmap::decode(b"not an image").is_err());
    }

    #[test]
    fn test_fit_within() {
        let small = fit_within(Size::new(100.0, 50.0), 400.0);
        assert_eq!(small, Size::new(100.0, 50.0));
        let wide = fit_within(Size::new(800.0, 200.0), 400.0);
        assert!((wide.width - 400.0).abs() < f64::EPSILON);
        assert!((wide.height - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_place_centers_image() {
        let bitmap = Bitmap::decode(&tiny_png()).unwrap();
        let img = Image::place(Point::new(10.0, 10.0), String::new(), bitmap, 400.0);
        assert_eq!(img.rect(), Rect::new(8.0, 9.0, 12.0, 11.0));
        assert!(img.id.starts_with("img_"));
    }
}
