//! Approximate text metrics and auto-fit sizing.
//!
//! The core has no font stack, so widths are estimated from character count
//! and font size. The estimate is stable, which keeps hit-testing and layout
//! deterministic across hosts.

use crate::entities::NodeShape;
use kurbo::Size;
use std::f64::consts::SQRT_2;

/// Average glyph width as a fraction of the font size (sans-serif).
pub const CHAR_WIDTH_FACTOR: f64 = 0.55;

/// Font size of node labels.
pub const NODE_FONT_SIZE: f64 = 14.0;
/// Nominal height of a node label line.
const NODE_TEXT_HEIGHT: f64 = 20.0;
const NODE_PADDING: f64 = 20.0;
const DIAMOND_PADDING: f64 = 12.0;

/// Font size of sticker text.
pub const STICKER_FONT_SIZE: f64 = 13.0;
/// Inner padding on each side of a sticker.
pub const STICKER_PADDING: f64 = 16.0;
/// Distance between wrapped sticker lines.
pub const STICKER_LINE_HEIGHT: f64 = 18.0;
/// Smallest size a sticker auto-fits to.
pub const STICKER_MIN_SIZE: Size = Size::new(80.0, 60.0);
const STICKER_MAX_WIDTH: f64 = 300.0;

/// Estimated width of a single line of text.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * CHAR_WIDTH_FACTOR
}

/// Size a node needs to fit its label, following the per-shape padding rules.
pub fn fit_node(text: &str, shape: &NodeShape) -> Size {
    let tw = text_width(text, NODE_FONT_SIZE);
    match shape.resolved() {
        NodeShape::Diamond => Size::new(
            ((tw + DIAMOND_PADDING) * SQRT_2).max(50.0),
            ((NODE_TEXT_HEIGHT + DIAMOND_PADDING) * SQRT_2).max(50.0),
        ),
        NodeShape::Circle | NodeShape::Star | NodeShape::Hexagon => {
            let side = (tw.max(NODE_TEXT_HEIGHT) + NODE_PADDING).max(80.0);
            Size::new(side, side)
        }
        _ => Size::new((tw + NODE_PADDING).max(80.0), (NODE_TEXT_HEIGHT + 20.0).max(40.0)),
    }
}

/// Greedy word wrap: the lines `text` occupies at `max_width`.
///
/// A word wider than the line still gets a line of its own.
pub fn wrap_lines(text: &str, font_size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for (i, word) in text.split(' ').enumerate() {
        let candidate = format!("{line}{word} ");
        if i > 0 && text_width(&candidate, font_size) > max_width {
            lines.push(line.trim_end().to_string());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    if !line.trim().is_empty() {
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Size a sticker needs for its text. `current` is kept (at least the
/// minimum) when the sticker is empty.
pub fn fit_sticker(text: &str, current: Size) -> Size {
    if text.is_empty() {
        return Size::new(
            current.width.max(STICKER_MIN_SIZE.width),
            current.height.max(STICKER_MIN_SIZE.height),
        );
    }

    let padding = STICKER_PADDING * 2.0;
    let full_width = text_width(text, STICKER_FONT_SIZE) + padding;
    let (width, height) = if full_width <= STICKER_MAX_WIDTH {
        (full_width.max(STICKER_MIN_SIZE.width), STICKER_LINE_HEIGHT + padding)
    } else {
        let target = (full_width * STICKER_LINE_HEIGHT * 2.0)
            .sqrt()
            .max(STICKER_MIN_SIZE.width)
            .min(STICKER_MAX_WIDTH);
        let lines = wrap_lines(text, STICKER_FONT_SIZE, target - padding).len().max(1);
        (target, lines as f64 * STICKER_LINE_HEIGHT + padding)
    };

    Size::new(
        width.ceil().max(STICKER_MIN_SIZE.width),
        height.max(50.0).ceil().max(STICKER_MIN_SIZE.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_counts_chars_not_bytes() {
        assert!((text_width("Блок", 10.0) - text_width("abcd", 10.0)).abs() < f64::EPSILON);
        assert!((text_width("ab", 10.0) - 11.0).abs() < 1e-10);
    }

    #[test]
    fn test_fit_node_rectangle_minimum() {
        let size = fit_node("Блок", &NodeShape::Rectangle);
        assert!((size.width - 80.0).abs() < f64::EPSILON);
        assert!((size.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_node_grows_with_text() {
        let text = "a fairly long label for a node";
        let size = fit_node(text, &NodeShape::Rectangle);
        assert!((size.width - (text_width(text, NODE_FONT_SIZE) + 20.0)).abs() < 1e-10);
    }

    #[test]
    fn test_fit_node_round_shapes_are_square() {
        for shape in [NodeShape::Circle, NodeShape::Star, NodeShape::Hexagon] {
            let size = fit_node("x", &shape);
            assert!((size.width - size.height).abs() < f64::EPSILON);
            assert!(size.width >= 80.0);
        }
    }

    #[test]
    fn test_fit_node_diamond() {
        let empty = fit_node("", &NodeShape::Diamond);
        assert!((empty.width - 50.0).abs() < f64::EPSILON);
        assert!((empty.height - 50.0).abs() < f64::EPSILON);

        let text = "a diamond label";
        let size = fit_node(text, &NodeShape::Diamond);
        let expected = (text_width(text, NODE_FONT_SIZE) + 12.0) * SQRT_2;
        assert!((size.width - expected).abs() < 1e-10);
    }

    #[test]
    fn test_fit_sticker_empty_keeps_minimum() {
        let size = fit_sticker("", Size::new(10.0, 10.0));
        assert_eq!(size, STICKER_MIN_SIZE);
    }

    #[test]
    fn test_fit_sticker_single_line() {
        let size = fit_sticker("short note", STICKER_MIN_SIZE);
        assert!(size.width >= 80.0 && size.width <= 300.0);
        assert!((size.height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_sticker_wraps_long_text() {
        let text = "word ".repeat(80);
        let size = fit_sticker(text.trim(), STICKER_MIN_SIZE);
        assert!(size.width <= 300.0);
        assert!(size.height > 100.0);
    }

    #[test]
    fn test_wrap_lines() {
        let lines = wrap_lines("aa bb cc", 10.0, 20.0);
        assert_eq!(lines, vec!["aa", "bb", "cc"]);
        let single = wrap_lines("aa bb", 10.0, 1000.0);
        assert_eq!(single, vec!["aa bb"]);
    }
}
