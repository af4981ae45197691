//! Renderer trait abstraction.

use kurbo::{Affine, Size};
use notecanvas_core::Editor;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid.
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only intersection dots.
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Lines,
            GridStyle::Lines => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Lines => "Lines",
            GridStyle::Dots => "Dots",
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The editor to render.
    pub editor: &'a Editor,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub background_color: Color,
    pub grid_style: GridStyle,
    pub grid_color: Color,
    /// Highlight for selected objects.
    pub selection_color: Color,
    /// Outline of the rubber band.
    pub marquee_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Context with the default dark theme.
    pub fn new(editor: &'a Editor, viewport_size: Size) -> Self {
        Self {
            editor,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::from_rgba8(32, 34, 37, 255),
            grid_style: GridStyle::Lines,
            grid_color: Color::from_rgba8(0x36, 0x39, 0x3f, 255),
            selection_color: Color::from_rgba8(0x43, 0xb5, 0x81, 255),
            marquee_color: Color::from_rgba8(0x58, 0x65, 0xf2, 255),
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Reject sizes no surface can have.
    pub fn validate(&self) -> RenderResult<()> {
        let Size { width, height } = self.viewport_size;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RendererError::InvalidViewport(format!("{width}x{height}")));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(RendererError::InvalidViewport(format!(
                "scale factor {}",
                self.scale_factor
            )));
        }
        Ok(())
    }

    /// Scene to device-pixel transform.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.editor.viewport().transform()
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the command buffer for a frame.
    ///
    /// Called once per frame; must not mutate the editor.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Render one frame of `editor` and notify its change callback.
///
/// `configure` adjusts the default context (grid, colors, HiDPI factor).
pub fn redraw<R: Renderer + ?Sized>(
    renderer: &mut R,
    editor: &mut Editor,
    viewport_size: Size,
    configure: impl FnOnce(RenderContext<'_>) -> RenderContext<'_>,
) -> RenderResult<()> {
    {
        let ctx = configure(RenderContext::new(editor, viewport_size));
        ctx.validate()?;
        renderer.build_scene(&ctx)?;
    }
    editor.frame_presented();
    Ok(())
}

/// Like [`redraw`], but only when the editor asked for a frame. Returns
/// whether a frame was drawn.
pub fn redraw_if_needed<R: Renderer + ?Sized>(
    renderer: &mut R,
    editor: &mut Editor,
    viewport_size: Size,
) -> RenderResult<bool> {
    if !editor.needs_redraw() {
        return Ok(false);
    }
    redraw(renderer, editor, viewport_size, |ctx| ctx)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_style_cycles() {
        assert_eq!(GridStyle::default(), GridStyle::Lines);
        assert_eq!(GridStyle::Lines.next(), GridStyle::Dots);
        assert_eq!(GridStyle::Dots.next().next(), GridStyle::Lines);
        assert_eq!(GridStyle::None.name(), "None");
    }

    #[test]
    fn test_validate_rejects_empty_viewport() {
        let editor = Editor::default();
        let ctx = RenderContext::new(&editor, Size::new(0.0, 600.0));
        assert!(matches!(ctx.validate(), Err(RendererError::InvalidViewport(_))));

        let ctx = RenderContext::new(&editor, Size::new(800.0, 600.0)).with_scale_factor(f64::NAN);
        assert!(ctx.validate().is_err());

        let ctx = RenderContext::new(&editor, Size::new(800.0, 600.0)).with_scale_factor(2.0);
        assert!(ctx.validate().is_ok());
        assert!((ctx.transform().as_coeffs()[0] - 2.0).abs() < f64::EPSILON);
    }

    struct Counting(usize);

    impl Renderer for Counting {
        fn build_scene(&mut self, _ctx: &RenderContext) -> RenderResult<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_redraw_if_needed_clears_flag() {
        let mut editor = Editor::default();
        let mut renderer = Counting(0);
        let size = Size::new(800.0, 600.0);
        assert!(redraw_if_needed(&mut renderer, &mut editor, size).unwrap());
        assert!(!redraw_if_needed(&mut renderer, &mut editor, size).unwrap());
        editor.request_redraw();
        assert!(redraw_if_needed(&mut renderer, &mut editor, size).unwrap());
        assert_eq!(renderer.0, 2);
    }

    #[test]
    fn test_failed_frame_keeps_redraw_pending() {
        let mut editor = Editor::default();
        let mut renderer = Counting(0);
        let result = redraw(&mut renderer, &mut editor, Size::new(-1.0, 1.0), |ctx| ctx);
        assert!(result.is_err());
        assert!(editor.needs_redraw());
        assert_eq!(renderer.0, 0);
    }
}
