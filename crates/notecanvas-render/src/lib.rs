//! NoteCanvas Render Library
//!
//! Renderer abstraction for the canvas editor. The bundled implementation
//! records each frame as a backend-neutral display list of kurbo paths,
//! peniko colors, text runs and bitmaps.

mod display_list;
pub mod edge_style;
mod list_impl;
mod renderer;

pub use display_list::{
    DisplayItem, DisplayList, DrawCommand, Layer, TextAlign, TextBaseline, TextRun,
};
pub use list_impl::{DisplayListRenderer, node_path};
pub use renderer::{
    GridStyle, RenderContext, RenderResult, Renderer, RendererError, redraw, redraw_if_needed,
};
