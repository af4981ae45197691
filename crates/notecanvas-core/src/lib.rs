//! NoteCanvas Core Library
//!
//! Scene model, geometry, selection and tool state machine for the diagram
//! canvas embedded in NoteCanvas notes. Rendering lives in
//! `notecanvas-render`; persistence belongs to the host, which exchanges
//! [`SceneDocument`]s with the [`Editor`].

pub mod camera;
pub mod codec;
pub mod config;
pub mod editor;
pub mod entities;
pub mod geometry;
pub mod input;
pub mod metrics;
pub mod palette;
pub mod scene;
pub mod selection;
pub mod tools;

pub use camera::Viewport;
pub use codec::{CodecError, CodecResult, ImageRecord, SceneDocument};
pub use config::EditorConfig;
pub use editor::{ChangeSummary, Editor, TextEditKind, TextEditRequest};
pub use entities::{Entity, EntityKind, EntityRef};
pub use input::{InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use palette::{ColorPalette, PaletteError, PaletteResult};
pub use scene::{EdgeGeometry, HitTolerances, Scene};
pub use selection::{GroupDrag, Marquee, Selection};
pub use tools::{ToolDefaults, ToolError, ToolKind, ToolManager};
