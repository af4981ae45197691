//! Pointer and keyboard events delivered by the host.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button; drives the active tool.
    Left,
    /// Secondary button; pans in any tool.
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Click toggles membership and marquees extend the selection.
    pub fn toggles_selection(&self) -> bool {
        self.command()
    }
}

/// Pointer events in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
    DoubleClick {
        position: Point,
    },
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Character(char),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Buttons held and where the pointer was last seen.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Position before the latest move, for screen-space deltas.
    pub previous_pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update button state and the pointer delta from an event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                self.jump_to(position);
                self.pressed_buttons.insert(button);
                self.modifiers = modifiers;
            }
            PointerEvent::Up { position, button } => {
                self.jump_to(position);
                self.pressed_buttons.remove(&button);
            }
            PointerEvent::Move { position } => {
                self.previous_pointer_position = self.pointer_position;
                self.pointer_position = position;
            }
            PointerEvent::Scroll { position, .. } | PointerEvent::DoubleClick { position } => {
                self.jump_to(position);
            }
        }
    }

    fn jump_to(&mut self, position: Point) {
        self.previous_pointer_position = position;
        self.pointer_position = position;
    }

    /// Screen-space movement of the latest move event.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Whether the left button is held.
    pub fn primary_down(&self) -> bool {
        self.is_button_down(MouseButton::Left)
    }

    /// Release everything, e.g. when the pointer leaves the canvas.
    pub fn reset_buttons(&mut self) {
        self.pressed_buttons.clear();
    }
}
