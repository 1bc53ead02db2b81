//! Pointer and keyboard events delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
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
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen (canvas) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point, button: MouseButton },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position, .. } => position,
        }
    }
}

/// Keyboard event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// DOM-style key name ("z", "Escape", "Delete", ...).
    pub key: String,
    pub modifiers: Modifiers,
    /// Auto-repeat from a held key.
    #[serde(default)]
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            repeat: false,
        }
    }
}

/// Editor actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorCommand {
    Undo,
    Redo,
    Cancel,
    DeleteActive,
}

impl EditorCommand {
    /// Resolve a key press to a command.
    ///
    /// Ctrl/Cmd+Z undoes; Ctrl/Cmd+Shift+Z and Ctrl/Cmd+Y redo.
    pub fn from_key(event: &KeyEvent) -> Option<Self> {
        let key = event.key.as_str();
        let mods = event.modifiers;
        if mods.command() {
            return match key {
                "z" | "Z" if mods.shift => Some(EditorCommand::Redo),
                "z" | "Z" => Some(EditorCommand::Undo),
                "y" | "Y" => Some(EditorCommand::Redo),
                _ => None,
            };
        }
        match key {
            "Escape" => Some(EditorCommand::Cancel),
            "Delete" | "Backspace" => Some(EditorCommand::DeleteActive),
            _ => None,
        }
    }
}
