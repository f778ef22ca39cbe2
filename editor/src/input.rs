//! Input model: modifier keys, key codes, pointer targets and the gesture
//! state machine.
//!
//! The host forwards DOM mouse, touch and keyboard events in page
//! coordinates. `Gesture` is the interaction in progress between a press and
//! its release; only one can be active at a time.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::element::ElementId;
use crate::geom::Coords;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    #[must_use]
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    #[must_use]
    pub fn alt() -> Self {
        Self { alt: true, ..Self::default() }
    }

    /// Decode the host's bit set: 1 shift, 2 ctrl, 4 alt, 8 meta.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self { shift: bits & 1 != 0, ctrl: bits & 2 != 0, alt: bits & 4 != 0, meta: bits & 8 != 0 }
    }

    /// Neither shift nor alt is held.
    #[must_use]
    pub fn plain(self) -> bool {
        !self.shift && !self.alt
    }
}

/// Physical key, as reported by `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Home,
    Backquote,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyC,
    KeyH,
    KeyL,
    KeyQ,
    KeyS,
    KeyX,
    KeyY,
    KeyZ,
    /// Any key the editor does not bind.
    Other,
}

impl KeyCode {
    /// Map a `KeyboardEvent.code` string.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "Home" => Self::Home,
            "Backquote" => Self::Backquote,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "KeyC" => Self::KeyC,
            "KeyH" => Self::KeyH,
            "KeyL" => Self::KeyL,
            "KeyQ" => Self::KeyQ,
            "KeyS" => Self::KeyS,
            "KeyX" => Self::KeyX,
            "KeyY" => Self::KeyY,
            "KeyZ" => Self::KeyZ,
            _ => Self::Other,
        }
    }
}

/// Where a key event originated.
///
/// Global shortcuts only fire for events on the document body (or on engine
/// buttons); keystrokes typed into sidebar inputs are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    #[default]
    Body,
    Input,
}

/// Mouse or touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

/// What a pointer release landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty viewport area.
    Viewport,
    /// A placed element.
    Element(ElementId),
    /// The rubber-band rectangle itself.
    SelectionRect,
    /// Anything outside the viewport (sidebar, dialogs, page).
    Other,
}

impl PointerTarget {
    /// Releases on these targets complete a rubber-band selection.
    #[must_use]
    pub fn completes_selection(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Interaction in progress between press and release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// Nothing pressed.
    #[default]
    Idle,
    /// Rubber-band selection started at a page-space point.
    Selecting { start: Coords },
    /// Selected elements follow the pointer. `last` is `None` until the first move.
    DraggingElements { last: Option<Coords> },
    /// The viewport scroll offset follows the pointer.
    ScrollingViewport { last: Coords },
    /// The sidebar edge follows the pointer.
    ResizingSidebar { last: Coords },
}

impl Gesture {
    #[must_use]
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Start point of an active rubber band.
    #[must_use]
    pub fn selection_start(self) -> Option<Coords> {
        match self {
            Self::Selecting { start } => Some(start),
            _ => None,
        }
    }
}
