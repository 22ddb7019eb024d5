#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Hosts translate their native events (DOM `keydown`, `pointerdown`,
//! `resize`, ...) into these values before handing them to a deck. The
//! original value travels with close requests so handlers can inspect what
//! triggered them.
//!
//! # Design Notes
//!
//! - Pointer coordinates are viewport pixels, matching `clientX`/`clientY`.
//! - `KeyEventKind` defaults to `Press`; auto-repeat is reported as `Repeat`.
//! - Shift+Tab is `KeyCode::Tab` with [`Modifiers::SHIFT`], as on the web.

use bitflags::bitflags;

use crate::geometry::Point;
use crate::id::ElementId;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer (mouse, pen or touch) event.
    Pointer(PointerEvent),

    /// The bounding region changed size (window resize).
    Resize {
        /// New viewport width in pixels.
        width: f64,
        /// New viewport height in pixels.
        height: f64,
    },
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// True for auto-repeat events generated while a key is held down.
    #[must_use]
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, KeyEventKind::Repeat)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key or pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Cmd key.
        const SUPER = 0b1000;
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,

    /// Host pointer id (`PointerEvent.pointerId`).
    pub pointer_id: u32,

    pub button: PointerButton,

    /// Pointer location in viewport pixels.
    pub position: Point,

    /// Host element the event was dispatched to, if it hit one.
    pub target: Option<ElementId>,

    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a primary-button event for pointer 1 with no target.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            pointer_id: 1,
            button: PointerButton::Primary,
            position: Point::new(x, y),
            target: None,
            modifiers: Modifiers::NONE,
        }
    }

    /// Set the element the event was dispatched to.
    #[must_use]
    pub const fn on(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    #[must_use]
    pub const fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// Pointer lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// The host aborted the gesture (lost capture, blur, touch cancel).
    Cancel,
}

/// Pointer button for pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}
