#![forbid(unsafe_code)]

//! Core types shared by every floatdeck crate.
//!
//! - [`geometry`]: pixel-space points, sizes, rectangles and bounding regions.
//! - [`event`]: canonical keyboard/pointer/resize events fed in by the host.
//! - [`id`]: panel, scope and host-element identifiers.

pub mod event;
pub mod geometry;
pub mod id;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind,
};
pub use geometry::{Bounds, Point, Rect, Size};
pub use id::{ElementId, PanelId, ScopeId};
