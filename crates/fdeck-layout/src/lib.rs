#![forbid(unsafe_code)]

//! Geometry and interaction primitives for floating panels.
//!
//! Everything here is pure: functions take the current measurements and a
//! pointer location and return the position/size the panel should move to.
//! Applying the result (and measuring the element) is the caller's job.

pub mod drag;
pub mod placement;
pub mod resize;

pub use drag::DragController;
pub use placement::{
    DEFAULT_MIN_SIZE, DEFAULT_PANEL_SIZE, POSITION_EDGE_BUFFER, centered, clamp_position,
    clamp_size, fit_to_region,
};
pub use resize::{ResizeController, ResizeGrip, ResizeStep};
