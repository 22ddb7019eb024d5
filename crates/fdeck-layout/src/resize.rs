#![forbid(unsafe_code)]

//! Edge and corner resizing.
//!
//! A resize move happens in two steps because the minimum size is enforced
//! by the panel's size setter, not here:
//!
//! 1. [`ResizeGrip::propose`] turns the pointer location into a candidate
//!    size and top-left corner, clamped to the bounding region.
//! 2. After the caller applied the size and learned the size that actually
//!    took effect, [`ResizeGrip::anchor`] corrects the top-left corner so
//!    the edge opposite the grip stays where it was.
//!
//! # Invariants
//!
//! - Dragging a left (top) grip never moves the right (bottom) edge, even
//!   when the minimum width (height) stops the panel from shrinking.
//! - Dragging a right (bottom) grip never moves the top-left corner.
//! - All proposed values are whole pixels.

use fdeck_core::geometry::{Bounds, Point, Rect, Size};

/// Resize grip classification for any-edge / any-corner interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeGrip {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Candidate geometry produced by [`ResizeGrip::propose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeStep {
    pub size: Size,
    pub position: Point,
}

impl ResizeGrip {
    /// Every grip, edges first.
    pub const ALL: [Self; 8] = [
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// `Some(true)` when the grip moves the right edge, `Some(false)` for the
    /// left edge, `None` when it leaves the horizontal extent alone.
    #[must_use]
    pub const fn horizontal_edge(self) -> Option<bool> {
        match self {
            Self::Left | Self::TopLeft | Self::BottomLeft => Some(false),
            Self::Right | Self::TopRight | Self::BottomRight => Some(true),
            Self::Top | Self::Bottom => None,
        }
    }

    /// `Some(true)` for the bottom edge, `Some(false)` for the top edge.
    #[must_use]
    pub const fn vertical_edge(self) -> Option<bool> {
        match self {
            Self::Top | Self::TopLeft | Self::TopRight => Some(false),
            Self::Bottom | Self::BottomLeft | Self::BottomRight => Some(true),
            Self::Left | Self::Right => None,
        }
    }

    /// Styling name handed to hosts (`"top-left"`, `"right"`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Candidate size and position for a pointer at `pointer`.
    ///
    /// `rect` is the panel's measured rectangle. The pointer is first pulled
    /// `edge_buffer` pixels inside `bounds`.
    #[must_use]
    pub fn propose(self, pointer: Point, rect: Rect, bounds: Bounds, edge_buffer: f64) -> ResizeStep {
        let pointer = bounds.clamp_point(pointer, edge_buffer).round();

        let left = rect.left().round();
        let right = rect.right().round();
        let top = rect.top().round();
        let bottom = rect.bottom().round();

        let mut size = Size::new(rect.width.round(), rect.height.round());
        let mut position = Point::new(left, top);

        match self.horizontal_edge() {
            Some(true) => size.width = (pointer.x - left).min(bounds.right - left),
            Some(false) => {
                let x = pointer.x.max(bounds.left);
                size.width = (right - x).min(right - bounds.left);
                position.x = x;
            }
            None => {}
        }

        match self.vertical_edge() {
            Some(true) => size.height = (pointer.y - top).min(bounds.bottom - top),
            Some(false) => {
                let y = pointer.y.max(bounds.top);
                size.height = (bottom - y).min(bottom - bounds.top);
                position.y = y;
            }
            None => {}
        }

        ResizeStep { size, position }
    }

    /// Final top-left corner once the size setter reported `applied`.
    ///
    /// When a left or top grip asked for less than the minimum, the setter
    /// returns a larger size; the corner is then pulled back so the opposite
    /// edge of `rect` is unchanged.
    #[must_use]
    pub fn anchor(self, step: ResizeStep, rect: Rect, applied: Size) -> Point {
        let mut position = step.position;
        if self.horizontal_edge() == Some(false) && applied.width > step.size.width {
            position.x = rect.right().round() - applied.width;
        }
        if self.vertical_edge() == Some(false) && applied.height > step.size.height {
            position.y = rect.bottom().round() - applied.height;
        }
        position
    }
}

/// Tracks which grip (if any) is being dragged, and by which pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeController {
    active: Option<(ResizeGrip, u32)>,
}

impl ResizeController {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn begin(&mut self, grip: ResizeGrip, pointer_id: u32) {
        self.active = Some((grip, pointer_id));
    }

    /// The active grip if `pointer_id` owns the gesture.
    #[must_use]
    pub fn grip_for(&self, pointer_id: u32) -> Option<ResizeGrip> {
        self.active
            .filter(|&(_, owner)| owner == pointer_id)
            .map(|(grip, _)| grip)
    }

    /// End the gesture. Returns `true` if `pointer_id` owned it.
    pub fn end(&mut self, pointer_id: u32) -> bool {
        if self.grip_for(pointer_id).is_some() {
            self.active = None;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    #[must_use]
    pub const fn is_resizing(&self) -> bool {
        self.active.is_some()
    }
}
