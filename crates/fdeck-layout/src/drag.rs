#![forbid(unsafe_code)]

//! Header drag lifecycle.
//!
//! A drag starts on pointer-down over the header, records where inside the
//! panel the pointer grabbed it, and from then on maps every pointer
//! location to a desired top-left corner. Clamping is left to the caller's
//! position setter so the same rules apply to drags and programmatic moves.
//!
//! Only the pointer that started the gesture can move or end it, the same
//! rule pointer capture enforces on the web.

use fdeck_core::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveDrag {
    pointer_id: u32,
    offset: Point,
}

/// Tracks one in-flight header drag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragController {
    active: Option<ActiveDrag>,
}

impl DragController {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Start dragging. `origin` is the panel's current top-left corner.
    ///
    /// A second pointer-down while a drag is active replaces it.
    pub fn begin(&mut self, pointer_id: u32, pointer: Point, origin: Point) {
        self.active = Some(ActiveDrag {
            pointer_id,
            offset: pointer - origin,
        });
    }

    /// Desired top-left for a pointer move, or `None` if `pointer_id` is not
    /// dragging.
    #[must_use]
    pub fn target(&self, pointer_id: u32, pointer: Point) -> Option<Point> {
        self.active
            .filter(|drag| drag.pointer_id == pointer_id)
            .map(|drag| pointer - drag.offset)
    }

    /// End the drag. Returns `true` if `pointer_id` owned it.
    pub fn end(&mut self, pointer_id: u32) -> bool {
        match self.active {
            Some(drag) if drag.pointer_id == pointer_id => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any active drag regardless of pointer.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn pointer_id(&self) -> Option<u32> {
        self.active.map(|drag| drag.pointer_id)
    }
}
