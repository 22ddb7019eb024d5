#![forbid(unsafe_code)]

//! Tab-key containment for the focused panel.
//!
//! Only the two wrap points are handled: Shift+Tab on the first focusable
//! element moves to the last, Tab on the last moves to the first. Every
//! other Tab press is left to the host's native traversal, which already
//! stays inside the panel between those points.
//!
//! # Failure Modes
//!
//! - A panel with no focusable descendants swallows Tab entirely so focus
//!   cannot leak to the page behind it.

use fdeck_core::id::ElementId;

/// What to do with a Tab key press inside the focused panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAction {
    /// Let the host move focus natively.
    Ignore,
    /// Prevent the default action and leave focus where it is.
    Swallow,
    /// Prevent the default action and focus this element.
    MoveTo(ElementId),
}

impl TabAction {
    /// True if the host's default Tab handling must be suppressed.
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// Decide how Tab (or Shift+Tab when `backwards`) behaves given the
/// panel's focusable elements in document order and the active element.
#[must_use]
pub fn trap_tab(focusables: &[ElementId], active: Option<ElementId>, backwards: bool) -> TabAction {
    let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
        return TabAction::Swallow;
    };
    match active {
        Some(active) if backwards && active == first => TabAction::MoveTo(last),
        Some(active) if !backwards && active == last => TabAction::MoveTo(first),
        _ => TabAction::Ignore,
    }
}
