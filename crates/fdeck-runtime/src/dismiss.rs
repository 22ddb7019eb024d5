#![forbid(unsafe_code)]

//! Close-request protocol.
//!
//! Every removal path except [`PanelStore::remove`](crate::PanelStore::remove)
//! goes through a [`CloseRequest`]. If the panel has a [`CloseHandler`], its
//! return value decides: `false` leaves the panel untouched. Vetoes are not
//! errors and are not logged.

use std::fmt;
use std::rc::Rc;

use fdeck_core::event::Event;
use fdeck_core::id::PanelId;

/// What triggered a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Escape pressed while the panel was focused.
    Escape,
    /// Pointer-down outside the panel.
    Outside,
    /// Close button, per-panel `close()`, or a store call.
    Manual,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Escape => "escape",
            Self::Outside => "outside",
            Self::Manual => "manual",
        })
    }
}

/// Whether the request came from the panel's own interactions or from code
/// holding the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseSource {
    Internal,
    External,
}

impl fmt::Display for CloseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Internal => "internal",
            Self::External => "external",
        })
    }
}

/// Event handed to a close handler.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseRequest {
    pub reason: CloseReason,
    pub source: CloseSource,
    pub panel_id: PanelId,
    /// The input event behind the request, when there was one.
    pub native_event: Option<Event>,
}

impl CloseRequest {
    #[must_use]
    pub fn new(panel_id: PanelId, reason: CloseReason, source: CloseSource) -> Self {
        Self {
            reason,
            source,
            panel_id,
            native_event: None,
        }
    }

    /// Request issued by code outside the panel (`close`, `close_all`).
    #[must_use]
    pub fn external(panel_id: PanelId) -> Self {
        Self::new(panel_id, CloseReason::Manual, CloseSource::External)
    }

    #[must_use]
    pub fn with_event(mut self, event: Event) -> Self {
        self.native_event = Some(event);
        self
    }
}

/// Predicate consulted before a panel closes. Return `true` to allow.
pub type CloseHandler = Rc<dyn Fn(&CloseRequest) -> bool>;

/// Result of running the protocol for one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The handler returned `false`.
    Vetoed,
    /// No panel with that id.
    Missing,
}

impl CloseOutcome {
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}
