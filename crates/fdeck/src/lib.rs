#![forbid(unsafe_code)]

//! floatdeck public facade crate.
//!
//! Re-exports the types most applications need from the internal crates
//! and offers a prelude for day-to-day usage.
//!
//! ```rust,ignore
//! use fdeck::prelude::*;
//!
//! let mut deck = Deck::new(PanelStore::new(), HeadlessHost::default())?;
//! let panels = deck.root_controller();
//! let id = panels.create(PanelContent::text(["Hi"]), PanelOptions::new().title("Hello"));
//! deck.render();
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use fdeck_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerButton, PointerEvent,
    PointerEventKind,
};
pub use fdeck_core::geometry::{Bounds, Point, Rect, Size};
pub use fdeck_core::id::{ElementId, PanelId, ScopeId};

// --- Backend re-exports ----------------------------------------------------

pub use fdeck_backend::{
    ChromeState, ElementGeometry, ElementKind, FocusHost, HeadlessHost, Host, OverlayHost,
    PointerHost,
};

// --- Runtime re-exports ----------------------------------------------------

pub use fdeck_runtime::{
    CloseOutcome, CloseReason, CloseRequest, CloseSource, PanelOptions, PanelRecord, PanelStore,
    StackSnapshot, Subscription,
};

// --- Widget re-exports -----------------------------------------------------

#[cfg(feature = "deck-config")]
pub use fdeck_widgets::DeckConfigError;
pub use fdeck_widgets::{
    Deck, DeckConfig, EventOutcome, PanelBody, PanelContent, PanelController, PanelHandle,
    PanelPart, RenderCx, ScopeError, UsageError,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for floatdeck apps.
#[derive(Debug)]
pub enum Error {
    /// A panel or scope API was used outside its context.
    Usage(UsageError),
    /// Mounting or addressing a scope failed.
    Scope(ScopeError),
    /// A config file could not be loaded.
    #[cfg(feature = "deck-config")]
    Config(DeckConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(err) => write!(f, "{err}"),
            Self::Scope(err) => write!(f, "{err}"),
            #[cfg(feature = "deck-config")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Usage(err) => Some(err),
            Self::Scope(err) => Some(err),
            #[cfg(feature = "deck-config")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<UsageError> for Error {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}

impl From<ScopeError> for Error {
    fn from(err: ScopeError) -> Self {
        Self::Scope(err)
    }
}

#[cfg(feature = "deck-config")]
impl From<DeckConfigError> for Error {
    fn from(err: DeckConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for floatdeck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CloseReason, CloseRequest, Deck, DeckConfig, Error, Event, EventOutcome, HeadlessHost,
        Host, KeyCode, KeyEvent, PanelContent, PanelController, PanelHandle, PanelId,
        PanelOptions, PanelStore, PointerEvent, PointerEventKind, RenderCx, Result,
    };

    pub use crate::{backend, core, layout, runtime, widgets};
}

pub use fdeck_backend as backend;
pub use fdeck_core as core;
pub use fdeck_layout as layout;
pub use fdeck_runtime as runtime;
pub use fdeck_widgets as widgets;
