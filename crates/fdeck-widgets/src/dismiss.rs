#![forbid(unsafe_code)]

//! Escape and outside-press dismissal rules.
//!
//! Neither path removes a panel directly. Both produce a [`CloseRequest`]
//! with `source = internal` that the deck runs through the store's
//! close-request protocol, so a panel's close handler can veto.
//!
//! # Invariants
//!
//! - Escape only targets the focused panel, and never on key repeat.
//! - An outside press moves focus off the pressed-outside panel whether or
//!   not it closes on outside clicks.

use fdeck_core::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use fdeck_core::id::PanelId;
use fdeck_runtime::{CloseReason, CloseRequest, CloseSource};

use crate::config::PanelSettings;

/// True for the key event that triggers escape dismissal.
#[must_use]
pub(crate) fn is_dismiss_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Escape && key.kind == KeyEventKind::Press
}

/// Close request for the focused panel after an Escape press.
pub(crate) fn escape_request(
    panel: &PanelId,
    settings: &PanelSettings,
    event: &Event,
) -> Option<CloseRequest> {
    settings.close_on_escape.then(|| {
        CloseRequest::new(panel.clone(), CloseReason::Escape, CloseSource::Internal)
            .with_event(event.clone())
    })
}

/// Reaction of one panel to a press that landed outside it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OutsidePress {
    /// Clear store focus (the panel held it).
    pub(crate) blur: bool,
    pub(crate) close: Option<CloseRequest>,
}

pub(crate) fn outside_press(
    panel: &PanelId,
    settings: &PanelSettings,
    focused: bool,
    event: &Event,
) -> OutsidePress {
    OutsidePress {
        blur: focused,
        close: settings.close_on_outside_click.then(|| {
            CloseRequest::new(panel.clone(), CloseReason::Outside, CloseSource::Internal)
                .with_event(event.clone())
        }),
    }
}
