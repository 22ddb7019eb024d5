#![forbid(unsafe_code)]

//! Floating panels for floatdeck.
//!
//! A [`Deck`] is mounted once per store as the root provider. Scopes nest
//! below it ([`Deck::mount_scope`]) and carry context values; panels opened
//! through a scope's [`PanelController`] render inside that scope while
//! sharing the root's overlay, so they see the scope's context and stay in
//! one global z-order.
//!
//! ```rust,ignore
//! let store = PanelStore::new();
//! let mut deck = Deck::new(store, HeadlessHost::default())?;
//! let panels = deck.root_controller();
//! panels.create(
//!     PanelContent::text(["Hello"]),
//!     PanelOptions::new().title("Greeting").close_on_outside_click(true),
//! );
//! deck.render();
//! ```

pub mod config;
pub mod content;
pub mod controller;
pub mod deck;
mod dismiss;
pub mod error;
pub mod focus_trap;
pub mod panel;
mod scope;
pub mod shell;

pub use config::{DeckConfig, PanelSettings};
#[cfg(feature = "deck-config")]
pub use config::DeckConfigError;
pub use content::{PanelBody, PanelContent, RenderCx};
pub use controller::PanelController;
pub use deck::{Deck, EventOutcome};
pub use error::{ScopeError, UsageError};
pub use focus_trap::{TabAction, trap_tab};
pub use panel::PanelHandle;
pub use shell::PanelPart;
