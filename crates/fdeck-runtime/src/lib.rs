#![forbid(unsafe_code)]

//! Runtime state for floatdeck.
//!
//! The [`PanelStore`] is the single source of truth for which panels exist,
//! their z-order and which one is focused. It is an explicit handle rather
//! than a global: independent stores coexist, and every observer reaches
//! the store through a clone of the same handle.
//!
//! Change notification is built on [`reactive::ChangeSignal`], a versioned
//! signal with RAII subscriptions, and [`reactive::BatchScope`] coalesces
//! bursts of mutations into a single notification.

pub mod dismiss;
pub mod ids;
pub mod options;
pub mod reactive;
pub mod store;

pub use dismiss::{CloseHandler, CloseOutcome, CloseReason, CloseRequest, CloseSource};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use options::PanelOptions;
pub use reactive::{BatchScope, ChangeSignal, Subscription};
pub use store::{PanelRecord, PanelStore, StackSnapshot};
