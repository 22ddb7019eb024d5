#![forbid(unsafe_code)]

//! Change notification primitives.

pub mod batch;
pub mod signal;

pub use batch::BatchScope;
pub use signal::{ChangeSignal, Subscription};
