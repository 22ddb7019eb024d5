#![forbid(unsafe_code)]

//! Error types.
//!
//! Usage errors are programming mistakes (asking for the current panel
//! outside a panel, using a controller after its scope unmounted). The
//! panicking accessors report them with these messages; the `try_*`
//! variants return them.

use std::fmt;

use fdeck_core::id::ScopeId;

/// API used from the wrong place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    /// The per-panel control surface was requested outside panel content.
    OutsidePanel,
    /// A scope-bound operation ran after the scope unmounted.
    OutsideScope(ScopeId),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsidePanel => f.write_str("panel controls are only available inside panel content"),
            Self::OutsideScope(scope) => write!(f, "{scope} is not mounted in any deck"),
        }
    }
}

impl std::error::Error for UsageError {}

/// Scope tree and root mounting errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeError {
    /// The store already has a mounted root deck.
    RootAlreadyMounted,
    UnknownScope(ScopeId),
    /// The root scope lives as long as its deck and cannot be unmounted alone.
    RootScope,
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootAlreadyMounted => f.write_str("a root deck is already mounted on this store"),
            Self::UnknownScope(scope) => write!(f, "unknown {scope}"),
            Self::RootScope => f.write_str("the root scope is unmounted together with its deck"),
        }
    }
}

impl std::error::Error for ScopeError {}
