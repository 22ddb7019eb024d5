#![forbid(unsafe_code)]

//! Batch coalescing for [`ChangeSignal`](super::ChangeSignal) notifications.
//!
//! While a [`BatchScope`] is alive, notifications are queued instead of
//! fired. When the outermost scope drops, every queued callback runs once,
//! in the order it was first queued.
//!
//! ```ignore
//! let _batch = BatchScope::new();
//! store.remove(&a);   // deferred
//! store.remove(&b);   // deferred, same subscriber: coalesced
//! // one notification on drop
//! ```
//!
//! # Invariants
//!
//! 1. Nested scopes are supported: only the outermost one flushes.
//! 2. State is updated immediately; only notifications are deferred.
//! 3. Subscribers called on flush observe the final state.
//!
//! # Failure Modes
//!
//! - **Callback panics during flush**: remaining callbacks still run, then
//!   the first panic is resumed.

use std::cell::RefCell;

use tracing::debug_span;

type DeferredNotify = Box<dyn FnOnce()>;

struct DeferredEntry {
    key: usize,
    notify: DeferredNotify,
}

struct BatchContext {
    depth: u32,
    deferred: Vec<DeferredEntry>,
}

thread_local! {
    static BATCH_CTX: RefCell<Option<BatchContext>> = const { RefCell::new(None) };
}

/// Returns true if a batch is active on this thread.
pub(crate) fn is_batching() -> bool {
    BATCH_CTX.with(|ctx| ctx.borrow().is_some())
}

/// Queue `f` for the current batch, or run it now if no batch is active.
/// A later call with the same `key` replaces the queued callback while
/// keeping its original position.
///
/// Returns `true` if the call was deferred.
pub(crate) fn defer_or_run_keyed(key: usize, f: impl FnOnce() + 'static) -> bool {
    let notify: DeferredNotify = Box::new(f);
    let rejected = BATCH_CTX.with(|ctx| {
        let mut guard = ctx.borrow_mut();
        let Some(batch) = guard.as_mut() else {
            return Some(notify);
        };
        match batch.deferred.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.notify = notify,
            None => batch.deferred.push(DeferredEntry { key, notify }),
        }
        None
    });
    match rejected {
        Some(notify) => {
            notify();
            false
        }
        None => true,
    }
}

type PanicPayload = Box<dyn std::any::Any + Send>;

/// Run every queued callback. Returns the first panic payload, if any.
fn flush() -> Option<PanicPayload> {
    let deferred: Vec<DeferredNotify> = BATCH_CTX.with(|ctx| {
        ctx.borrow_mut().as_mut().map_or_else(Vec::new, |batch| {
            std::mem::take(&mut batch.deferred)
                .into_iter()
                .map(|entry| entry.notify)
                .collect()
        })
    });

    if deferred.is_empty() {
        return None;
    }

    let _span = debug_span!("fdeck.batch.flush", callbacks = deferred.len()).entered();

    let mut first_panic: Option<PanicPayload> = None;
    for notify in deferred {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(notify));
        if let Err(payload) = result
            && first_panic.is_none()
        {
            first_panic = Some(payload);
        }
    }
    first_panic
}

/// RAII guard that defers notifications until it drops.
pub struct BatchScope {
    is_root: bool,
}

impl BatchScope {
    /// Begin a batch, or nest inside the active one.
    #[must_use]
    pub fn new() -> Self {
        let is_root = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(batch) => {
                    batch.depth += 1;
                    false
                }
                None => {
                    *guard = Some(BatchContext {
                        depth: 1,
                        deferred: Vec::new(),
                    });
                    true
                }
            }
        });
        Self { is_root }
    }

    /// Callbacks queued in the current batch.
    fn pending_count(&self) -> usize {
        BATCH_CTX.with(|ctx| ctx.borrow().as_ref().map_or(0, |b| b.deferred.len()))
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let should_flush = BATCH_CTX.with(|ctx| {
            let mut guard = ctx.borrow_mut();
            match guard.as_mut() {
                Some(batch) => {
                    batch.depth -= 1;
                    batch.depth == 0
                }
                None => false,
            }
        });

        if should_flush {
            // The context stays in place (depth 0) until the queue is empty,
            // so callbacks that notify again are queued and run here.
            let mut first_panic = None;
            loop {
                let panic = flush();
                if first_panic.is_none() {
                    first_panic = panic;
                }
                let drained = BATCH_CTX.with(|ctx| {
                    ctx.borrow()
                        .as_ref()
                        .is_none_or(|batch| batch.deferred.is_empty())
                });
                if drained {
                    break;
                }
            }
            BATCH_CTX.with(|ctx| {
                *ctx.borrow_mut() = None;
            });
            if let Some(payload) = first_panic {
                std::panic::resume_unwind(payload);
            }
        }
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("is_root", &self.is_root)
            .field("pending", &self.pending_count())
            .finish()
    }
}
