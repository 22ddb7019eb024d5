#![forbid(unsafe_code)]

//! Versioned change signal with RAII subscriptions.
//!
//! # Design
//!
//! [`ChangeSignal`] carries no value: owners mutate their own state, then
//! call [`ChangeSignal::notify`]. Subscribers receive no arguments and read
//! whatever state they need, which keeps the signal independent of the
//! owner's data type.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 per `notify()`.
//! 2. Subscribers are notified in registration order.
//! 3. A dropped [`Subscription`] is never called again. Its dead entry is
//!    pruned on the next notify.
//! 4. Inside a [`BatchScope`](super::BatchScope) each live callback is
//!    queued once, however many times the signal fires.
//!
//! # Failure Modes
//!
//! - **Re-entrant notify**: a subscriber may mutate the owner and trigger
//!   another notify. No borrow is held while callbacks run, so this is
//!   allowed; the nested notification runs before the outer loop resumes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use super::batch;

type CallbackRc = Rc<dyn Fn()>;
type CallbackWeak = Weak<dyn Fn()>;

struct SignalInner {
    version: Cell<u64>,
    subscribers: RefCell<Vec<CallbackWeak>>,
}

/// Shared change signal. Clones notify the same subscribers.
#[derive(Clone)]
pub struct ChangeSignal {
    inner: Rc<SignalInner>,
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("version", &self.version())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl ChangeSignal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SignalInner {
                version: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a callback. Dropping the returned guard unsubscribes it.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .subscribers
            .borrow_mut()
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of notifications fired so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Bump the version and call live subscribers, or queue them if a batch
    /// is active.
    pub fn notify(&self) {
        let version = self.inner.version.get() + 1;
        self.inner.version.set(version);

        let callbacks: Vec<CallbackRc> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        trace!(version, subscribers = callbacks.len(), "change signal");

        if batch::is_batching() {
            for callback in callbacks {
                let key = Rc::as_ptr(&callback).cast::<()>() as usize;
                batch::defer_or_run_keyed(key, move || callback());
            }
            return;
        }

        for callback in &callbacks {
            callback();
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Holding it keeps the callback alive; dropping it makes the signal's weak
/// reference dead.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::BatchScope;

    fn counter(signal: &ChangeSignal) -> (Rc<Cell<u32>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let sub = signal.subscribe(move || seen.set(seen.get() + 1));
        (hits, sub)
    }

    #[test]
    fn notify_bumps_version_and_calls_subscribers() {
        let signal = ChangeSignal::new();
        let (hits, _sub) = counter(&signal);
        signal.notify();
        signal.notify();
        assert_eq!(hits.get(), 2);
        assert_eq!(signal.version(), 2);
    }

    #[test]
    fn dropped_subscription_is_not_called_and_is_pruned() {
        let signal = ChangeSignal::new();
        let (hits, sub) = counter(&signal);
        drop(sub);
        signal.notify();
        assert_eq!(hits.get(), 0);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let signal = ChangeSignal::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&log);
        let second = Rc::clone(&log);
        let _a = signal.subscribe(move || first.borrow_mut().push("a"));
        let _b = signal.subscribe(move || second.borrow_mut().push("b"));
        signal.notify();
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn batch_coalesces_to_one_call() {
        let signal = ChangeSignal::new();
        let (hits, _sub) = counter(&signal);
        {
            let _batch = BatchScope::new();
            signal.notify();
            signal.notify();
            signal.notify();
            assert_eq!(hits.get(), 0);
        }
        assert_eq!(hits.get(), 1);
        assert_eq!(signal.version(), 3);
    }

    #[test]
    fn reentrant_notify_from_subscriber() {
        let signal = ChangeSignal::new();
        let inner = signal.clone();
        let depth = Rc::new(Cell::new(0));
        let seen = Rc::clone(&depth);
        let _sub = signal.subscribe(move || {
            seen.set(seen.get() + 1);
            if seen.get() == 1 {
                inner.notify();
            }
        });
        signal.notify();
        assert_eq!(depth.get(), 2);
    }
}
