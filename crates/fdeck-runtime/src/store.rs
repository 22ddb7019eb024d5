#![forbid(unsafe_code)]

//! The panel store: which panels exist, in what order, and which is focused.
//!
//! # Design
//!
//! [`PanelStore<C>`] is a cheaply clonable handle to shared state. The
//! stack is kept as an immutable [`StackSnapshot`]; every mutation that
//! changes order or membership builds a new snapshot, so observers can
//! detect changes by reference ([`StackSnapshot::same_as`]).
//!
//! Transient per-panel visual state (position, size, drag flags) does not
//! live here.
//!
//! # Invariants
//!
//! 1. Panel ids in the stack are unique.
//! 2. The focused id, when set, names a panel in the stack. Removing the
//!    focused panel clears focus; focus never moves to another panel.
//! 3. Subscribers are notified after, and only after, a mutation that
//!    changed the stack or the focused id.
//! 4. Reading twice without an intervening mutation returns the same
//!    snapshot.
//!
//! # Failure Modes
//!
//! - **Create before mount**: logged at `warn` and ignored; `create`
//!   returns `None`.
//! - **Unknown ids**: every id-taking operation is a silent no-op.
//! - **Re-entrancy**: no borrow is held while close handlers or
//!   subscribers run, so both may call back into the store.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use ahash::{AHashMap, AHashSet};
use tracing::{trace, warn};

use fdeck_core::id::{PanelId, ScopeId};

use crate::dismiss::{CloseHandler, CloseOutcome, CloseRequest};
use crate::ids::{IdGenerator, UuidIds};
use crate::options::PanelOptions;
use crate::reactive::{BatchScope, ChangeSignal, Subscription};

/// One open panel as recorded by the store. Immutable once created.
pub struct PanelRecord<C> {
    id: PanelId,
    content: C,
    options: Rc<PanelOptions>,
    origin: Option<ScopeId>,
}

impl<C: Clone> Clone for PanelRecord<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            content: self.content.clone(),
            options: Rc::clone(&self.options),
            origin: self.origin,
        }
    }
}

impl<C> fmt::Debug for PanelRecord<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelRecord")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("title", &self.options.title)
            .finish_non_exhaustive()
    }
}

impl<C> PanelRecord<C> {
    #[must_use]
    pub fn id(&self) -> &PanelId {
        &self.id
    }

    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Options captured at creation time.
    #[must_use]
    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    /// Scope that created the panel; `None` means the root scope.
    #[must_use]
    pub fn origin(&self) -> Option<ScopeId> {
        self.origin
    }
}

/// Immutable view of the stack, back (index 0) to front (last).
pub struct StackSnapshot<C>(Rc<[PanelRecord<C>]>);

impl<C> Clone for StackSnapshot<C> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C> fmt::Debug for StackSnapshot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(|r| &r.id)).finish()
    }
}

impl<C> Deref for StackSnapshot<C> {
    type Target = [PanelRecord<C>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C> StackSnapshot<C> {
    fn empty() -> Self {
        Self(Rc::from(Vec::new()))
    }

    /// True if both snapshots are the same allocation.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|record| record.id == *id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PanelRecord<C>> {
        self.0.iter().find(|record| record.id == *id)
    }

    /// Topmost panel.
    #[must_use]
    pub fn front(&self) -> Option<&PanelRecord<C>> {
        self.0.last()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PanelId> {
        self.0.iter().map(PanelRecord::id)
    }
}

struct StoreState<C> {
    stack: StackSnapshot<C>,
    focused: Option<PanelId>,
    handlers: AHashMap<PanelId, CloseHandler>,
    root_attached: bool,
    ids: Box<dyn IdGenerator>,
}

impl<C: Clone> StoreState<C> {
    fn rebuild(&mut self, records: Vec<PanelRecord<C>>) {
        self.stack = StackSnapshot(Rc::from(records));
    }

    /// Move `id` to the end of the stack. Returns `true` if the order changed.
    fn raise(&mut self, id: &str) -> bool {
        match self.stack.position(id) {
            Some(index) if index + 1 < self.stack.len() => {
                let mut records = self.stack.to_vec();
                let record = records.remove(index);
                records.push(record);
                self.rebuild(records);
                true
            }
            _ => false,
        }
    }
}

/// Shared handle to the registry of open panels.
///
/// Cloning yields another handle to the same store.
pub struct PanelStore<C> {
    state: Rc<RefCell<StoreState<C>>>,
    signal: ChangeSignal,
}

impl<C> Clone for PanelStore<C> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            signal: self.signal.clone(),
        }
    }
}

impl<C> fmt::Debug for PanelStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PanelStore")
            .field("stack", &state.stack)
            .field("focused", &state.focused)
            .field("root_attached", &state.root_attached)
            .field("version", &self.signal.version())
            .finish()
    }
}

impl<C: Clone + 'static> Default for PanelStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone + 'static> PanelStore<C> {
    /// Empty store generating random UUID ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_generator(UuidIds)
    }

    #[must_use]
    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(StoreState {
                stack: StackSnapshot::empty(),
                focused: None,
                handlers: AHashMap::new(),
                root_attached: false,
                ids: Box::new(ids),
            })),
            signal: ChangeSignal::new(),
        }
    }

    // --- root attachment --------------------------------------------------

    /// Mark the root overlay as mounted. Returns `false` if one already was.
    pub fn attach_root(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.root_attached {
            return false;
        }
        state.root_attached = true;
        true
    }

    pub fn detach_root(&self) {
        self.state.borrow_mut().root_attached = false;
    }

    #[must_use]
    pub fn has_root(&self) -> bool {
        self.state.borrow().root_attached
    }

    // --- mutations -------------------------------------------------------

    /// Open a panel from the root scope. See [`Self::create_in`].
    pub fn create(&self, content: C, options: PanelOptions) -> Option<PanelId> {
        self.create_in(content, options, None)
    }

    /// Open a panel created from `origin`.
    ///
    /// If `options.id` names an open panel, that panel is focused and its id
    /// returned; nothing else changes. Otherwise the panel is appended to the
    /// stack and focused. Returns `None` when no root is attached.
    pub fn create_in(
        &self,
        content: C,
        options: PanelOptions,
        origin: Option<ScopeId>,
    ) -> Option<PanelId> {
        if let Some(id) = options.id.as_ref()
            && self.contains(id)
        {
            trace!(panel = %id, "create: already open, focusing");
            self.focus(Some(id));
            return Some(id.clone());
        }

        let id = {
            let mut state = self.state.borrow_mut();
            if !state.root_attached {
                drop(state);
                warn!("create called before a deck was mounted; mount a Deck before creating panels");
                return None;
            }
            let id = match options.id.clone() {
                Some(id) => id,
                // Explicit ids may already hold a generated value.
                None => loop {
                    let id = state.ids.next_id();
                    if state.stack.position(id.as_str()).is_none() {
                        break id;
                    }
                },
            };
            let mut records = state.stack.to_vec();
            records.push(PanelRecord {
                id: id.clone(),
                content,
                options: Rc::new(options),
                origin,
            });
            state.rebuild(records);
            state.focused = Some(id.clone());
            id
        };
        trace!(panel = %id, ?origin, "create");
        self.signal.notify();
        Some(id)
    }

    /// Remove a panel without consulting its close handler.
    ///
    /// Clears focus if the panel was focused. Returns `false` if absent.
    pub fn remove(&self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        let removed = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.stack.position(id) else {
                return false;
            };
            let mut records = state.stack.to_vec();
            records.remove(index);
            state.rebuild(records);
            state.handlers.remove(id);
            if state.focused.as_ref().is_some_and(|f| *f == *id) {
                state.focused = None;
            }
            true
        };
        trace!(panel = id, "remove");
        self.signal.notify();
        removed
    }

    /// Close from outside the panel (`reason = manual`, `source = external`).
    pub fn close(&self, id: impl AsRef<str>) -> CloseOutcome {
        let Some(id) = self.record(id.as_ref()).map(|r| r.id) else {
            return CloseOutcome::Missing;
        };
        self.request_close(CloseRequest::external(id))
    }

    /// Run the close-request protocol for `request.panel_id`.
    pub fn request_close(&self, request: CloseRequest) -> CloseOutcome {
        let handler = {
            let state = self.state.borrow();
            if state.stack.position(request.panel_id.as_str()).is_none() {
                return CloseOutcome::Missing;
            }
            state.handlers.get(&request.panel_id).cloned()
        };
        if let Some(handler) = handler
            && !handler(&request)
        {
            trace!(panel = %request.panel_id, reason = %request.reason, "close vetoed");
            return CloseOutcome::Vetoed;
        }
        self.remove(&request.panel_id);
        CloseOutcome::Closed
    }

    /// Ask every panel to close and remove those that accept.
    ///
    /// Removals happen in one mutation and subscribers hear about it once.
    /// Nothing is notified when every panel vetoes. Returns the number of
    /// panels removed.
    pub fn close_all(&self) -> usize {
        let _batch = BatchScope::new();

        let candidates: Vec<(PanelId, Option<CloseHandler>)> = {
            let state = self.state.borrow();
            state
                .stack
                .ids()
                .map(|id| (id.clone(), state.handlers.get(id).cloned()))
                .collect()
        };

        let accepted: AHashSet<PanelId> = candidates
            .into_iter()
            .filter(|(id, handler)| {
                handler
                    .as_ref()
                    .is_none_or(|handler| handler(&CloseRequest::external(id.clone())))
            })
            .map(|(id, _)| id)
            .collect();

        if accepted.is_empty() {
            return 0;
        }

        let removed = {
            let mut state = self.state.borrow_mut();
            let before = state.stack.len();
            let records: Vec<PanelRecord<C>> = state
                .stack
                .iter()
                .filter(|record| !accepted.contains(&record.id))
                .cloned()
                .collect();
            let removed = before - records.len();
            state.rebuild(records);
            state.handlers.retain(|id, _| !accepted.contains(id));
            if state.focused.as_ref().is_some_and(|f| accepted.contains(f)) {
                state.focused = None;
            }
            removed
        };
        trace!(removed, "close_all");
        if removed > 0 {
            self.signal.notify();
        }
        removed
    }

    /// Replace (or clear) a panel's close handler. Unknown ids are ignored.
    pub fn set_close_handler(&self, id: impl AsRef<str>, handler: Option<CloseHandler>) {
        let id = id.as_ref();
        let mut state = self.state.borrow_mut();
        let Some(id) = state.stack.get(id).map(|r| r.id.clone()) else {
            return;
        };
        match handler {
            Some(handler) => {
                state.handlers.insert(id, handler);
            }
            None => {
                state.handlers.remove(&id);
            }
        }
    }

    /// Focus a panel and raise it to the front, or clear focus with `None`.
    ///
    /// Returns `true` if anything changed.
    pub fn focus(&self, id: Option<impl AsRef<str>>) -> bool {
        let changed = {
            let mut state = self.state.borrow_mut();
            match id {
                None => state.focused.take().is_some(),
                Some(id) => {
                    let id = id.as_ref();
                    let Some(record_id) = state.stack.get(id).map(|r| r.id.clone()) else {
                        return false;
                    };
                    let raised = state.raise(id);
                    let refocused = state.focused.as_ref() != Some(&record_id);
                    state.focused = Some(record_id);
                    raised || refocused
                }
            }
        };
        if changed {
            trace!(focused = ?self.focused(), "focus");
            self.signal.notify();
        }
        changed
    }

    /// Clear focus. Same as `focus(None)`.
    pub fn blur(&self) -> bool {
        self.focus(None::<&str>)
    }

    /// Raise a panel to the front without touching focus.
    pub fn bring_to_front(&self, id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        let raised = self.state.borrow_mut().raise(id);
        if raised {
            trace!(panel = id, "bring_to_front");
            self.signal.notify();
        }
        raised
    }

    // --- reads -----------------------------------------------------------

    /// Current stack. Stable until the next mutation.
    #[must_use]
    pub fn stack(&self) -> StackSnapshot<C> {
        self.state.borrow().stack.clone()
    }

    #[must_use]
    pub fn record(&self, id: &str) -> Option<PanelRecord<C>> {
        self.state.borrow().stack.get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.state.borrow().stack.position(id.as_ref()).is_some()
    }

    #[must_use]
    pub fn focused(&self) -> Option<PanelId> {
        self.state.borrow().focused.clone()
    }

    /// Id of the topmost panel.
    #[must_use]
    pub fn front(&self) -> Option<PanelId> {
        self.state.borrow().stack.front().map(|r| r.id.clone())
    }

    /// Open ids, back to front.
    #[must_use]
    pub fn ids(&self) -> Vec<PanelId> {
        self.state.borrow().stack.ids().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_close_handler(&self, id: &str) -> bool {
        self.state.borrow().handlers.contains_key(id)
    }

    // --- observation -----------------------------------------------------

    /// Call `callback` after every state-changing mutation.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.signal.subscribe(callback)
    }

    /// Number of notifications fired so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.signal.version()
    }

    /// True if both handles point at the same store.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
