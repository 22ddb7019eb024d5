#![forbid(unsafe_code)]

//! Store access bound to a scope.
//!
//! A [`PanelController`] is what code inside a scope uses to open and
//! manage panels. Panels it creates remember the scope as their origin and
//! render inside it; the root scope records no origin at all, so its
//! panels follow whichever deck is mounted as root.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use fdeck_core::id::{PanelId, ScopeId};
use fdeck_runtime::{
    CloseOutcome, CloseRequest, PanelOptions, PanelStore, StackSnapshot, Subscription,
};

use crate::content::PanelContent;
use crate::error::UsageError;
use crate::scope::ScopeTree;

/// Read and control surface for panels, bound to one scope.
#[derive(Clone)]
pub struct PanelController {
    store: PanelStore<PanelContent>,
    scopes: Weak<RefCell<ScopeTree>>,
    scope: ScopeId,
}

impl PanelController {
    pub(crate) fn new(
        store: PanelStore<PanelContent>,
        scopes: Weak<RefCell<ScopeTree>>,
        scope: ScopeId,
    ) -> Self {
        Self {
            store,
            scopes,
            scope,
        }
    }

    #[must_use]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// True while the bound scope is mounted in a live deck.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.origin().is_ok()
    }

    /// Open a panel, or focus the open panel with the same explicit id.
    ///
    /// Returns `None` (and logs a warning) when no root deck is mounted or
    /// the bound scope is gone.
    pub fn create(&self, content: PanelContent, options: PanelOptions) -> Option<PanelId> {
        match self.try_create(content, options) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "create ignored");
                None
            }
        }
    }

    /// Like [`Self::create`], but reports a dead scope as an error.
    pub fn try_create(
        &self,
        content: PanelContent,
        options: PanelOptions,
    ) -> Result<Option<PanelId>, UsageError> {
        let origin = self.origin()?;
        Ok(self.store.create_in(content, options, origin))
    }

    /// Close through the close-request protocol (`manual`, `external`).
    pub fn close(&self, id: impl AsRef<str>) -> CloseOutcome {
        self.store.close(id)
    }

    /// Close every panel whose handler allows it. Returns how many closed.
    pub fn close_all(&self) -> usize {
        self.store.close_all()
    }

    pub fn focus(&self, id: impl AsRef<str>) -> bool {
        self.store.focus(Some(id))
    }

    /// Clear panel focus without changing the stack.
    pub fn blur(&self) -> bool {
        self.store.blur()
    }

    pub fn bring_to_front(&self, id: impl AsRef<str>) -> bool {
        self.store.bring_to_front(id)
    }

    /// Install a close handler on `id`. Returning `false` vetoes the close.
    pub fn on_close_request(
        &self,
        id: impl AsRef<str>,
        handler: impl Fn(&CloseRequest) -> bool + 'static,
    ) {
        self.store.set_close_handler(id, Some(Rc::new(handler)));
    }

    pub fn clear_close_handler(&self, id: impl AsRef<str>) {
        self.store.set_close_handler(id, None);
    }

    #[must_use]
    pub fn ids(&self) -> Vec<PanelId> {
        self.store.ids()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn contains(&self, id: impl AsRef<str>) -> bool {
        self.store.contains(id)
    }

    #[must_use]
    pub fn focused(&self) -> Option<PanelId> {
        self.store.focused()
    }

    /// Topmost panel id.
    #[must_use]
    pub fn front(&self) -> Option<PanelId> {
        self.store.front()
    }

    #[must_use]
    pub fn stack(&self) -> StackSnapshot<PanelContent> {
        self.store.stack()
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.store.subscribe(callback)
    }

    #[must_use]
    pub fn store(&self) -> &PanelStore<PanelContent> {
        &self.store
    }

    fn origin(&self) -> Result<Option<ScopeId>, UsageError> {
        let scopes = self
            .scopes
            .upgrade()
            .ok_or(UsageError::OutsideScope(self.scope))?;
        let tree = scopes
            .try_borrow()
            .map_err(|_| UsageError::OutsideScope(self.scope))?;
        if !tree.contains(self.scope) {
            return Err(UsageError::OutsideScope(self.scope));
        }
        Ok((self.scope != tree.root()).then_some(self.scope))
    }
}

impl fmt::Debug for PanelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelController")
            .field("scope", &self.scope)
            .field("panels", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdeck_core::id::ElementId;
    use fdeck_runtime::SequentialIds;

    fn setup() -> (PanelStore<PanelContent>, Rc<RefCell<ScopeTree>>) {
        let store = PanelStore::with_id_generator(SequentialIds::default());
        store.attach_root();
        (store, Rc::new(RefCell::new(ScopeTree::new(ElementId::new(1)))))
    }

    #[test]
    fn root_controller_records_no_origin() {
        let (store, scopes) = setup();
        let root = scopes.borrow().root();
        let controller = PanelController::new(store.clone(), Rc::downgrade(&scopes), root);
        let id = controller.create(PanelContent::empty(), PanelOptions::new()).unwrap();
        assert_eq!(store.record(id.as_str()).unwrap().origin(), None);
    }

    #[test]
    fn nested_controller_records_its_scope() {
        let (store, scopes) = setup();
        let root = scopes.borrow().root();
        let child = scopes.borrow_mut().mount(root).unwrap();
        let controller = PanelController::new(store.clone(), Rc::downgrade(&scopes), child);
        let id = controller.create(PanelContent::empty(), PanelOptions::new()).unwrap();
        assert_eq!(store.record(id.as_str()).unwrap().origin(), Some(child));
        assert_eq!(controller.scope(), child);
    }

    #[test]
    fn unmounted_scope_is_a_usage_error() {
        let (store, scopes) = setup();
        let root = scopes.borrow().root();
        let child = scopes.borrow_mut().mount(root).unwrap();
        let controller = PanelController::new(store.clone(), Rc::downgrade(&scopes), child);
        scopes.borrow_mut().unmount(child).unwrap();

        assert!(!controller.is_mounted());
        assert_eq!(
            controller.try_create(PanelContent::empty(), PanelOptions::new()),
            Err(UsageError::OutsideScope(child))
        );
        assert_eq!(controller.create(PanelContent::empty(), PanelOptions::new()), None);
        assert!(store.is_empty());

        drop(scopes);
        assert!(!controller.is_mounted());
    }

    #[test]
    fn read_surface_tracks_store() {
        let (store, scopes) = setup();
        let root = scopes.borrow().root();
        let controller = PanelController::new(store, Rc::downgrade(&scopes), root);
        let a = controller
            .create(PanelContent::empty(), PanelOptions::new().id("a"))
            .unwrap();
        let b = controller
            .create(PanelContent::empty(), PanelOptions::new().id("b"))
            .unwrap();
        assert_eq!(controller.ids(), vec![a.clone(), b.clone()]);
        assert_eq!(controller.count(), 2);
        assert_eq!(controller.focused(), Some(b.clone()));
        assert_eq!(controller.front(), Some(b.clone()));

        assert!(controller.blur());
        assert_eq!(controller.focused(), None);
        assert_eq!(controller.front(), Some(b.clone()));

        assert!(controller.bring_to_front("a"));
        assert_eq!(controller.front(), Some(a.clone()));
        assert_eq!(controller.focused(), None);

        controller.on_close_request("a", |_| false);
        assert_eq!(controller.close("a"), CloseOutcome::Vetoed);
        assert_eq!(controller.close_all(), 1);
        assert_eq!(controller.ids(), vec![a.clone()]);
        controller.clear_close_handler("a");
        assert_eq!(controller.close("a"), CloseOutcome::Closed);
        assert_eq!(controller.count(), 0);
    }
}
