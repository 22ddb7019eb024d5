#![forbid(unsafe_code)]

//! Scope tree and container routing.
//!
//! A scope is a nested rendering/data context. Each holds a parent link and
//! a small type-keyed map of context values; lookups walk from a scope up
//! through its ancestors. Exactly one scope, the root, owns the
//! [`ContainerRouter`]: the shared overlay element plus one sub-container
//! per open panel. Nested scopes never own containers and resolve them by
//! delegating to their parent, ultimately the root.
//!
//! # Two-phase synchronization
//!
//! 1. [`ContainerRouter::materialize`] makes the set of sub-containers match
//!    the stack (create, remove, reorder).
//! 2. The deck then binds panel content into those containers, each panel
//!    by the scope recorded as its origin (or the root when it has none).
//!
//! Step 2 only places panels whose container exists, so it must run after
//! step 1 whenever the stack changes.
//!
//! # Invariants
//!
//! - Scope ids are unique for the life of the process, so an origin id can
//!   never be captured by a scope mounted later.
//! - Unmounting a scope unmounts its whole subtree.
//! - The router holds a container for a panel iff the panel is in the last
//!   materialized stack.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use tracing::{debug, trace};

use fdeck_backend::{ElementKind, OverlayHost};
use fdeck_core::id::{ElementId, PanelId, ScopeId};
use fdeck_runtime::StackSnapshot;

use crate::content::PanelContent;
use crate::error::ScopeError;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

fn next_scope_id() -> ScopeId {
    ScopeId::new(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
}

struct ScopeNode {
    parent: Option<ScopeId>,
    values: AHashMap<TypeId, Box<dyn Any>>,
}

impl ScopeNode {
    fn new(parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            values: AHashMap::new(),
        }
    }
}

/// The scopes of one deck.
pub(crate) struct ScopeTree {
    root: ScopeId,
    nodes: AHashMap<ScopeId, ScopeNode>,
    router: ContainerRouter,
}

impl ScopeTree {
    pub(crate) fn new(overlay: ElementId) -> Self {
        let root = next_scope_id();
        let mut nodes = AHashMap::new();
        nodes.insert(root, ScopeNode::new(None));
        Self {
            root,
            nodes,
            router: ContainerRouter::new(overlay),
        }
    }

    pub(crate) fn root(&self) -> ScopeId {
        self.root
    }

    pub(crate) fn contains(&self, scope: ScopeId) -> bool {
        self.nodes.contains_key(&scope)
    }

    pub(crate) fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.nodes.get(&scope).and_then(|node| node.parent)
    }

    pub(crate) fn mount(&mut self, parent: ScopeId) -> Result<ScopeId, ScopeError> {
        if !self.contains(parent) {
            return Err(ScopeError::UnknownScope(parent));
        }
        let id = next_scope_id();
        self.nodes.insert(id, ScopeNode::new(Some(parent)));
        trace!(scope = %id, parent = %parent, "scope mounted");
        Ok(id)
    }

    /// Remove `scope` and its descendants. Returns the removed ids.
    pub(crate) fn unmount(&mut self, scope: ScopeId) -> Result<Vec<ScopeId>, ScopeError> {
        if scope == self.root {
            return Err(ScopeError::RootScope);
        }
        if !self.contains(scope) {
            return Err(ScopeError::UnknownScope(scope));
        }
        let removed: Vec<ScopeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|&id| self.is_within(id, scope))
            .collect();
        for id in &removed {
            self.nodes.remove(id);
        }
        debug!(scope = %scope, removed = removed.len(), "scope unmounted");
        Ok(removed)
    }

    /// True if `scope` is `ancestor` or nested somewhere below it.
    pub(crate) fn is_within(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Scope that renders a panel with the given origin, if it is mounted.
    pub(crate) fn owner_of(&self, origin: Option<ScopeId>) -> Option<ScopeId> {
        match origin {
            None => Some(self.root),
            Some(scope) => self.contains(scope).then_some(scope),
        }
    }

    /// Nearest value of type `T` visible from `scope`.
    pub(crate) fn context<T: 'static>(&self, scope: ScopeId) -> Option<&T> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let node = self.nodes.get(&id)?;
            if let Some(value) = node.values.get(&TypeId::of::<T>()) {
                return value.downcast_ref::<T>();
            }
            cursor = node.parent;
        }
        None
    }

    /// Set the value of type `T` held by `scope` itself.
    pub(crate) fn provide<T: 'static>(&mut self, scope: ScopeId, value: T) -> Result<(), ScopeError> {
        let node = self
            .nodes
            .get_mut(&scope)
            .ok_or(ScopeError::UnknownScope(scope))?;
        node.values.insert(TypeId::of::<T>(), Box::new(value));
        Ok(())
    }

    /// Mutate the value of type `T` held by `scope` itself. Returns `false`
    /// if the scope holds no such value.
    pub(crate) fn update<T: 'static>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut T),
    ) -> Result<bool, ScopeError> {
        let node = self
            .nodes
            .get_mut(&scope)
            .ok_or(ScopeError::UnknownScope(scope))?;
        match node
            .values
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
        {
            Some(value) => {
                f(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Container for `panel` as seen from `scope`.
    ///
    /// Nested scopes hold no containers of their own; the lookup climbs to
    /// the root, which answers from its router.
    pub(crate) fn resolve_container(&self, scope: ScopeId, panel: &str) -> Option<ElementId> {
        let mut cursor = scope;
        loop {
            if cursor == self.root {
                return self.router.container(panel);
            }
            cursor = self.parent(cursor)?;
        }
    }

    pub(crate) fn router(&self) -> &ContainerRouter {
        &self.router
    }

    pub(crate) fn router_mut(&mut self) -> &mut ContainerRouter {
        &mut self.router
    }
}

/// Changes made by [`ContainerRouter::materialize`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Materialized {
    pub(crate) created: Vec<PanelId>,
    pub(crate) removed: Vec<PanelId>,
}

/// The root's overlay and per-panel sub-containers.
pub(crate) struct ContainerRouter {
    overlay: ElementId,
    containers: AHashMap<PanelId, ElementId>,
    order: Vec<ElementId>,
}

impl ContainerRouter {
    fn new(overlay: ElementId) -> Self {
        Self {
            overlay,
            containers: AHashMap::new(),
            order: Vec::new(),
        }
    }

    pub(crate) fn overlay(&self) -> ElementId {
        self.overlay
    }

    pub(crate) fn container(&self, panel: &str) -> Option<ElementId> {
        self.containers.get(panel).copied()
    }

    /// Make the containers match `stack`, in stack order.
    pub(crate) fn materialize(
        &mut self,
        host: &mut impl OverlayHost,
        stack: &StackSnapshot<PanelContent>,
    ) -> Materialized {
        let mut report = Materialized::default();

        let stale: Vec<PanelId> = self
            .containers
            .keys()
            .filter(|id| stack.position(id.as_str()).is_none())
            .cloned()
            .collect();
        for id in stale {
            if let Some(container) = self.containers.remove(&id) {
                host.remove_element(container);
            }
            report.removed.push(id);
        }

        for record in stack.iter() {
            if !self.containers.contains_key(record.id()) {
                let container =
                    host.create_element(Some(self.overlay), ElementKind::PanelContainer);
                self.containers.insert(record.id().clone(), container);
                report.created.push(record.id().clone());
            }
        }

        let order: Vec<ElementId> = stack
            .ids()
            .filter_map(|id| self.containers.get(id).copied())
            .collect();
        if order != self.order {
            host.reorder_children(self.overlay, &order);
            self.order = order;
        }

        report
    }

    /// Remove every container and the overlay itself.
    pub(crate) fn teardown(&mut self, host: &mut impl OverlayHost) {
        for (_, container) in self.containers.drain() {
            host.remove_element(container);
        }
        self.order.clear();
        host.remove_element(self.overlay);
    }
}
