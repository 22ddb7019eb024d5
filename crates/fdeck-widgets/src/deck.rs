#![forbid(unsafe_code)]

//! The root provider.
//!
//! A [`Deck`] mounts a [`PanelStore`] onto a [`Host`]: it owns the root
//! scope (and therefore the overlay and every per-panel container), keeps
//! one [`Shell`] per placed panel, and translates host input into store
//! operations and geometry updates.
//!
//! # Rendering
//!
//! Store changes, context changes and scope changes only mark the deck as
//! needing a render. [`Deck::render`] then runs passes until nothing else
//! changes: synchronize containers with the stack, bind shells for new
//! panels, render every panel's content in its owning scope. Content that
//! mutates the store while rendering triggers another pass, up to a fixed
//! limit. [`Deck::handle_event`] renders on its own when needed; code that
//! mutates the store outside an event calls [`Deck::render`] afterwards.
//!
//! # Input
//!
//! | Event | Effect |
//! |---|---|
//! | pointer down on a grip | start resizing (primary button), no focus change |
//! | pointer down on the close button | arm the button, no focus change |
//! | pointer down on root/header/title | focus + raise, start dragging (primary) |
//! | pointer down on the body | focus + raise |
//! | any pointer down | outside-press handling for every other panel |
//! | pointer move | advance the active drag or resize |
//! | pointer up | end gestures; close if released over the armed close button |
//! | Escape press | close request for the focused panel |
//! | Tab / Shift+Tab | wrap focus inside the focused panel |
//! | Enter / Space on a close button | close request for its panel |
//! | resize | adopt the event's region, shrink panels to it and re-clamp |
//!
//! # Failure Modes
//!
//! - Mounting a second root on a store logs a warning and fails with
//!   [`ScopeError::RootAlreadyMounted`].
//! - Panels whose origin scope is gone stay in the store but are not
//!   rendered.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, debug_span, trace, warn};

use fdeck_backend::{ElementKind, Host};
use fdeck_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, PointerButton, PointerEvent, PointerEventKind,
};
use fdeck_core::geometry::Bounds;
use fdeck_core::id::{ElementId, PanelId, ScopeId};
use fdeck_runtime::{CloseRequest, PanelStore, Subscription};

use crate::config::DeckConfig;
use crate::content::{PanelContent, RenderCx};
use crate::controller::PanelController;
use crate::dismiss;
use crate::error::ScopeError;
use crate::focus_trap::{TabAction, trap_tab};
use crate::panel::{PanelHandle, PanelInstance};
use crate::scope::{Materialized, ScopeTree};
use crate::shell::{PanelPart, Shell};

/// Render passes allowed before a render gives up on settling.
const MAX_RENDER_PASSES: usize = 8;

/// What the host should do with the event it delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Suppress the host's default action (`preventDefault`).
    pub default_prevented: bool,
    /// Do not deliver the event to handlers behind the panel
    /// (`stopPropagation`).
    pub propagation_stopped: bool,
}

impl EventOutcome {
    pub const IGNORED: Self = Self {
        default_prevented: false,
        propagation_stopped: false,
    };

    const fn new(default_prevented: bool, propagation_stopped: bool) -> Self {
        Self {
            default_prevented,
            propagation_stopped,
        }
    }

    #[must_use]
    pub const fn is_ignored(self) -> bool {
        !self.default_prevented && !self.propagation_stopped
    }
}

/// Releases the store's root slot when the deck goes away.
struct RootAttachment {
    store: PanelStore<PanelContent>,
}

impl Drop for RootAttachment {
    fn drop(&mut self) {
        self.store.detach_root();
    }
}

/// Root provider binding a panel store to a host.
pub struct Deck<H: Host> {
    host: H,
    store: PanelStore<PanelContent>,
    config: DeckConfig,
    scopes: Rc<RefCell<ScopeTree>>,
    shells: AHashMap<PanelId, Shell>,
    /// Shell element -> owning panel and part.
    elements: AHashMap<ElementId, (PanelId, PanelPart)>,
    /// Close button armed by a pointer-down, with the pointer that did it.
    pressed_close: Option<(PanelId, u32)>,
    selection_suppressed: bool,
    /// Region panels are clamped into. Follows `Event::Resize`.
    region: Bounds,
    needs_render: Rc<Cell<bool>>,
    _subscription: Subscription,
    _attachment: RootAttachment,
}

impl<H: Host> Deck<H> {
    /// Mount with [`DeckConfig::default`].
    pub fn new(store: PanelStore<PanelContent>, host: H) -> Result<Self, ScopeError> {
        Self::mount(store, host, DeckConfig::default())
    }

    /// Mount `store` as the root of `host` and render the panels it holds.
    pub fn mount(
        store: PanelStore<PanelContent>,
        mut host: H,
        config: DeckConfig,
    ) -> Result<Self, ScopeError> {
        if !store.attach_root() {
            warn!("a root deck is already mounted on this store; nest with Deck::mount_scope instead");
            return Err(ScopeError::RootAlreadyMounted);
        }
        let attachment = RootAttachment {
            store: store.clone(),
        };
        for problem in config.validate() {
            warn!(%problem, "invalid deck config");
        }

        let overlay = host.create_element(None, ElementKind::Overlay);
        let region = host.bounding_region();
        let needs_render = Rc::new(Cell::new(true));
        let flag = Rc::clone(&needs_render);
        let subscription = store.subscribe(move || flag.set(true));
        debug!(overlay = overlay.get(), panels = store.len(), "deck mounted");

        let mut deck = Self {
            host,
            store,
            config,
            scopes: Rc::new(RefCell::new(ScopeTree::new(overlay))),
            shells: AHashMap::new(),
            elements: AHashMap::new(),
            pressed_close: None,
            selection_suppressed: false,
            region,
            needs_render,
            _subscription: subscription,
            _attachment: attachment,
        };
        deck.render();
        Ok(deck)
    }

    /// Tear down every element the deck created and hand the host back.
    /// The store keeps its panels and can be mounted again.
    pub fn unmount(self) -> H {
        let Self {
            mut host,
            store,
            scopes,
            shells,
            selection_suppressed,
            ..
        } = self;
        for (_, shell) in shells {
            shell.unmount(&mut host);
        }
        scopes.borrow_mut().router_mut().teardown(&mut host);
        if selection_suppressed {
            host.set_text_selection_enabled(true);
        }
        debug!(panels = store.len(), "deck unmounted");
        host
    }

    // --- scopes ----------------------------------------------------------

    #[must_use]
    pub fn root_scope(&self) -> ScopeId {
        self.scopes.borrow().root()
    }

    /// Mount a nested scope under `parent`.
    pub fn mount_scope(&mut self, parent: ScopeId) -> Result<ScopeId, ScopeError> {
        let scope = self.scopes.borrow_mut().mount(parent)?;
        self.needs_render.set(true);
        Ok(scope)
    }

    /// Unmount `scope` and everything nested in it. Panels they own are
    /// taken off screen but stay open in the store.
    pub fn unmount_scope(&mut self, scope: ScopeId) -> Result<(), ScopeError> {
        let removed = self.scopes.borrow_mut().unmount(scope)?;
        let orphaned: Vec<PanelId> = self
            .shells
            .iter()
            .filter(|(_, shell)| removed.contains(&shell.owner))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &orphaned {
            if let Some(shell) = self.forget(id) {
                shell.unmount(&mut self.host);
            }
        }
        self.restore_text_selection();
        self.needs_render.set(true);
        Ok(())
    }

    /// Store access bound to `scope`.
    pub fn controller(&self, scope: ScopeId) -> Result<PanelController, ScopeError> {
        if !self.scopes.borrow().contains(scope) {
            return Err(ScopeError::UnknownScope(scope));
        }
        Ok(self.bound_controller(scope))
    }

    #[must_use]
    pub fn root_controller(&self) -> PanelController {
        self.bound_controller(self.root_scope())
    }

    /// Provide (or replace) a context value of type `T` on `scope`.
    pub fn provide<T: 'static>(&mut self, scope: ScopeId, value: T) -> Result<(), ScopeError> {
        self.scopes.borrow_mut().provide(scope, value)?;
        self.needs_render.set(true);
        Ok(())
    }

    /// Mutate the `T` provided on `scope`. Returns `false` if `scope`
    /// provides no `T` itself.
    pub fn update_context<T: 'static>(
        &mut self,
        scope: ScopeId,
        f: impl FnOnce(&mut T),
    ) -> Result<bool, ScopeError> {
        let updated = self.scopes.borrow_mut().update(scope, f)?;
        if updated {
            self.needs_render.set(true);
        }
        Ok(updated)
    }

    /// Run `f` as code rendered inside `scope` (outside any panel).
    pub fn with_scope<R>(
        &self,
        scope: ScopeId,
        f: impl FnOnce(&RenderCx<'_>) -> R,
    ) -> Result<R, ScopeError> {
        let scopes = self.scopes.borrow();
        if !scopes.contains(scope) {
            return Err(ScopeError::UnknownScope(scope));
        }
        let cx = RenderCx::new(&scopes, scope, None, self.bound_controller(scope));
        Ok(f(&cx))
    }

    // --- accessors -------------------------------------------------------

    #[must_use]
    pub fn store(&self) -> &PanelStore<PanelContent> {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// True when a change is waiting for [`Self::render`].
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.needs_render.get()
    }

    /// The shared overlay element.
    #[must_use]
    pub fn overlay(&self) -> ElementId {
        self.scopes.borrow().router().overlay()
    }

    /// Sub-container of an open panel.
    #[must_use]
    pub fn container(&self, id: impl AsRef<str>) -> Option<ElementId> {
        self.scopes.borrow().router().container(id.as_ref())
    }

    /// Element of a rendered panel's chrome.
    #[must_use]
    pub fn panel_element(&self, id: impl AsRef<str>, part: PanelPart) -> Option<ElementId> {
        self.shells
            .get(id.as_ref())
            .map(|shell| shell.elements.get(part))
    }

    /// Control surface of a rendered panel.
    #[must_use]
    pub fn panel(&self, id: impl AsRef<str>) -> Option<PanelHandle> {
        self.shells.get(id.as_ref()).map(|shell| shell.handle.clone())
    }

    /// True if the panel is on screen (open and owned by a mounted scope).
    #[must_use]
    pub fn is_placed(&self, id: impl AsRef<str>) -> bool {
        self.shells.contains_key(id.as_ref())
    }

    // --- rendering -------------------------------------------------------

    /// Bring the host up to date with the store, scopes and context.
    pub fn render(&mut self) {
        let _span = debug_span!("fdeck.render", panels = self.store.len()).entered();
        let mut passes = 0;
        while self.needs_render.replace(false) {
            passes += 1;
            self.render_pass();
            if passes == MAX_RENDER_PASSES && self.needs_render.get() {
                warn!(passes, "panel content keeps changing the store while rendering; deferring");
                break;
            }
        }
        self.sync_shells();
    }

    fn render_pass(&mut self) {
        let stack = self.store.stack();

        let materialized = self
            .scopes
            .borrow_mut()
            .router_mut()
            .materialize(&mut self.host, &stack);
        if materialized != Materialized::default() {
            trace!(
                created = materialized.created.len(),
                removed = materialized.removed.len(),
                "containers synchronized"
            );
        }
        for id in &materialized.removed {
            self.forget(id);
        }
        if !materialized.removed.is_empty() {
            self.restore_text_selection();
        }

        let bounds = self.region;
        for record in stack.iter() {
            if self.shells.contains_key(record.id()) {
                continue;
            }
            let placement = {
                let scopes = self.scopes.borrow();
                scopes.owner_of(record.origin()).and_then(|owner| {
                    scopes
                        .resolve_container(owner, record.id().as_str())
                        .map(|container| (owner, container))
                })
            };
            let Some((owner, container)) = placement else {
                trace!(panel = %record.id(), "origin scope not mounted; panel left unplaced");
                continue;
            };
            let settings = self.config.resolve(record.options());
            let instance = PanelInstance::new(settings, bounds, self.config.edge_buffer);
            let shell = Shell::mount(
                &mut self.host,
                container,
                owner,
                record.id().clone(),
                instance,
                self.store.clone(),
                Rc::clone(&self.needs_render),
            );
            for (element, part) in shell.elements.parts() {
                self.elements.insert(element, (record.id().clone(), part));
            }
            self.shells.insert(record.id().clone(), shell);
        }

        let scopes = self.scopes.borrow();
        for record in stack.iter() {
            let Some(shell) = self.shells.get_mut(record.id()) else {
                continue;
            };
            let body = {
                let controller = PanelController::new(
                    self.store.clone(),
                    Rc::downgrade(&self.scopes),
                    shell.owner,
                );
                let cx = RenderCx::new(&scopes, shell.owner, Some(&shell.handle), controller);
                record.content().render(&cx)
            };
            shell.show(&mut self.host, body.into_lines());
        }
    }

    fn sync_shells(&mut self) {
        let focused = self.store.focused();
        let front = self.store.front();
        for (id, shell) in &mut self.shells {
            shell.sync(
                &mut self.host,
                focused.as_ref() == Some(id),
                front.as_ref() == Some(id),
            );
        }
    }

    fn bound_controller(&self, scope: ScopeId) -> PanelController {
        PanelController::new(self.store.clone(), Rc::downgrade(&self.scopes), scope)
    }

    /// Drop bookkeeping for a panel. The caller decides about its elements.
    fn forget(&mut self, id: &PanelId) -> Option<Shell> {
        let shell = self.shells.remove(id)?;
        for (element, _) in shell.elements.parts() {
            self.elements.remove(&element);
        }
        if self.pressed_close.as_ref().is_some_and(|(pressed, _)| pressed == id) {
            self.pressed_close = None;
        }
        Some(shell)
    }

    // --- input -----------------------------------------------------------

    /// Feed one host event to the deck.
    pub fn handle_event(&mut self, event: &Event) -> EventOutcome {
        if self.needs_render.get() {
            self.render();
        }
        let outcome = match event {
            Event::Key(key) => self.handle_key(key, event),
            Event::Pointer(pointer) => self.handle_pointer(pointer, event),
            Event::Resize { width, height } => {
                self.handle_resize(*width, *height);
                EventOutcome::IGNORED
            }
        };
        if self.needs_render.get() {
            self.render();
        } else {
            self.sync_shells();
        }
        outcome
    }

    fn handle_key(&mut self, key: &KeyEvent, event: &Event) -> EventOutcome {
        match key.code {
            KeyCode::Escape if dismiss::is_dismiss_key(key) => self.dismiss_focused(event),
            KeyCode::Tab if key.kind != KeyEventKind::Release => self.wrap_tab(key),
            KeyCode::Enter | KeyCode::Char(' ') if key.kind == KeyEventKind::Press => {
                self.activate_close_button()
            }
            _ => EventOutcome::IGNORED,
        }
    }

    /// Enter or Space on a focused close button closes its panel.
    fn activate_close_button(&mut self) -> EventOutcome {
        let Some((id, PanelPart::CloseButton)) = self
            .host
            .active_element()
            .and_then(|active| self.elements.get(&active).cloned())
        else {
            return EventOutcome::IGNORED;
        };
        let outcome = self.store.request_close(CloseRequest::external(id.clone()));
        debug!(panel = %id, ?outcome, "close button (keyboard)");
        EventOutcome::new(true, true)
    }

    fn dismiss_focused(&mut self, event: &Event) -> EventOutcome {
        if self.shells.is_empty() {
            return EventOutcome::IGNORED;
        }
        let request = self.store.focused().and_then(|id| {
            let shell = self.shells.get(&id)?;
            dismiss::escape_request(&id, &shell.instance.borrow().settings, event)
        });
        if let Some(request) = request {
            let panel = request.panel_id.clone();
            let outcome = self.store.request_close(request);
            debug!(panel = %panel, ?outcome, "escape");
        }
        EventOutcome::new(false, true)
    }

    fn wrap_tab(&mut self, key: &KeyEvent) -> EventOutcome {
        let Some(root) = self
            .store
            .focused()
            .and_then(|id| self.shells.get(&id).map(|shell| shell.elements.root))
        else {
            return EventOutcome::IGNORED;
        };
        let Some(active) = self
            .host
            .active_element()
            .filter(|&active| self.host.contains(root, active))
        else {
            return EventOutcome::IGNORED;
        };
        let focusables = self.host.focusable_descendants(root);
        let action = trap_tab(&focusables, Some(active), key.shift());
        if let TabAction::MoveTo(target) = action {
            self.host.focus_element(target);
        }
        EventOutcome::new(action.prevents_default(), false)
    }

    fn handle_pointer(&mut self, pointer: &PointerEvent, event: &Event) -> EventOutcome {
        match pointer.kind {
            PointerEventKind::Down => {
                let _span =
                    debug_span!("fdeck.pointer_down", pointer = pointer.pointer_id).entered();
                let outcome = match pointer.target.and_then(|target| self.resolve(target)) {
                    Some((id, part)) => self.press_panel(&id, part, pointer),
                    None => EventOutcome::IGNORED,
                };
                self.press_outside(pointer.target, event);
                outcome
            }
            PointerEventKind::Move => {
                self.advance_gestures(pointer);
                EventOutcome::IGNORED
            }
            PointerEventKind::Up => self.release(pointer, true),
            PointerEventKind::Cancel => self.release(pointer, false),
        }
    }

    /// Panel and chrome part an element belongs to. Elements inside the
    /// body (panel content) resolve to [`PanelPart::Body`].
    fn resolve(&self, target: ElementId) -> Option<(PanelId, PanelPart)> {
        let mut cursor = Some(target);
        while let Some(element) = cursor {
            if let Some((id, part)) = self.elements.get(&element) {
                return Some((id.clone(), *part));
            }
            cursor = self.host.parent(element);
        }
        None
    }

    fn press_panel(&mut self, id: &PanelId, part: PanelPart, pointer: &PointerEvent) -> EventOutcome {
        let Some(shell) = self.shells.get_mut(id) else {
            return EventOutcome::IGNORED;
        };
        let primary = pointer.button == PointerButton::Primary;
        match part {
            PanelPart::Grip(grip) => {
                if primary {
                    shell
                        .instance
                        .borrow_mut()
                        .resize
                        .begin(grip, pointer.pointer_id);
                    debug!(panel = %id, grip = grip.name(), "resize started");
                    self.suppress_text_selection();
                }
                EventOutcome::new(true, true)
            }
            PanelPart::CloseButton => {
                self.pressed_close = Some((id.clone(), pointer.pointer_id));
                EventOutcome::new(false, true)
            }
            PanelPart::Root | PanelPart::Header | PanelPart::Title | PanelPart::Body => {
                let focused = self.store.focused().as_ref() == Some(id);
                let root = shell.elements.root;
                let mut dragging = false;
                if part.starts_drag() && primary {
                    let capture = if part == PanelPart::Root {
                        root
                    } else {
                        shell.elements.header
                    };
                    let origin = self
                        .host
                        .element_rect(root)
                        .map_or_else(|| shell.instance.borrow().position, |rect| rect.origin());
                    shell
                        .instance
                        .borrow_mut()
                        .drag
                        .begin(pointer.pointer_id, pointer.position, origin);
                    shell.drag_capture = Some((capture, pointer.pointer_id));
                    self.host.set_pointer_capture(capture, pointer.pointer_id);
                    debug!(panel = %id, "drag started");
                    dragging = true;
                }
                if dragging {
                    self.suppress_text_selection();
                }
                self.store.focus(Some(id));
                self.host.focus_element(root);
                EventOutcome::new(dragging || !focused, true)
            }
        }
    }

    /// Outside-press handling for every placed panel not containing `target`.
    fn press_outside(&mut self, target: Option<ElementId>, event: &Event) {
        let stack = self.store.stack();
        for id in stack.ids() {
            let Some(shell) = self.shells.get(id) else {
                continue;
            };
            if target.is_some_and(|target| self.host.contains(shell.container, target)) {
                continue;
            }
            let focused = self.store.focused().as_ref() == Some(id);
            let press = dismiss::outside_press(id, &shell.instance.borrow().settings, focused, event);
            if press.blur {
                self.store.blur();
            }
            if let Some(request) = press.close {
                let outcome = self.store.request_close(request);
                debug!(panel = %id, ?outcome, "outside press");
            }
        }
    }

    fn advance_gestures(&mut self, pointer: &PointerEvent) {
        for shell in self.shells.values() {
            let mut instance = shell.instance.borrow_mut();
            if let Some(target) = instance.drag.target(pointer.pointer_id, pointer.position) {
                instance.set_position(target);
            } else if let Some(grip) = instance.resize.grip_for(pointer.pointer_id) {
                let rect = self
                    .host
                    .element_rect(shell.elements.root)
                    .unwrap_or_else(|| instance.rect());
                let step = grip.propose(pointer.position, rect, instance.bounds, instance.edge_buffer);
                let applied = instance.set_size(step.size);
                let position = grip.anchor(step, rect, applied);
                instance.set_position(position);
            }
        }
    }

    /// End gestures held by the pointer. `completed` is false for a cancel,
    /// which never activates the close button.
    fn release(&mut self, pointer: &PointerEvent, completed: bool) -> EventOutcome {
        let pointer_id = pointer.pointer_id;
        let mut ended = false;
        for shell in self.shells.values_mut() {
            let mut instance = shell.instance.borrow_mut();
            if instance.drag.end(pointer_id) {
                ended = true;
                if let Some((element, captured)) = shell.drag_capture.take() {
                    self.host.release_pointer_capture(element, captured);
                }
                debug!(panel = %shell.handle.id(), "drag ended");
            }
            if instance.resize.end(pointer_id) {
                ended = true;
                debug!(panel = %shell.handle.id(), "resize ended");
            }
        }
        if ended {
            self.restore_text_selection();
        }

        match self.pressed_close.take() {
            Some((id, pressed_by)) if pressed_by == pointer_id => {
                let released_on_button = completed
                    && pointer
                        .target
                        .and_then(|target| self.resolve(target))
                        .is_some_and(|(hit, part)| hit == id && part == PanelPart::CloseButton);
                if released_on_button {
                    let outcome = self.store.request_close(CloseRequest::external(id.clone()));
                    debug!(panel = %id, ?outcome, "close button");
                    return EventOutcome::new(false, true);
                }
            }
            other => self.pressed_close = other,
        }
        EventOutcome::IGNORED
    }

    fn handle_resize(&mut self, width: f64, height: f64) {
        let bounds = Bounds::from_viewport(width, height);
        if bounds == self.region {
            return;
        }
        debug!(width, height, "bounding region changed");
        self.region = bounds;
        for shell in self.shells.values() {
            shell.instance.borrow_mut().fit_region(bounds);
        }
    }

    fn suppress_text_selection(&mut self) {
        if !self.selection_suppressed {
            self.host.set_text_selection_enabled(false);
            self.selection_suppressed = true;
        }
    }

    /// Re-enable text selection once no panel has a gesture in flight.
    fn restore_text_selection(&mut self) {
        if self.selection_suppressed
            && !self
                .shells
                .values()
                .any(|shell| shell.instance.borrow().has_gesture())
        {
            self.host.set_text_selection_enabled(true);
            self.selection_suppressed = false;
        }
    }
}

impl<H: Host> fmt::Debug for Deck<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deck")
            .field("root", &self.root_scope())
            .field("panels", &self.store.len())
            .field("placed", &self.shells.len())
            .field("needs_render", &self.needs_render.get())
            .finish_non_exhaustive()
    }
}
