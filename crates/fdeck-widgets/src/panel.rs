#![forbid(unsafe_code)]

//! Per-panel state and the control surface handed to panel content.
//!
//! Position, size and gesture state are transient: they live here, next to
//! the rendered panel, and never in the store. A [`PanelHandle`] reaches
//! this state weakly, so a handle kept past its panel's lifetime degrades
//! to no-ops instead of keeping the panel alive.
//!
//! # Invariants
//!
//! - `size` is never below `settings.min_size`.
//! - `position` always satisfies the region clamp for the current `size`
//!   and `bounds`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use fdeck_core::geometry::{Bounds, Point, Rect, Size};
use fdeck_core::id::PanelId;
use fdeck_layout::{
    DragController, ResizeController, centered, clamp_position, clamp_size, fit_to_region,
};
use fdeck_runtime::{CloseOutcome, CloseRequest, PanelStore};

use crate::config::PanelSettings;
use crate::content::PanelContent;

/// Geometry and gesture state of one rendered panel.
#[derive(Debug)]
pub(crate) struct PanelInstance {
    pub(crate) settings: PanelSettings,
    pub(crate) size: Size,
    pub(crate) position: Point,
    pub(crate) bounds: Bounds,
    pub(crate) edge_buffer: f64,
    pub(crate) drag: DragController,
    pub(crate) resize: ResizeController,
    /// Size or position changed since they were last written to the host.
    pub(crate) geometry_dirty: bool,
}

impl PanelInstance {
    pub(crate) fn new(settings: PanelSettings, bounds: Bounds, edge_buffer: f64) -> Self {
        let size = clamp_size(settings.size, settings.min_size);
        Self {
            settings,
            size,
            position: Point::ORIGIN,
            bounds,
            edge_buffer,
            drag: DragController::new(),
            resize: ResizeController::default(),
            geometry_dirty: true,
        }
    }

    /// Initial position: the requested one, else centered in the region.
    /// `measured` is the size the host actually rendered.
    pub(crate) fn place(&mut self, measured: Size) -> Point {
        self.size = measured;
        let desired = self
            .settings
            .position
            .unwrap_or_else(|| centered(self.bounds, measured));
        self.set_position(desired)
    }

    pub(crate) fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Apply a size, floored at the minimum. Returns the size that took effect.
    pub(crate) fn set_size(&mut self, size: Size) -> Size {
        let applied = clamp_size(size, self.settings.min_size);
        if applied != self.size {
            self.size = applied;
            self.geometry_dirty = true;
        }
        applied
    }

    /// Move the top-left corner, clamped into the region. Returns the
    /// position that took effect.
    pub(crate) fn set_position(&mut self, position: Point) -> Point {
        let applied = clamp_position(position, self.size, self.bounds, self.edge_buffer);
        if applied != self.position {
            self.position = applied;
            self.geometry_dirty = true;
        }
        applied
    }

    /// React to a new bounding region: shrink to fit, then re-clamp.
    pub(crate) fn fit_region(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        if let Some(size) = fit_to_region(self.size, bounds, self.settings.min_size) {
            self.set_size(size);
        }
        self.set_position(self.position);
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub(crate) fn has_gesture(&self) -> bool {
        self.drag.is_dragging() || self.resize.is_resizing()
    }
}

/// Control surface of one open panel, available to its content through
/// [`crate::RenderCx::panel`].
#[derive(Clone)]
pub struct PanelHandle {
    id: PanelId,
    store: PanelStore<PanelContent>,
    instance: Weak<RefCell<PanelInstance>>,
    needs_render: Rc<Cell<bool>>,
}

impl PanelHandle {
    pub(crate) fn new(
        id: PanelId,
        store: PanelStore<PanelContent>,
        instance: &Rc<RefCell<PanelInstance>>,
        needs_render: Rc<Cell<bool>>,
    ) -> Self {
        Self {
            id,
            store,
            instance: Rc::downgrade(instance),
            needs_render,
        }
    }

    #[must_use]
    pub fn id(&self) -> &PanelId {
        &self.id
    }

    /// Ask this panel to close (`reason = manual`, `source = external`).
    pub fn close(&self) -> CloseOutcome {
        self.store.request_close(CloseRequest::external(self.id.clone()))
    }

    /// Install a close handler. Returning `false` from it vetoes the close.
    /// Replaces any previous handler.
    pub fn on_close_request(&self, handler: impl Fn(&CloseRequest) -> bool + 'static) {
        self.store.set_close_handler(&self.id, Some(Rc::new(handler)));
    }

    pub fn clear_close_handler(&self) {
        self.store.set_close_handler(&self.id, None);
    }

    /// Resize the panel, floored at its minimum size. Returns the size that
    /// took effect, or `None` once the panel is no longer rendered. Asking
    /// for the current size again does not schedule a render.
    pub fn set_size(&self, width: f64, height: f64) -> Option<Size> {
        let (applied, changed) = self.with_instance(|panel| {
            let before = panel.size;
            let applied = panel.set_size(Size::new(width, height));
            (applied, applied != before)
        })?;
        if changed {
            self.needs_render.set(true);
        }
        Some(applied)
    }

    /// Move the panel, clamped into the bounding region. Returns the
    /// position that took effect, or `None` once the panel is gone.
    pub fn set_position(&self, x: f64, y: f64) -> Option<Point> {
        let (applied, changed) = self.with_instance(|panel| {
            let before = panel.position;
            let applied = panel.set_position(Point::new(x, y));
            (applied, applied != before)
        })?;
        if changed {
            self.needs_render.set(true);
        }
        Some(applied)
    }

    #[must_use]
    pub fn size(&self) -> Option<Size> {
        self.with_instance(|panel| panel.size)
    }

    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.with_instance(|panel| panel.position)
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.store.focused().is_some_and(|id| id == self.id)
    }

    /// Topmost in the stack (which may differ from focused).
    #[must_use]
    pub fn is_front(&self) -> bool {
        self.store.front().is_some_and(|id| id == self.id)
    }

    /// True while the panel is rendered by a deck.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.instance.strong_count() > 0
    }

    fn with_instance<R>(&self, f: impl FnOnce(&mut PanelInstance) -> R) -> Option<R> {
        let instance = self.instance.upgrade()?;
        let mut panel = instance.try_borrow_mut().ok()?;
        Some(f(&mut panel))
    }
}

impl fmt::Debug for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHandle")
            .field("id", &self.id)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}
