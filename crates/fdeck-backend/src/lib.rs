#![forbid(unsafe_code)]
#![doc = "Host traits for floatdeck: the boundary between the panel runtime and the platform."]
#![doc = ""]
#![doc = "A browser embedding maps these calls onto DOM nodes, `getBoundingClientRect`,"]
#![doc = "`HTMLElement.focus` and `setPointerCapture`. [`HeadlessHost`] implements them in"]
#![doc = "memory for tests and non-DOM embedders."]

pub mod headless;

use fdeck_core::geometry::{Bounds, Point, Rect, Size};
use fdeck_core::id::ElementId;
use fdeck_layout::ResizeGrip;

pub use headless::HeadlessHost;

/// Role of an element created by the panel runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// The shared screen-level layer every panel renders into.
    Overlay,
    /// Per-panel sub-container inside the overlay. Child order is z-order.
    PanelContainer,
    /// The panel itself. Hosts present it as a non-blocking dialog
    /// (`role="dialog"`, `aria-modal="false"`) and make it focusable.
    PanelRoot,
    /// Title bar; pointer-down here starts a drag.
    Header,
    Title,
    CloseButton,
    /// Region holding the panel's content.
    Body,
    ResizeGrip(ResizeGrip),
    /// Element owned by panel content rather than by the runtime.
    Content,
}

/// Visual state of a panel's chrome, pushed to the host for styling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromeState {
    pub title: Option<String>,
    pub focused: bool,
    pub dragging: bool,
    /// Topmost panel in the stack.
    pub front: bool,
}

/// Element tree management.
pub trait OverlayHost {
    /// Create an element under `parent`, or under the document root when
    /// `parent` is `None`. New children are appended last.
    fn create_element(&mut self, parent: Option<ElementId>, kind: ElementKind) -> ElementId;

    /// Remove an element and its whole subtree. Unknown ids are ignored.
    fn remove_element(&mut self, element: ElementId);

    /// Reorder `parent`'s children to follow `order`. Children missing from
    /// `order` keep their relative order ahead of the listed ones.
    fn reorder_children(&mut self, parent: ElementId, order: &[ElementId]);

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn kind(&self, element: ElementId) -> Option<ElementKind>;

    /// Replace the text lines shown by `element`.
    fn set_text(&mut self, element: ElementId, lines: &[String]);

    fn set_chrome(&mut self, root: ElementId, chrome: &ChromeState);

    /// True if `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}

/// Geometry queries and writes.
pub trait ElementGeometry {
    /// The region panels are clamped into (the viewport for browsers).
    fn bounding_region(&self) -> Bounds;

    /// Rendered rectangle, or `None` once the element is gone.
    fn element_rect(&self, element: ElementId) -> Option<Rect>;

    fn apply_size(&mut self, element: ElementId, size: Size);

    /// Move the element's top-left corner (a CSS transform on the web).
    fn apply_position(&mut self, element: ElementId, position: Point);
}

/// Keyboard focus.
pub trait FocusHost {
    fn focus_element(&mut self, element: ElementId);

    fn active_element(&self) -> Option<ElementId>;

    /// Tabbable descendants of `element` in document order.
    fn focusable_descendants(&self, element: ElementId) -> Vec<ElementId>;
}

/// Pointer capture and global text-selection suppression.
pub trait PointerHost {
    fn set_pointer_capture(&mut self, element: ElementId, pointer_id: u32);

    fn release_pointer_capture(&mut self, element: ElementId, pointer_id: u32);

    /// Toggle document-wide text selection (`user-select: none` while dragging).
    fn set_text_selection_enabled(&mut self, enabled: bool);
}

/// Everything a deck needs from its host.
pub trait Host: OverlayHost + ElementGeometry + FocusHost + PointerHost {}

impl<T> Host for T where T: OverlayHost + ElementGeometry + FocusHost + PointerHost {}
