#![forbid(unsafe_code)]

//! Panel chrome.
//!
//! Every rendered panel is wrapped in the same element structure:
//!
//! ```text
//! PanelRoot                 focusable, dialog semantics
//! ├── ResizeGrip x 8        edges first, then corners
//! ├── Header                drag handle
//! │   ├── Title
//! │   └── CloseButton
//! └── Body                  panel content
//! ```
//!
//! The shell owns those elements and the panel's [`PanelInstance`]. Host
//! writes are incremental: text, chrome and geometry are only pushed when
//! they changed since the last write.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use fdeck_backend::{ChromeState, ElementKind, Host, OverlayHost};
use fdeck_core::id::{ElementId, PanelId, ScopeId};
use fdeck_layout::ResizeGrip;
use fdeck_runtime::PanelStore;

use crate::content::PanelContent;
use crate::panel::{PanelHandle, PanelInstance};

/// Named parts of a panel's chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelPart {
    Root,
    Header,
    Title,
    CloseButton,
    Body,
    Grip(ResizeGrip),
}

impl PanelPart {
    /// Pointer-down on this part starts a drag.
    pub(crate) const fn starts_drag(self) -> bool {
        matches!(self, Self::Root | Self::Header | Self::Title)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ShellElements {
    pub(crate) root: ElementId,
    pub(crate) header: ElementId,
    pub(crate) title: ElementId,
    pub(crate) close: ElementId,
    pub(crate) body: ElementId,
    pub(crate) grips: [(ResizeGrip, ElementId); 8],
}

impl ShellElements {
    fn build(host: &mut impl OverlayHost, container: ElementId) -> Self {
        let root = host.create_element(Some(container), ElementKind::PanelRoot);
        let grips = ResizeGrip::ALL.map(|grip| {
            (grip, host.create_element(Some(root), ElementKind::ResizeGrip(grip)))
        });
        let header = host.create_element(Some(root), ElementKind::Header);
        let title = host.create_element(Some(header), ElementKind::Title);
        let close = host.create_element(Some(header), ElementKind::CloseButton);
        let body = host.create_element(Some(root), ElementKind::Body);
        Self {
            root,
            header,
            title,
            close,
            body,
            grips,
        }
    }

    pub(crate) fn get(&self, part: PanelPart) -> ElementId {
        match part {
            PanelPart::Root => self.root,
            PanelPart::Header => self.header,
            PanelPart::Title => self.title,
            PanelPart::CloseButton => self.close,
            PanelPart::Body => self.body,
            PanelPart::Grip(grip) => self
                .grips
                .iter()
                .find(|(g, _)| *g == grip)
                .map_or(self.root, |&(_, element)| element),
        }
    }

    pub(crate) fn parts(&self) -> impl Iterator<Item = (ElementId, PanelPart)> + '_ {
        [
            (self.root, PanelPart::Root),
            (self.header, PanelPart::Header),
            (self.title, PanelPart::Title),
            (self.close, PanelPart::CloseButton),
            (self.body, PanelPart::Body),
        ]
        .into_iter()
        .chain(
            self.grips
                .iter()
                .map(|&(grip, element)| (element, PanelPart::Grip(grip))),
        )
    }
}

/// A panel bound into its container.
pub(crate) struct Shell {
    pub(crate) elements: ShellElements,
    pub(crate) instance: Rc<RefCell<PanelInstance>>,
    pub(crate) handle: PanelHandle,
    /// Scope the content renders in.
    pub(crate) owner: ScopeId,
    pub(crate) container: ElementId,
    /// Element holding pointer capture for an active drag.
    pub(crate) drag_capture: Option<(ElementId, u32)>,
    lines: Option<Vec<String>>,
    chrome: Option<ChromeState>,
}

impl Shell {
    /// Build the chrome inside `container`, size and place the panel, and
    /// give its root element host focus.
    pub(crate) fn mount<H: Host>(
        host: &mut H,
        container: ElementId,
        owner: ScopeId,
        id: PanelId,
        mut instance: PanelInstance,
        store: PanelStore<PanelContent>,
        needs_render: Rc<Cell<bool>>,
    ) -> Self {
        let elements = ShellElements::build(host, container);
        if let Some(title) = &instance.settings.title {
            host.set_text(elements.title, std::slice::from_ref(title));
        }

        host.apply_size(elements.root, instance.size);
        let measured = host
            .element_rect(elements.root)
            .map_or(instance.size, |rect| rect.size());
        instance.place(measured);
        host.apply_position(elements.root, instance.position);
        instance.geometry_dirty = false;
        trace!(panel = %id, x = instance.position.x, y = instance.position.y, "shell mounted");

        let instance = Rc::new(RefCell::new(instance));
        let handle = PanelHandle::new(id, store, &instance, needs_render);
        host.focus_element(elements.root);

        Self {
            elements,
            instance,
            handle,
            owner,
            container,
            drag_capture: None,
            lines: None,
            chrome: None,
        }
    }

    pub(crate) fn id(&self) -> &PanelId {
        self.handle.id()
    }

    /// Show freshly rendered content.
    pub(crate) fn show(&mut self, host: &mut impl OverlayHost, lines: Vec<String>) {
        if self.lines.as_ref() != Some(&lines) {
            host.set_text(self.elements.body, &lines);
            self.lines = Some(lines);
        }
    }

    /// Push chrome state and pending geometry to the host.
    pub(crate) fn sync<H: Host>(&mut self, host: &mut H, focused: bool, front: bool) {
        let mut instance = self.instance.borrow_mut();
        let chrome = ChromeState {
            title: instance.settings.title.clone(),
            focused,
            dragging: instance.is_dragging(),
            front,
        };
        if self.chrome.as_ref() != Some(&chrome) {
            host.set_chrome(self.elements.root, &chrome);
            self.chrome = Some(chrome);
        }
        if instance.geometry_dirty {
            host.apply_size(self.elements.root, instance.size);
            host.apply_position(self.elements.root, instance.position);
            instance.geometry_dirty = false;
        }
    }

    /// Remove the chrome. The container is left to the router.
    pub(crate) fn unmount(self, host: &mut impl OverlayHost) {
        trace!(panel = %self.id(), "shell unmounted");
        host.remove_element(self.elements.root);
    }
}
