#![forbid(unsafe_code)]

//! In-memory host.
//!
//! Keeps a plain element tree with enough geometry, focus and capture state
//! to drive a deck without a browser. Rectangles follow a simple model: an
//! element that was given a size reports its own rectangle (at its applied
//! position, or the origin); any other element reports the rectangle of its
//! nearest sized ancestor. The overlay always reports the viewport.
//!
//! # Invariants
//!
//! - Removing an element removes its subtree, drops pointer captures held
//!   by it, and blurs the active element if it was inside.
//! - Children keep insertion order unless reordered.

use ahash::AHashMap;

use fdeck_core::geometry::{Bounds, Point, Rect, Size};
use fdeck_core::id::ElementId;

use crate::{ChromeState, ElementGeometry, ElementKind, FocusHost, OverlayHost, PointerHost};

#[derive(Debug, Clone)]
struct Node {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    text: Vec<String>,
    chrome: Option<ChromeState>,
    size: Option<Size>,
    position: Option<Point>,
    focusable: bool,
}

impl Node {
    fn new(kind: ElementKind, parent: Option<ElementId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            text: Vec::new(),
            chrome: None,
            size: None,
            position: None,
            focusable: false,
        }
    }
}

/// Deterministic host backed by an in-memory element tree.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    nodes: AHashMap<ElementId, Node>,
    /// Children of the document root.
    roots: Vec<ElementId>,
    next_id: u64,
    viewport: Bounds,
    active: Option<ElementId>,
    captures: AHashMap<u32, ElementId>,
    text_selection: bool,
}

impl HeadlessHost {
    /// Create a host with a viewport of the given size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            nodes: AHashMap::new(),
            roots: Vec::new(),
            next_id: 1,
            viewport: Bounds::from_viewport(width, height),
            active: None,
            captures: AHashMap::new(),
            text_selection: true,
        }
    }

    /// Resize the viewport. The caller still has to deliver the matching
    /// `Event::Resize` to the deck.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Bounds::from_viewport(width, height);
    }

    /// Append a tabbable content element under `parent`.
    pub fn add_focusable(&mut self, parent: ElementId) -> ElementId {
        let id = self.create_element(Some(parent), ElementKind::Content);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.focusable = true;
        }
        id
    }

    #[must_use]
    pub fn exists(&self, element: ElementId) -> bool {
        self.nodes.contains_key(&element)
    }

    #[must_use]
    pub fn text(&self, element: ElementId) -> &[String] {
        self.nodes
            .get(&element)
            .map(|node| node.text.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn chrome(&self, element: ElementId) -> Option<&ChromeState> {
        self.nodes.get(&element).and_then(|node| node.chrome.as_ref())
    }

    #[must_use]
    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(&element)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Children of the document root.
    #[must_use]
    pub fn top_level(&self) -> &[ElementId] {
        &self.roots
    }

    /// Descendants of `element` (excluding itself) with the given kind, in
    /// document order.
    #[must_use]
    pub fn descendants_of_kind(&self, element: ElementId, kind: ElementKind) -> Vec<ElementId> {
        let mut found = Vec::new();
        self.walk(element, &mut |id, node| {
            if id != element && node.kind == kind {
                found.push(id);
            }
        });
        found
    }

    /// Every live element with the given kind.
    #[must_use]
    pub fn elements_of_kind(&self, kind: ElementKind) -> Vec<ElementId> {
        let mut found = Vec::new();
        for &root in &self.roots {
            self.walk(root, &mut |id, node| {
                if node.kind == kind {
                    found.push(id);
                }
            });
        }
        found
    }

    /// Element currently capturing `pointer_id`.
    #[must_use]
    pub fn captured_by(&self, pointer_id: u32) -> Option<ElementId> {
        self.captures.get(&pointer_id).copied()
    }

    #[must_use]
    pub const fn text_selection_enabled(&self) -> bool {
        self.text_selection
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.nodes.len()
    }

    fn walk(&self, element: ElementId, visit: &mut impl FnMut(ElementId, &Node)) {
        if let Some(node) = self.nodes.get(&element) {
            visit(element, node);
            for &child in &node.children {
                self.walk(child, visit);
            }
        }
    }

    fn subtree(&self, element: ElementId) -> Vec<ElementId> {
        let mut ids = Vec::new();
        self.walk(element, &mut |id, _| ids.push(id));
        ids
    }

    fn siblings_mut(&mut self, parent: Option<ElementId>) -> Option<&mut Vec<ElementId>> {
        match parent {
            Some(parent) => self.nodes.get_mut(&parent).map(|node| &mut node.children),
            None => Some(&mut self.roots),
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

impl OverlayHost for HeadlessHost {
    fn create_element(&mut self, parent: Option<ElementId>, kind: ElementKind) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        // An unknown parent degrades to the document root.
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        let mut node = Node::new(kind, parent);
        node.focusable = matches!(kind, ElementKind::CloseButton);
        self.nodes.insert(id, node);
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.push(id);
        }
        id
    }

    fn remove_element(&mut self, element: ElementId) {
        let Some(parent) = self.nodes.get(&element).map(|node| node.parent) else {
            return;
        };
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&id| id != element);
        }
        for id in self.subtree(element) {
            self.nodes.remove(&id);
            if self.active == Some(id) {
                self.active = None;
            }
            self.captures.retain(|_, owner| *owner != id);
        }
    }

    fn reorder_children(&mut self, parent: ElementId, order: &[ElementId]) {
        let Some(node) = self.nodes.get_mut(&parent) else {
            return;
        };
        let mut reordered: Vec<ElementId> = node
            .children
            .iter()
            .copied()
            .filter(|id| !order.contains(id))
            .collect();
        reordered.extend(order.iter().copied().filter(|id| node.children.contains(id)));
        node.children = reordered;
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(&element).and_then(|node| node.parent)
    }

    fn kind(&self, element: ElementId) -> Option<ElementKind> {
        self.nodes.get(&element).map(|node| node.kind)
    }

    fn set_text(&mut self, element: ElementId, lines: &[String]) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.text = lines.to_vec();
        }
    }

    fn set_chrome(&mut self, root: ElementId, chrome: &ChromeState) {
        if let Some(node) = self.nodes.get_mut(&root) {
            node.chrome = Some(chrome.clone());
        }
    }
}

impl ElementGeometry for HeadlessHost {
    fn bounding_region(&self) -> Bounds {
        self.viewport
    }

    fn element_rect(&self, element: ElementId) -> Option<Rect> {
        let mut cursor = Some(element);
        while let Some(id) = cursor {
            let node = self.nodes.get(&id)?;
            if node.kind == ElementKind::Overlay {
                let b = self.viewport;
                return Some(Rect::new(b.left, b.top, b.width(), b.height()));
            }
            if let Some(size) = node.size {
                let origin = node.position.unwrap_or(Point::ORIGIN);
                return Some(Rect::from_parts(origin, size));
            }
            cursor = node.parent;
        }
        // Detached from any sized ancestor: a zero-size box at the origin.
        self.nodes.get(&element).map(|_| Rect::default())
    }

    fn apply_size(&mut self, element: ElementId, size: Size) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.size = Some(size);
        }
    }

    fn apply_position(&mut self, element: ElementId, position: Point) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.position = Some(position);
        }
    }
}

impl FocusHost for HeadlessHost {
    fn focus_element(&mut self, element: ElementId) {
        if self.nodes.contains_key(&element) {
            self.active = Some(element);
        }
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    fn focusable_descendants(&self, element: ElementId) -> Vec<ElementId> {
        let mut found = Vec::new();
        self.walk(element, &mut |id, node| {
            if id != element && node.focusable {
                found.push(id);
            }
        });
        found
    }
}

impl PointerHost for HeadlessHost {
    fn set_pointer_capture(&mut self, element: ElementId, pointer_id: u32) {
        if self.nodes.contains_key(&element) {
            self.captures.insert(pointer_id, element);
        }
    }

    fn release_pointer_capture(&mut self, element: ElementId, pointer_id: u32) {
        if self.captures.get(&pointer_id) == Some(&element) {
            self.captures.remove(&pointer_id);
        }
    }

    fn set_text_selection_enabled(&mut self, enabled: bool) {
        self.text_selection = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(host: &mut HeadlessHost) -> (ElementId, ElementId, ElementId) {
        let overlay = host.create_element(None, ElementKind::Overlay);
        let container = host.create_element(Some(overlay), ElementKind::PanelContainer);
        let root = host.create_element(Some(container), ElementKind::PanelRoot);
        (overlay, container, root)
    }

    #[test]
    fn unsized_elements_report_ancestor_rect() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let (_, _, root) = panel(&mut host);
        let header = host.create_element(Some(root), ElementKind::Header);
        host.apply_size(root, Size::new(300.0, 200.0));
        host.apply_position(root, Point::new(10.0, 20.0));
        assert_eq!(host.element_rect(root), Some(Rect::new(10.0, 20.0, 300.0, 200.0)));
        assert_eq!(host.element_rect(header), host.element_rect(root));
    }

    #[test]
    fn overlay_reports_viewport() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let (overlay, container, _) = panel(&mut host);
        assert_eq!(host.element_rect(overlay), Some(Rect::new(0.0, 0.0, 800.0, 600.0)));
        assert_eq!(host.element_rect(container), host.element_rect(overlay));
        host.set_viewport(400.0, 300.0);
        assert_eq!(host.bounding_region(), Bounds::from_viewport(400.0, 300.0));
    }

    #[test]
    fn remove_drops_subtree_focus_and_capture() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let (overlay, container, root) = panel(&mut host);
        let input = host.add_focusable(root);
        host.focus_element(input);
        host.set_pointer_capture(root, 1);

        host.remove_element(container);
        assert!(!host.exists(root));
        assert!(!host.exists(input));
        assert_eq!(host.active_element(), None);
        assert_eq!(host.captured_by(1), None);
        assert!(host.children(overlay).is_empty());
        assert_eq!(host.element_rect(root), None);
    }

    #[test]
    fn reorder_moves_listed_children_last() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let overlay = host.create_element(None, ElementKind::Overlay);
        let a = host.create_element(Some(overlay), ElementKind::PanelContainer);
        let b = host.create_element(Some(overlay), ElementKind::PanelContainer);
        let c = host.create_element(Some(overlay), ElementKind::PanelContainer);
        host.reorder_children(overlay, &[c, a]);
        assert_eq!(host.children(overlay), &[b, c, a]);
    }

    #[test]
    fn focusable_descendants_in_document_order() {
        let mut host = HeadlessHost::new(800.0, 600.0);
        let (_, _, root) = panel(&mut host);
        let header = host.create_element(Some(root), ElementKind::Header);
        let close = host.create_element(Some(header), ElementKind::CloseButton);
        let body = host.create_element(Some(root), ElementKind::Body);
        let first = host.add_focusable(body);
        let second = host.add_focusable(body);
        assert_eq!(host.focusable_descendants(root), vec![close, first, second]);
        assert_eq!(host.descendants_of_kind(root, ElementKind::Body), vec![body]);
    }

    #[test]
    fn capture_release_requires_owner() {
        let mut host = HeadlessHost::default();
        let (_, container, root) = panel(&mut host);
        host.set_pointer_capture(root, 3);
        host.release_pointer_capture(container, 3);
        assert_eq!(host.captured_by(3), Some(root));
        host.release_pointer_capture(root, 3);
        assert_eq!(host.captured_by(3), None);
    }

    #[test]
    fn text_and_chrome_round_trip() {
        let mut host = HeadlessHost::default();
        let (_, _, root) = panel(&mut host);
        host.set_text(root, &["hello".to_string()]);
        assert_eq!(host.text(root), ["hello".to_string()]);
        let chrome = ChromeState {
            title: Some("Inbox".into()),
            focused: true,
            ..ChromeState::default()
        };
        host.set_chrome(root, &chrome);
        assert_eq!(host.chrome(root), Some(&chrome));
        assert!(host.text_selection_enabled());
        host.set_text_selection_enabled(false);
        assert!(!host.text_selection_enabled());
    }
}
