#![forbid(unsafe_code)]

//! Mounting, scopes and content routing, driven through `HeadlessHost`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use fdeck_backend::{ElementGeometry, ElementKind, FocusHost, HeadlessHost, OverlayHost};
use fdeck_core::geometry::{Point, Rect, Size};
use fdeck_core::id::PanelId;
use fdeck_runtime::{PanelOptions, PanelStore, SequentialIds};
use fdeck_widgets::{
    Deck, DeckConfig, PanelContent, PanelController, PanelPart, ScopeError, UsageError,
};
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Clone, Default)]
struct WarnCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}

fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let capture = WarnCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    let messages = capture.messages.lock().unwrap().clone();
    (result, messages)
}

fn store() -> PanelStore<PanelContent> {
    PanelStore::with_id_generator(SequentialIds::default())
}

fn deck() -> Deck<HeadlessHost> {
    Deck::new(store(), HeadlessHost::new(1000.0, 800.0)).unwrap()
}

#[derive(Debug)]
struct Theme(&'static str);

#[derive(Debug)]
struct Count(u32);

#[test]
fn create_before_mount_warns_and_returns_none() {
    let store = store();
    let (id, warnings) = capture_warnings(|| store.create(PanelContent::empty(), PanelOptions::new()));
    assert_eq!(id, None);
    assert!(store.is_empty());
    assert!(
        warnings.iter().any(|w| w.contains("before a deck was mounted")),
        "{warnings:?}"
    );
}

#[test]
fn second_root_is_rejected_with_warning() {
    let store = store();
    let first = Deck::new(store.clone(), HeadlessHost::default()).unwrap();
    let (second, warnings) =
        capture_warnings(|| Deck::new(store.clone(), HeadlessHost::default()).map(|_| ()));
    assert_eq!(second, Err(ScopeError::RootAlreadyMounted));
    assert!(warnings.iter().any(|w| w.contains("already mounted")), "{warnings:?}");

    first.unmount();
    assert!(!store.has_root());
    assert!(Deck::new(store, HeadlessHost::default()).is_ok());
}

#[test]
fn invalid_config_is_reported() {
    let (deck, warnings) = capture_warnings(|| {
        Deck::mount(
            store(),
            HeadlessHost::default(),
            DeckConfig::default().edge_buffer(-1.0),
        )
    });
    assert!(deck.is_ok());
    assert!(warnings.iter().any(|w| w.contains("invalid deck config")), "{warnings:?}");
}

#[test]
fn panels_render_into_per_panel_containers() {
    let mut deck = deck();
    let panels = deck.root_controller();
    let a = panels
        .create(PanelContent::text(["alpha"]), PanelOptions::new().title("A"))
        .unwrap();
    let b = panels
        .create(PanelContent::text(["beta"]), PanelOptions::new())
        .unwrap();
    assert!(deck.needs_render());
    deck.render();
    assert!(!deck.needs_render());

    let overlay = deck.overlay();
    let ca = deck.container(&a).unwrap();
    let cb = deck.container(&b).unwrap();
    assert_eq!(deck.host().children(overlay), &[ca, cb]);
    assert_eq!(deck.host().top_level(), &[overlay]);

    let body = deck.panel_element(&a, PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(body), &["alpha".to_string()]);
    let title = deck.panel_element(&a, PanelPart::Title).unwrap();
    assert_eq!(deck.host().text(title), &["A".to_string()]);

    let root_b = deck.panel_element(&b, PanelPart::Root).unwrap();
    assert_eq!(deck.host().parent(root_b), Some(cb));
    // The most recently mounted panel holds host focus.
    assert_eq!(deck.host().active_element(), Some(root_b));

    let chrome_a = deck.host().chrome(deck.panel_element(&a, PanelPart::Root).unwrap()).unwrap();
    assert!(!chrome_a.focused);
    assert!(!chrome_a.front);
    let chrome_b = deck.host().chrome(root_b).unwrap();
    assert!(chrome_b.focused);
    assert!(chrome_b.front);
}

#[test]
fn panels_open_centered_with_default_size() {
    let mut deck = deck();
    let id = deck
        .root_controller()
        .create(PanelContent::empty(), PanelOptions::new())
        .unwrap();
    deck.render();
    let root = deck.panel_element(&id, PanelPart::Root).unwrap();
    assert_eq!(
        deck.host().element_rect(root),
        Some(Rect::new(250.0, 200.0, 500.0, 400.0))
    );
}

#[test]
fn requested_size_and_position_are_clamped() {
    let mut deck = deck();
    let id = deck
        .root_controller()
        .create(
            PanelContent::empty(),
            PanelOptions::new().size(100.0, 1000.0).position(900.0, 10.0),
        )
        .unwrap();
    deck.render();
    let handle = deck.panel(&id).unwrap();
    assert_eq!(handle.size(), Some(Size::new(300.0, 1000.0)));
    // Taller than the region: the top edge wins.
    assert_eq!(handle.position(), Some(Point::new(698.0, 0.0)));
}

#[test]
fn dedup_focuses_existing_panel() {
    let mut deck = deck();
    let panels = deck.root_controller();
    let a = panels
        .create(PanelContent::empty(), PanelOptions::new().id("a"))
        .unwrap();
    panels
        .create(PanelContent::empty(), PanelOptions::new().id("b"))
        .unwrap();
    deck.render();

    let again = panels
        .create(PanelContent::text(["ignored"]), PanelOptions::new().id("a"))
        .unwrap();
    assert_eq!(again, a);
    assert_eq!(panels.count(), 2);
    assert_eq!(panels.focused(), Some(a.clone()));
    deck.render();
    let overlay = deck.overlay();
    assert_eq!(deck.host().children(overlay).last().copied(), deck.container("a"));
    let body = deck.panel_element("a", PanelPart::Body).unwrap();
    assert!(deck.host().text(body).is_empty());
}

#[test]
fn closing_does_not_move_focus() {
    let mut deck = deck();
    let panels = deck.root_controller();
    for id in ["a", "b", "c"] {
        panels.create(PanelContent::empty(), PanelOptions::new().id(id));
    }
    deck.render();
    assert!(panels.close("c").is_closed());
    deck.render();
    assert_eq!(panels.focused(), None);
    assert_eq!(panels.front(), Some(PanelId::new("b")));
    assert!(!deck.is_placed("c"));
    assert_eq!(deck.container("c"), None);
    assert_eq!(deck.host().elements_of_kind(ElementKind::PanelRoot).len(), 2);
}

#[test]
fn scoped_content_sees_its_scope_context() {
    let mut deck = deck();
    let root = deck.root_scope();
    deck.provide(root, Theme("dark")).unwrap();
    let counter = deck.mount_scope(root).unwrap();
    deck.provide(counter, Count(1)).unwrap();

    let content = PanelContent::new(|cx, body| {
        let count = cx.context::<Count>().map_or(0, |c| c.0);
        let theme = cx.context::<Theme>().map_or("none", |t| t.0);
        body.line(format!("count {count}")).line(format!("theme {theme}"));
    });
    let id = deck
        .controller(counter)
        .unwrap()
        .create(content, PanelOptions::new())
        .unwrap();
    deck.render();

    let body = deck.panel_element(&id, PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(body), &["count 1".to_string(), "theme dark".to_string()]);
    // Rendered in the root's overlay, not in a layer of its own.
    let container = deck.container(&id).unwrap();
    assert_eq!(deck.host().parent(container), Some(deck.overlay()));

    assert_eq!(deck.update_context::<Count>(counter, |c| c.0 += 1), Ok(true));
    assert!(deck.needs_render());
    deck.render();
    assert_eq!(deck.host().text(body)[0], "count 2");

    // Root content does not see the nested value.
    let root_panel = deck
        .root_controller()
        .create(
            PanelContent::new(|cx, body| {
                body.line(format!("{:?}", cx.context::<Count>().map(|c| c.0)));
            }),
            PanelOptions::new(),
        )
        .unwrap();
    deck.render();
    let root_body = deck.panel_element(&root_panel, PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(root_body), &["None".to_string()]);
}

#[test]
fn props_are_frozen_at_creation() {
    let mut deck = deck();
    let mut title = String::from("first");
    let content = PanelContent::with_props(title.clone(), |props, _, body| {
        body.line(props.clone());
    });
    title.push_str(" changed");
    let id = deck
        .root_controller()
        .create(content, PanelOptions::new())
        .unwrap();
    deck.render();
    let body = deck.panel_element(&id, PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(body), &["first".to_string()]);
    assert_eq!(title, "first changed");
}

#[test]
fn panels_created_from_content_inherit_origin() {
    let mut deck = deck();
    let root = deck.root_scope();
    let nested = deck.mount_scope(root).unwrap();
    deck.provide(nested, Count(7)).unwrap();

    let captured: Rc<RefCell<Option<PanelController>>> = Rc::default();
    let slot = Rc::clone(&captured);
    deck.controller(nested)
        .unwrap()
        .create(
            PanelContent::new(move |cx, _| {
                *slot.borrow_mut() = Some(cx.controller().clone());
            }),
            PanelOptions::new(),
        )
        .unwrap();
    deck.render();

    let inner = captured.borrow().clone().unwrap();
    assert_eq!(inner.scope(), nested);
    let child = inner
        .create(
            PanelContent::new(|cx, body| {
                body.line(format!("{}", cx.context::<Count>().map_or(0, |c| c.0)));
            }),
            PanelOptions::new(),
        )
        .unwrap();
    assert_eq!(deck.store().record(child.as_str()).unwrap().origin(), Some(nested));
    deck.render();
    let body = deck.panel_element(&child, PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(body), &["7".to_string()]);
}

#[test]
fn content_reaches_its_own_panel() {
    let mut deck = deck();
    let id = deck
        .root_controller()
        .create(
            PanelContent::new(|cx, body| {
                let panel = cx.panel();
                body.line(format!("{} focused={}", panel.id(), panel.is_focused()));
            }),
            PanelOptions::new().id("self"),
        )
        .unwrap();
    deck.render();
    let body = deck.panel_element(&id, PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(body), &["self focused=true".to_string()]);

    let outside = deck
        .with_scope(deck.root_scope(), |cx| cx.try_panel().map(|_| ()))
        .unwrap();
    assert_eq!(outside, Err(UsageError::OutsidePanel));
}

#[test]
fn unmounting_a_scope_unplaces_its_panels() {
    let mut deck = deck();
    let root = deck.root_scope();
    let nested = deck.mount_scope(root).unwrap();
    let panels = deck.controller(nested).unwrap();
    let id = panels.create(PanelContent::empty(), PanelOptions::new()).unwrap();
    deck.render();
    let root_element = deck.panel_element(&id, PanelPart::Root).unwrap();

    deck.unmount_scope(nested).unwrap();
    deck.render();
    assert!(!deck.is_placed(&id));
    assert!(deck.store().contains(&id));
    assert!(!deck.host().exists(root_element));
    assert!(deck.container(&id).is_some());

    assert!(!panels.is_mounted());
    assert_eq!(
        panels.try_create(PanelContent::empty(), PanelOptions::new()),
        Err(UsageError::OutsideScope(nested))
    );
    assert_eq!(deck.controller(nested).map(|_| ()), Err(ScopeError::UnknownScope(nested)));
    assert_eq!(deck.unmount_scope(root), Err(ScopeError::RootScope));

    // Closing still works through the store.
    assert!(deck.root_controller().close(&id).is_closed());
    deck.render();
    assert_eq!(deck.container(&id), None);
}

#[test]
fn handle_controls_geometry() {
    let mut deck = deck();
    let id = deck
        .root_controller()
        .create(PanelContent::empty(), PanelOptions::new())
        .unwrap();
    deck.render();
    let handle = deck.panel(&id).unwrap();
    assert_eq!(handle.set_size(100.0, 100.0), Some(Size::new(300.0, 200.0)));
    assert_eq!(handle.set_position(-50.0, 10.0), Some(Point::new(0.0, 10.0)));
    assert!(deck.needs_render());
    deck.render();
    let root = deck.panel_element(&id, PanelPart::Root).unwrap();
    assert_eq!(
        deck.host().element_rect(root),
        Some(Rect::new(0.0, 10.0, 300.0, 200.0))
    );

    assert!(handle.close().is_closed());
    deck.render();
    assert!(!handle.is_mounted());
    assert_eq!(handle.set_position(0.0, 0.0), None);
}

#[test]
fn content_setting_its_own_size_settles() {
    let mut deck = deck();
    let renders = Rc::new(Cell::new(0));
    let seen = Rc::clone(&renders);
    let id = deck
        .root_controller()
        .create(
            PanelContent::new(move |cx, _| {
                seen.set(seen.get() + 1);
                cx.panel().set_size(600.0, 450.0);
                cx.panel().set_position(20.0, 30.0);
            }),
            PanelOptions::new(),
        )
        .unwrap();

    let ((), warnings) = capture_warnings(|| deck.render());
    assert!(warnings.is_empty(), "{warnings:?}");
    // One pass applies the geometry, the next sees nothing new.
    assert_eq!(renders.get(), 2);
    assert!(!deck.needs_render());
    let root = deck.panel_element(&id, PanelPart::Root).unwrap();
    assert_eq!(
        deck.host().element_rect(root),
        Some(Rect::new(20.0, 30.0, 600.0, 450.0))
    );

    // Events do not re-run content when nothing changed.
    deck.handle_event(&fdeck_core::event::Event::Resize {
        width: 1000.0,
        height: 800.0,
    });
    assert_eq!(renders.get(), 2);

    let handle = deck.panel(&id).unwrap();
    assert_eq!(handle.set_size(600.0, 450.0), Some(Size::new(600.0, 450.0)));
    assert!(!deck.needs_render());
}

#[test]
fn unmount_removes_everything_and_keeps_panels() {
    let store = store();
    let mut deck = Deck::new(store.clone(), HeadlessHost::new(1000.0, 800.0)).unwrap();
    deck.root_controller()
        .create(PanelContent::text(["kept"]), PanelOptions::new().id("kept"));
    deck.render();

    let host = deck.unmount();
    assert_eq!(host.element_count(), 0);
    assert_eq!(store.len(), 1);
    assert!(!store.has_root());

    let deck = Deck::new(store, host).unwrap();
    assert!(deck.is_placed("kept"));
    let body = deck.panel_element("kept", PanelPart::Body).unwrap();
    assert_eq!(deck.host().text(body), &["kept".to_string()]);
}

#[test]
fn content_creating_panels_settles() {
    let mut deck = deck();
    deck.root_controller()
        .create(
            PanelContent::new(|cx, _| {
                cx.controller()
                    .create(PanelContent::empty(), PanelOptions::new().id("spawned"));
            }),
            PanelOptions::new().id("spawner"),
        )
        .unwrap();
    deck.render();
    assert!(deck.is_placed("spawned"));
    assert!(!deck.needs_render());
    assert_eq!(deck.store().len(), 2);
}
