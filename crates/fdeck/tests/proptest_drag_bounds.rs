#![forbid(unsafe_code)]

//! Dragging through the facade never moves a panel out of the region.

use fdeck::prelude::{
    Deck, Event, HeadlessHost, KeyCode, KeyEvent, PanelContent, PanelController, PanelId,
    PanelOptions, PanelStore, PointerEvent, PointerEventKind,
};
use fdeck::{ElementGeometry, ElementId, PanelPart, Point};
use proptest::prelude::*;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 900.0;

fn deck_with_panel(width: f64, height: f64) -> (Deck<HeadlessHost>, PanelController) {
    let mut deck = Deck::new(PanelStore::new(), HeadlessHost::new(WIDTH, HEIGHT)).unwrap();
    let panels = deck.root_controller();
    panels
        .create(
            PanelContent::empty(),
            PanelOptions::new().id("p").size(width, height),
        )
        .unwrap();
    deck.render();
    (deck, panels)
}

fn pointer(kind: PointerEventKind, at: Point, target: Option<ElementId>) -> Event {
    let event = PointerEvent::new(kind, at.x, at.y);
    Event::Pointer(match target {
        Some(target) => event.on(target),
        None => event,
    })
}

fn moves() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec(
        (-600.0f64..1800.0, -600.0f64..1500.0).prop_map(|(x, y)| Point::new(x, y)),
        1..12,
    )
}

proptest! {
    #[test]
    fn dragged_panels_stay_inside(
        width in 300u32..900,
        height in 200u32..700,
        path in moves(),
    ) {
        let (mut deck, _panels) = deck_with_panel(f64::from(width), f64::from(height));
        let header = deck.panel_element("p", PanelPart::Header).unwrap();
        let root = deck.panel_element("p", PanelPart::Root).unwrap();
        let start = deck.host().element_rect(root).unwrap().origin() + Point::new(10.0, 5.0);

        deck.handle_event(&pointer(PointerEventKind::Down, start, Some(header)));
        for &at in &path {
            deck.handle_event(&pointer(PointerEventKind::Move, at, None));
            let rect = deck.host().element_rect(root).unwrap();
            prop_assert!(rect.x >= 0.0 && rect.y >= 0.0);
            prop_assert!(rect.right() <= WIDTH - 2.0);
            prop_assert!(rect.bottom() <= HEIGHT - 2.0);
        }
        let last = *path.last().unwrap();
        deck.handle_event(&pointer(PointerEventKind::Up, last, None));
        prop_assert!(deck.host().text_selection_enabled());
    }
}

#[test]
fn prelude_covers_the_common_flow() {
    let (mut deck, panels) = deck_with_panel(400.0, 300.0);
    assert_eq!(panels.focused(), Some(PanelId::new("p")));
    let outcome = deck.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)));
    assert!(outcome.propagation_stopped);
    assert!(panels.ids().is_empty());
    let host = deck.unmount();
    assert!(host.top_level().is_empty());
}
