#![forbid(unsafe_code)]

use fdeck_core::geometry::{Bounds, Point, Rect, Size};
use fdeck_layout::{POSITION_EDGE_BUFFER, ResizeGrip, clamp_position, clamp_size};
use proptest::prelude::*;

const VIEWPORT: Bounds = Bounds::from_viewport(1600.0, 1000.0);
const MIN: Size = Size::new(300.0, 200.0);

fn panel_rect() -> impl Strategy<Value = Rect> {
    (0u32..800, 0u32..500, 300u32..700, 200u32..450).prop_map(|(x, y, w, h)| {
        Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
    })
}

fn pointer() -> impl Strategy<Value = Point> {
    (-200.0f64..1800.0, -200.0f64..1200.0).prop_map(|(x, y)| Point::new(x, y))
}

fn grip() -> impl Strategy<Value = ResizeGrip> {
    proptest::sample::select(ResizeGrip::ALL.to_vec())
}

proptest! {
    #[test]
    fn near_edge_grips_keep_the_far_edge(rect in panel_rect(), pointer in pointer(), grip in grip()) {
        let step = grip.propose(pointer, rect, VIEWPORT, POSITION_EDGE_BUFFER);
        let applied = clamp_size(step.size, MIN);
        let pos = grip.anchor(step, rect, applied);

        if grip.horizontal_edge() == Some(false) {
            prop_assert_eq!(pos.x + applied.width, rect.right());
        }
        if grip.vertical_edge() == Some(false) {
            prop_assert_eq!(pos.y + applied.height, rect.bottom());
        }
    }

    #[test]
    fn far_edge_grips_keep_the_origin(rect in panel_rect(), pointer in pointer(), grip in grip()) {
        let step = grip.propose(pointer, rect, VIEWPORT, POSITION_EDGE_BUFFER);
        let applied = clamp_size(step.size, MIN);
        let pos = grip.anchor(step, rect, applied);

        if grip.horizontal_edge() != Some(false) {
            prop_assert_eq!(pos.x, rect.x);
        }
        if grip.vertical_edge() != Some(false) {
            prop_assert_eq!(pos.y, rect.y);
        }
    }

    #[test]
    fn clamped_position_stays_in_region(
        desired in pointer(),
        w in 0.0f64..1500.0,
        h in 0.0f64..900.0,
    ) {
        let size = Size::new(w, h);
        let pos = clamp_position(desired, size, VIEWPORT, POSITION_EDGE_BUFFER);
        prop_assert!(pos.x >= VIEWPORT.left);
        prop_assert!(pos.y >= VIEWPORT.top);
        prop_assert!(pos.x + w <= VIEWPORT.right - POSITION_EDGE_BUFFER + 1e-9);
        prop_assert!(pos.y + h <= VIEWPORT.bottom - POSITION_EDGE_BUFFER + 1e-9);
    }
}
