#![forbid(unsafe_code)]

//! Position and size clamping against a bounding region.
//!
//! # Invariants
//!
//! - [`clamp_position`] keeps the panel's top-left at or right/below the
//!   region's top-left corner, and its bottom-right at least `edge_buffer`
//!   pixels inside the region's bottom-right corner, whenever the panel fits.
//! - When the panel is larger than the region the top-left edge wins, so the
//!   header stays reachable.
//! - [`clamp_size`] never returns a size below the minimum floor.

use fdeck_core::geometry::{Bounds, Point, Size};

/// Size used when a panel is created without an explicit size.
pub const DEFAULT_PANEL_SIZE: Size = Size::new(500.0, 400.0);

/// Minimum size used when a panel is created without an explicit floor.
pub const DEFAULT_MIN_SIZE: Size = Size::new(300.0, 200.0);

/// Gap kept between a panel and the right/bottom edge of the region.
pub const POSITION_EDGE_BUFFER: f64 = 2.0;

/// Clamp a desired top-left corner so a panel of `size` stays inside `bounds`.
#[must_use]
pub fn clamp_position(desired: Point, size: Size, bounds: Bounds, edge_buffer: f64) -> Point {
    let max_x = bounds.right - size.width - edge_buffer;
    let max_y = bounds.bottom - size.height - edge_buffer;
    Point::new(
        desired.x.min(max_x).max(bounds.left),
        desired.y.min(max_y).max(bounds.top),
    )
}

/// Apply the minimum-size floor.
#[inline]
#[must_use]
pub fn clamp_size(desired: Size, min: Size) -> Size {
    desired.max(min)
}

/// Top-left corner that centers a panel of `size` in `bounds`.
#[must_use]
pub fn centered(bounds: Bounds, size: Size) -> Point {
    let center = bounds.center();
    Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0)
}

/// Shrink `size` to fit a region that became smaller than the panel.
///
/// Returns `None` when the panel already fits. The result is still floored
/// at `min`, so a region smaller than the minimum leaves the panel
/// overflowing rather than collapsing it.
#[must_use]
pub fn fit_to_region(size: Size, bounds: Bounds, min: Size) -> Option<Size> {
    let region = bounds.size();
    if size.width <= region.width && size.height <= region.height {
        return None;
    }
    let fitted = clamp_size(size.min(region), min);
    (fitted != size).then_some(fitted)
}
