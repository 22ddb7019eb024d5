#![forbid(unsafe_code)]

//! Per-panel creation options.
//!
//! Every field is optional. Unset values fall back to the deck-wide
//! defaults when the panel is first rendered (500×400 size, 300×200
//! minimum, centered, closes on Escape, ignores outside clicks unless the
//! deck configuration says otherwise). The options are frozen once the
//! panel is created.

use fdeck_core::geometry::{Point, Size};
use fdeck_core::id::PanelId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelOptions {
    /// Stable id. Creating a panel whose id is already open focuses the
    /// existing panel instead.
    pub id: Option<PanelId>,
    pub title: Option<String>,
    pub size: Option<Size>,
    pub min_size: Option<Size>,
    /// Initial top-left corner. Centered when unset.
    pub position: Option<Point>,
    pub close_on_escape: Option<bool>,
    pub close_on_outside_click: Option<bool>,
}

impl PanelOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<PanelId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    #[must_use]
    pub fn min_size(mut self, width: f64, height: f64) -> Self {
        self.min_size = Some(Size::new(width, height));
        self
    }

    #[must_use]
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = Some(close);
        self
    }

    #[must_use]
    pub fn close_on_outside_click(mut self, close: bool) -> Self {
        self.close_on_outside_click = Some(close);
        self
    }
}
