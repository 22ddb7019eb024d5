#![forbid(unsafe_code)]

//! Deck-wide defaults for panels.
//!
//! [`DeckConfig`] supplies every value a [`PanelOptions`] leaves unset.
//! With the `deck-config` feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! # floatdeck.toml
//! edge_buffer = 4.0
//! close_on_outside_click = true
//!
//! [default_size]
//! width = 640.0
//! height = 480.0
//! ```
//!
//! ```rust,ignore
//! let config = DeckConfig::from_toml_file("floatdeck.toml")?;
//! ```

#[cfg(feature = "deck-config")]
use std::path::Path;

#[cfg(feature = "deck-config")]
use serde::{Deserialize, Serialize};

use fdeck_core::geometry::{Point, Size};
use fdeck_layout::{DEFAULT_MIN_SIZE, DEFAULT_PANEL_SIZE, POSITION_EDGE_BUFFER};
use fdeck_runtime::PanelOptions;

/// Library-wide panel defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "deck-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "deck-config", serde(default))]
pub struct DeckConfig {
    /// Initial size when a panel does not ask for one.
    pub default_size: Size,
    /// Minimum size when a panel does not set its own floor.
    pub default_min_size: Size,
    /// Gap kept between a panel and the right/bottom edge of the region.
    pub edge_buffer: f64,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PANEL_SIZE,
            default_min_size: DEFAULT_MIN_SIZE,
            edge_buffer: POSITION_EDGE_BUFFER,
            close_on_escape: true,
            close_on_outside_click: false,
        }
    }
}

impl DeckConfig {
    #[must_use]
    pub fn default_size(mut self, width: f64, height: f64) -> Self {
        self.default_size = Size::new(width, height);
        self
    }

    #[must_use]
    pub fn default_min_size(mut self, width: f64, height: f64) -> Self {
        self.default_min_size = Size::new(width, height);
        self
    }

    #[must_use]
    pub fn edge_buffer(mut self, buffer: f64) -> Self {
        self.edge_buffer = buffer;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    #[must_use]
    pub fn close_on_outside_click(mut self, close: bool) -> Self {
        self.close_on_outside_click = close;
        self
    }

    /// Fill the gaps in `options` with these defaults.
    #[must_use]
    pub fn resolve(&self, options: &PanelOptions) -> PanelSettings {
        PanelSettings {
            title: options.title.clone(),
            size: options.size.unwrap_or(self.default_size),
            min_size: options.min_size.unwrap_or(self.default_min_size),
            position: options.position,
            close_on_escape: options.close_on_escape.unwrap_or(self.close_on_escape),
            close_on_outside_click: options
                .close_on_outside_click
                .unwrap_or(self.close_on_outside_click),
        }
    }

    /// Check value ranges. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.edge_buffer >= 0.0) {
            errors.push(format!("edge_buffer must be >= 0, got {}", self.edge_buffer));
        }
        for (name, size) in [
            ("default_size", self.default_size),
            ("default_min_size", self.default_min_size),
        ] {
            if !(size.width >= 0.0 && size.height >= 0.0) {
                errors.push(format!(
                    "{name} must be non-negative, got {}x{}",
                    size.width, size.height
                ));
            }
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "deck-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, DeckConfigError> {
        toml::from_str(s).map_err(DeckConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "deck-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DeckConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DeckConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "deck-config")]
    pub fn from_json_str(s: &str) -> Result<Self, DeckConfigError> {
        serde_json::from_str(s).map_err(DeckConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "deck-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DeckConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DeckConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

/// Options of one panel after defaults were applied. Frozen at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSettings {
    pub title: Option<String>,
    pub size: Size,
    pub min_size: Size,
    pub position: Option<Point>,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
}

/// Failure loading a [`DeckConfig`].
#[cfg(feature = "deck-config")]
#[derive(Debug)]
pub enum DeckConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
}

#[cfg(feature = "deck-config")]
impl std::fmt::Display for DeckConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
        }
    }
}

#[cfg(feature = "deck-config")]
impl std::error::Error for DeckConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}
