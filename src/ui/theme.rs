//! # Theme System
//!
//! Light and dark color themes for the TUI.
//!
//! ## Overview
//!
//! The [`Theme`] struct defines all colors used throughout the UI. Rendering
//! code references theme fields instead of hardcoding colors. The active mode
//! is toggled at runtime and persisted under the `theme` key of the
//! key-value store as `"light"` or `"dark"` (dark when unset).
//!
//! - **Dark** uses Catppuccin Mocha
//! - **Light** uses Catppuccin Latte

use crate::usage::{KeyValueStore, THEME_KEY};
use anyhow::Result;
use ratatui::style::Color;

/// All colors used by the TUI, grouped by semantic role.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Human-readable palette name.
    pub name: &'static str,

    // -- Background colors --
    /// Main background color for panels and modals.
    pub bg: Color,

    // -- Foreground / text colors --
    /// Primary text color.
    pub fg: Color,
    /// Muted/secondary text (e.g. hints, footer, placeholders).
    pub fg_dim: Color,

    // -- Accent / brand colors --
    /// Primary accent used for branding, focused borders, selected-item bg.
    pub accent: Color,
    /// Secondary accent for titles and highlighted values.
    pub secondary: Color,

    // -- Semantic status colors --
    pub success: Color,
    pub error: Color,

    /// Background of the selected list item.
    pub selection_bg: Color,
}

/// Which of the two themes is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn theme(self) -> &'static Theme {
        match self {
            ThemeMode::Light => &LATTE,
            ThemeMode::Dark => &MOCHA,
        }
    }

    /// Read the persisted mode; unset or unreadable means dark
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(THEME_KEY) {
            Ok(Some(value)) => Self::parse(&value).unwrap_or_default(),
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme");
                Self::default()
            }
        }
    }

    pub fn save(self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(THEME_KEY, self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Built-in theme definitions
// ---------------------------------------------------------------------------

static MOCHA: Theme = Theme {
    name: "Catppuccin Mocha",
    bg: Color::Rgb(30, 30, 46),           // base
    fg: Color::Rgb(205, 214, 244),        // text
    fg_dim: Color::Rgb(108, 112, 134),    // overlay0
    accent: Color::Rgb(203, 166, 247),    // mauve
    secondary: Color::Rgb(245, 194, 231), // pink
    success: Color::Rgb(166, 227, 161),   // green
    error: Color::Rgb(243, 139, 168),     // red
    selection_bg: Color::Rgb(69, 71, 90), // surface1
};

static LATTE: Theme = Theme {
    name: "Catppuccin Latte",
    bg: Color::Rgb(239, 241, 245),           // base
    fg: Color::Rgb(76, 79, 105),             // text
    fg_dim: Color::Rgb(156, 160, 176),       // overlay0
    accent: Color::Rgb(136, 57, 239),        // mauve
    secondary: Color::Rgb(234, 118, 203),    // pink
    success: Color::Rgb(64, 160, 43),        // green
    error: Color::Rgb(210, 15, 57),          // red
    selection_bg: Color::Rgb(188, 192, 204), // surface1
};
