//! # UI Module
//!
//! This module provides the terminal user interface components for ContentCrafter.
//!
//! ## Components
//!
//! - [`App`] - Application state (form input, focus, modals, results)
//! - [`mod@render`] - Rendering functions for drawing the TUI
//! - [`theme`] - Light and dark color themes
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  Brand          Generations Left        Theme    │
//! ├───────────────────┬─────────────────────────────┤
//! │  Topic            │  (error banner)             │
//! ├───────────────────┤                             │
//! │  Content Type     │  Content Package            │
//! │  ( ) YouTube ...  │  titles, script segments,   │
//! ├───────────────────┤  talking points, links      │
//! │  Status           │                             │
//! ├───────────────────┴─────────────────────────────┤
//! │                    Footer                        │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The email unlock and paywall prompts are drawn as centered modals on top.

pub mod app;
pub mod render;
pub mod theme;

pub use app::App;
pub use render::render;
