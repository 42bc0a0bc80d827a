//! ContentCrafter - turn a topic into a ready-to-record content package
//!
//! This library provides the daily usage quota, the Gemini-backed content
//! generator, the orchestration between the two, and the terminal UI.

pub mod config;
pub mod export;
pub mod generator;
pub mod orchestrator;
pub mod ui;
pub mod usage;
