//! # Configuration
//!
//! Manages user configuration stored in `~/.config/contentcrafter/config.json`.
//!
//! ## Overview
//!
//! Every field is optional in the file; anything missing falls back to the
//! built-in default. Unknown fields are rejected so typos surface instead of
//! being silently ignored.
//!
//! ```json
//! {
//!   "model": "gemini-2.5-flash",
//!   "api_base_url": "https://generativelanguage.googleapis.com/v1beta",
//!   "anonymous_limit": 3,
//!   "email_limit": 3,
//!   "request_timeout_secs": 60
//! }
//! ```
//!
//! The API key is never read from this file. It comes from `--api-key`,
//! `GEMINI_API_KEY` or `API_KEY`, in that order.

use crate::generator::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::usage::{UsageLimits, ANONYMOUS_GENERATIONS_LIMIT, EMAIL_GENERATIONS_LIMIT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables checked for the API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Gemini model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Gemini REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Free generations per day before an email is required
    #[serde(default = "default_anonymous_limit")]
    pub anonymous_limit: u32,

    /// Extra free generations per day after giving an email
    #[serde(default = "default_email_limit")]
    pub email_limit: u32,

    /// HTTP timeout for one generation request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_anonymous_limit() -> u32 {
    ANONYMOUS_GENERATIONS_LIMIT
}

fn default_email_limit() -> u32 {
    EMAIL_GENERATIONS_LIMIT
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_api_base_url(),
            anonymous_limit: default_anonymous_limit(),
            email_limit: default_email_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        match Self::config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Quota thresholds from the configured limits
    pub fn limits(&self) -> UsageLimits {
        UsageLimits::new(self.anonymous_limit, self.email_limit)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Return the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "contentcrafter")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}

/// The API key from the environment, if any non-empty one is set
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
