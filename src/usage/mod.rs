//! # Usage Tracking Module
//!
//! Daily free-generation quota with email unlock and paywall stages.
//!
//! ## Overview
//!
//! - [`UsageTracker`] owns the tier state machine and the daily counter.
//! - [`UsageStorage`] reads and writes the persisted record through any
//!   [`KeyValueStore`] ([`JsonFileStore`] on disk, [`MemoryStore`] in tests).
//!
//! ## Storage
//!
//! Data lives in a JSON key-value file in the XDG data directory:
//! - Linux: `~/.local/share/contentcrafter/store.json`
//! - macOS: `~/Library/Application Support/contentcrafter/store.json`
//! - Windows: `%APPDATA%\contentcrafter\data\store.json`
//!
//! ## Data Format
//!
//! ```json
//! {
//!   "generationData": "{\"date\":\"2025-2-5\",\"count\":2,\"tier\":\"anonymous\"}",
//!   "theme": "dark",
//!   "userUUID": "0b7e5c1e-6a0c-4c4e-9d55-3f1f3b0b8a11"
//! }
//! ```

mod storage;
mod tracker;

pub use storage::{
    default_data_dir, JsonFileStore, KeyValueStore, MemoryStore, Tier, UsageRecord, UsageStorage,
    GENERATION_DATA_KEY, STORE_FILE_NAME, THEME_KEY, USER_ID_KEY,
};
pub use tracker::{
    date_key, derive_tier, Clock, FixedClock, LocalClock, UsageLimits, UsageTracker,
    ANONYMOUS_GENERATIONS_LIMIT, EMAIL_GENERATIONS_LIMIT,
};
