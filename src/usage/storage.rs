//! # Usage Storage
//!
//! Persistence for the usage record and the per-install identifier.
//!
//! ## Storage Location
//!
//! ```text
//! ~/.local/share/contentcrafter/
//! ├── store.json          <- key-value store (userUUID, generationData, theme)
//! └── contentcrafter.log
//! ```
//!
//! The store is a flat JSON object of string keys to string values. Values
//! that carry structure (such as `generationData`) are themselves JSON
//! encoded, so a damaged value only loses that one key.
//!
//! There is no locking. Two processes writing the same store race and the
//! last write wins.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key holding the stable per-install identifier
pub const USER_ID_KEY: &str = "userUUID";

/// Key holding today's [`UsageRecord`]
pub const GENERATION_DATA_KEY: &str = "generationData";

/// Key holding the selected UI theme (`light` or `dark`)
pub const THEME_KEY: &str = "theme";

/// File name of the key-value store inside the data directory
pub const STORE_FILE_NAME: &str = "store.json";

/// Usage-gating stage of a user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// No email given yet
    #[default]
    Anonymous,
    /// Email given, extra free generations unlocked
    Email,
    /// All free generations for today are used
    LimitReached,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Anonymous => "anonymous",
            Tier::Email => "email",
            Tier::LimitReached => "limit-reached",
        }
    }
}

/// Today's usage, as persisted under [`GENERATION_DATA_KEY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Date key (`YYYY-M-D`) the counters belong to
    pub date: String,
    /// Successful generations consumed on `date`
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub tier: Tier,
}

impl UsageRecord {
    /// A fresh record for the given date key
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            count: 0,
            tier: Tier::Anonymous,
        }
    }
}

/// A string key-value store with the semantics of browser local storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Key-value store backed by a single JSON file.
///
/// Every call re-reads the file, so several handles on the same path see
/// each other's writes. Writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open (or lazily create) a store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        Ok(Self { path })
    }

    /// Open the store in the given data directory
    pub fn in_dir(data_dir: &Path) -> Result<Self> {
        Self::open(data_dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is corrupt, starting empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize store")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write store file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Reads and writes the usage record and identifier through a [`KeyValueStore`]
pub struct UsageStorage {
    store: Box<dyn KeyValueStore>,
}

impl UsageStorage {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the stored usage record.
    ///
    /// Absence, a read error, or a value that does not parse all yield `None`.
    pub fn load(&self) -> Option<UsageRecord> {
        let raw = match self.store.get(GENERATION_DATA_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read usage record");
                return None;
            }
        };

        match serde_json::from_str::<UsageRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse usage record, resetting");
                None
            }
        }
    }

    /// Overwrite the stored usage record
    pub fn save(&mut self, record: &UsageRecord) -> Result<()> {
        let json = serde_json::to_string(record).context("Failed to serialize usage record")?;
        self.store
            .set(GENERATION_DATA_KEY, &json)
            .context("Failed to save usage record")
    }

    /// Drop the stored usage record
    pub fn clear(&mut self) -> Result<()> {
        self.store
            .remove(GENERATION_DATA_KEY)
            .context("Failed to clear usage record")
    }

    /// Return the persisted identifier, creating and persisting one if absent
    pub fn load_or_create_identifier(&mut self) -> String {
        match self.store.get(USER_ID_KEY) {
            Ok(Some(id)) if !id.is_empty() => return id,
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read user identifier"),
        }

        let id = uuid::Uuid::new_v4().to_string();
        if let Err(e) = self.store.set(USER_ID_KEY, &id) {
            tracing::warn!(error = %e, "Failed to persist user identifier");
        }
        id
    }
}

/// Get the platform data directory (`~/.local/share/contentcrafter` on Linux)
pub fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", "contentcrafter")
        .context("Failed to determine application data directory")?;

    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&Tier::LimitReached).unwrap(),
            "\"limit-reached\""
        );
        assert_eq!(
            serde_json::from_str::<Tier>("\"email\"").unwrap(),
            Tier::Email
        );
        assert_eq!(Tier::LimitReached.as_str(), "limit-reached");
    }

    #[test]
    fn test_tier_ordering_follows_transitions() {
        assert!(Tier::Anonymous < Tier::Email);
        assert!(Tier::Email < Tier::LimitReached);
    }

    #[test]
    fn test_usage_record_wire_format() {
        let record = UsageRecord {
            date: "2024-3-7".to_string(),
            count: 2,
            tier: Tier::Email,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"date":"2024-3-7","count":2,"tier":"email"}"#);
    }

    #[test]
    fn test_usage_record_missing_fields_default() {
        let record: UsageRecord = serde_json::from_str(r#"{"date":"2024-3-7"}"#).unwrap();
        assert_eq!(record.count, 0);
        assert_eq!(record.tier, Tier::Anonymous);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let mut a = MemoryStore::new();
        let b = a.clone();

        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));

        a.remove("k").unwrap();
        assert!(b.get("k").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_roundtrip_and_shared_handles() {
        let temp_dir = TempDir::new().unwrap();
        let mut first = JsonFileStore::in_dir(&temp_dir.path().join("data")).unwrap();
        let mut second = first.clone();

        first.set("theme", "light").unwrap();
        second.set("userUUID", "abc").unwrap();

        let reopened = JsonFileStore::in_dir(&temp_dir.path().join("data")).unwrap();
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("light"));
        assert_eq!(reopened.get("userUUID").unwrap().as_deref(), Some("abc"));

        second.remove("theme").unwrap();
        assert!(first.get("theme").unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_corrupt_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(STORE_FILE_NAME);
        fs::write(&path, "not valid json").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("theme").unwrap().is_none());

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_load_absent_record() {
        let storage = UsageStorage::new(Box::new(MemoryStore::new()));
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_load_corrupt_record() {
        let mut store = MemoryStore::new();
        store.set(GENERATION_DATA_KEY, "not json").unwrap();

        let storage = UsageStorage::new(Box::new(store));
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_load_wrong_shape_record() {
        let mut store = MemoryStore::new();
        store
            .set(GENERATION_DATA_KEY, r#"{"date":"2024-1-1","count":-4}"#)
            .unwrap();

        let storage = UsageStorage::new(Box::new(store));
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let mut storage = UsageStorage::new(Box::new(store.clone()));

        let record = UsageRecord {
            date: "2025-12-31".to_string(),
            count: 5,
            tier: Tier::Email,
        };
        storage.save(&record).unwrap();

        assert_eq!(storage.load(), Some(record));
        assert!(store.get(GENERATION_DATA_KEY).unwrap().is_some());

        storage.clear().unwrap();
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_identifier_is_stable() {
        let store = MemoryStore::new();
        let mut storage = UsageStorage::new(Box::new(store.clone()));

        let first = storage.load_or_create_identifier();
        let second = storage.load_or_create_identifier();

        assert_eq!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
        assert_eq!(store.get(USER_ID_KEY).unwrap(), Some(first));
    }

    #[test]
    fn test_identifier_reuses_existing_value() {
        let mut store = MemoryStore::new();
        store.set(USER_ID_KEY, "existing-id").unwrap();

        let mut storage = UsageStorage::new(Box::new(store));
        assert_eq!(storage.load_or_create_identifier(), "existing-id");
    }
}
