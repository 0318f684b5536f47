//! Local key-value persistence for the editor session.
//!
//! The document and theme are saved under [`STORAGE_KEY`] as a versioned
//! JSON envelope. Payloads written before versioning existed (the
//! `{"state": {...}, "version": 0}` wrapper, or a bare `{components, theme}`
//! object) are upgraded on load; payloads from a newer version are refused.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::Theme;
use crate::types::*;

pub const STORAGE_KEY: &str = "discord-components-storage";

/// Current envelope version.
pub const STORAGE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub components: Document,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION,
            components: Vec::new(),
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stored state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored state has version {found}, newest supported is {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },

    #[error("stored state is not an object")]
    NotAnObject,
}

// ===========================================================================
// Backends
// ===========================================================================

/// String-keyed storage in the shape of the browser's `localStorage`.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(io_error(&path))?;
        debug!(path = %path.display(), bytes = value.len(), "wrote storage item");
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

// ===========================================================================
// Load / save
// ===========================================================================

pub fn save_state(storage: &mut impl KeyValueStorage, state: &PersistedState) -> Result<(), StorageError> {
    let text = serde_json::to_string(state)?;
    storage.set_item(STORAGE_KEY, &text)
}

pub fn clear_state(storage: &mut impl KeyValueStorage) -> Result<(), StorageError> {
    storage.remove_item(STORAGE_KEY)
}

/// Load the saved session, or `None` if nothing was saved.
///
/// Components that no longer convert are dropped with a warning rather than
/// failing the whole load.
pub fn load_state(storage: &impl KeyValueStorage) -> Result<Option<PersistedState>, StorageError> {
    let Some(text) = storage.get_item(STORAGE_KEY)? else {
        return Ok(None);
    };
    let raw: Value = serde_json::from_str(&text)?;
    parse_state(raw).map(Some)
}

fn parse_state(raw: Value) -> Result<PersistedState, StorageError> {
    let Value::Object(mut envelope) = raw else {
        return Err(StorageError::NotAnObject);
    };

    let version = envelope.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version > u64::from(STORAGE_VERSION) {
        return Err(StorageError::UnsupportedVersion {
            found: version,
            supported: STORAGE_VERSION,
        });
    }

    // Version 0 nested the fields under `state`.
    let mut fields = match envelope.remove("state") {
        Some(Value::Object(inner)) if version == 0 => inner,
        Some(other) => {
            envelope.insert("state".into(), other);
            envelope
        }
        None => envelope,
    };
    if version < u64::from(STORAGE_VERSION) {
        info!(from = version, to = STORAGE_VERSION, "upgrading stored state");
    }

    let theme = match fields.remove("theme") {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "unknown stored theme, using default");
            Theme::default()
        }),
        None => Theme::default(),
    };

    let mut components = Vec::new();
    if let Some(Value::Array(entries)) = fields.remove("components") {
        for (index, entry) in entries.into_iter().enumerate() {
            match Component::try_from_value(entry) {
                Ok(component) => components.push(component),
                Err(e) => warn!(index, error = %e, "dropping stored component"),
            }
        }
    }

    Ok(PersistedState {
        version: STORAGE_VERSION,
        components,
        theme,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PersistedState {
        PersistedState {
            version: STORAGE_VERSION,
            components: vec![
                text_display("hello").with_id("t1"),
                action_row(vec![button(ButtonStyle::Danger, "Stop", "stop").with_id("b1")])
                    .with_id("r1"),
            ],
            theme: Theme::Light,
        }
    }

    #[test]
    fn memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(load_state(&storage).unwrap().is_none());

        save_state(&mut storage, &sample()).unwrap();
        assert_eq!(load_state(&storage).unwrap(), Some(sample()));

        clear_state(&mut storage).unwrap();
        assert!(load_state(&storage).unwrap().is_none());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));
        assert!(load_state(&storage).unwrap().is_none());

        save_state(&mut storage, &sample()).unwrap();
        assert!(dir.path().join("nested").join(format!("{STORAGE_KEY}.json")).exists());
        assert_eq!(load_state(&storage).unwrap(), Some(sample()));

        clear_state(&mut storage).unwrap();
        // Removing twice is fine.
        clear_state(&mut storage).unwrap();
    }

    #[test]
    fn unversioned_wrapper_is_upgraded() {
        let mut storage = MemoryStorage::new();
        let legacy = json!({
            "state": {
                "components": [{"type": 100, "id": "t1", "content": "old"}],
                "theme": "light"
            },
            "version": 0
        });
        storage.set_item(STORAGE_KEY, &legacy.to_string()).unwrap();

        let state = load_state(&storage).unwrap().unwrap();
        assert_eq!(state.version, STORAGE_VERSION);
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(state.components.len(), 1);
    }

    #[test]
    fn bare_object_is_upgraded_and_bad_entries_dropped() {
        let mut storage = MemoryStorage::new();
        let legacy = json!({
            "components": [{"type": 2, "label": "ok"}, {"type": 9999}],
        });
        storage.set_item(STORAGE_KEY, &legacy.to_string()).unwrap();

        let state = load_state(&storage).unwrap().unwrap();
        assert_eq!(state.components.len(), 1);
        assert_eq!(state.theme, Theme::Dark);
    }

    #[test]
    fn newer_version_is_refused() {
        let mut storage = MemoryStorage::new();
        let future = json!({"version": 7, "components": []});
        storage.set_item(STORAGE_KEY, &future.to_string()).unwrap();

        let err = load_state(&storage).unwrap_err();
        assert!(matches!(
            err,
            StorageError::UnsupportedVersion { found: 7, supported: STORAGE_VERSION }
        ));
    }

    #[test]
    fn garbage_is_an_error() {
        let mut storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, "not json").unwrap();
        assert!(matches!(load_state(&storage), Err(StorageError::Json(_))));

        storage.set_item(STORAGE_KEY, "[1, 2]").unwrap();
        assert!(matches!(load_state(&storage), Err(StorageError::NotAnObject)));
    }
}
