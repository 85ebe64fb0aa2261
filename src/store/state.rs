//! Persisted UI preferences.
//!
//! The last search term and, per cookie, the last key and key mode used to
//! inspect it. [`FileStateStore`] keeps them in a JSON file next to the
//! config:
//!
//! ```json
//! {
//!   "entries": [
//!     { "key": { "kind": "search_term" }, "value": "example" },
//!     { "key": { "kind": "cookie_key", "domain": ".example.com", "name": "session" }, "value": "c2VjcmV0" },
//!     { "key": { "kind": "cookie_key_mode", "domain": ".example.com", "name": "session" }, "value": "base64" }
//!   ]
//! }
//! ```
//!
//! # Security
//!
//! Saved keys are secrets. The file is written with 0600 permissions on
//! Unix, and `Debug` output of the stores never includes values.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cookie::CookieId;
use crate::error::CookieLensError;

/// Typed key of a persisted preference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateKey {
    /// Last cookie list filter.
    SearchTerm,
    /// Key last used to inspect a cookie.
    CookieKey(CookieId),
    /// Key mode (`text` or `base64`) last used for a cookie.
    CookieKeyMode(CookieId),
}

/// Key-value preference storage.
pub trait StateStore {
    fn get(&self, key: &StateKey) -> Option<String>;

    fn set(&mut self, key: StateKey, value: String) -> Result<(), CookieLensError>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&mut self, key: &StateKey) -> Result<(), CookieLensError>;
}

/// Forget everything saved for a cookie.
pub fn forget_cookie(store: &mut dyn StateStore, id: &CookieId) -> Result<(), CookieLensError> {
    store.remove(&StateKey::CookieKey(id.clone()))?;
    store.remove(&StateKey::CookieKeyMode(id.clone()))
}

/// Non-persistent store.
#[derive(Default)]
pub struct MemoryStateStore {
    entries: BTreeMap<StateKey, String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for MemoryStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStateStore")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &StateKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: StateKey, value: String) -> Result<(), CookieLensError> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &StateKey) -> Result<(), CookieLensError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    entries: Vec<StateEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateEntry {
    key: StateKey,
    value: String,
}

/// JSON file backed store. Every mutation is written through to disk.
pub struct FileStateStore {
    path: PathBuf,
    entries: BTreeMap<StateKey, String>,
}

impl FileStateStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CookieLensError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| state_error(&path, e))?;
            let file: StateFile = serde_json::from_str(&contents).map_err(|e| state_error(&path, e))?;
            file.entries.into_iter().map(|e| (e.key, e.value)).collect()
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    fn save(&self) -> Result<(), CookieLensError> {
        let file = StateFile {
            entries: self
                .entries
                .iter()
                .map(|(key, value)| StateEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        };
        let contents = serde_json::to_string_pretty(&file).map_err(|e| state_error(&self.path, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| state_error(&self.path, e))?;
        }
        fs::write(&self.path, contents).map_err(|e| state_error(&self.path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(|e| state_error(&self.path, e))?;
        }
        Ok(())
    }
}

impl fmt::Debug for FileStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStateStore")
            .field("path", &self.path)
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StateStore for FileStateStore {
    fn get(&self, key: &StateKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: StateKey, value: String) -> Result<(), CookieLensError> {
        if self.entries.get(&key) == Some(&value) {
            return Ok(());
        }
        info!(key = ?key, "saving preference");
        self.entries.insert(key, value);
        self.save()
    }

    fn remove(&mut self, key: &StateKey) -> Result<(), CookieLensError> {
        if self.entries.remove(key).is_some() {
            info!(key = ?key, "removed preference");
            self.save()?;
        }
        Ok(())
    }
}

fn state_error(path: &Path, e: impl fmt::Display) -> CookieLensError {
    CookieLensError::StateError {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
