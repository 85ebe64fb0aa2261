//! Configuration file loading.
//!
//! ```toml
//! [keys]
//! default_mode = "text"      # text | base64
//! fixed_length = 64          # optional; absent = decoded length as-is
//!
//! [storage]
//! jar = "~/cookies.txt"
//! state = "~/.config/cookie-lens/state.json"
//!
//! [ui]
//! color = true
//! ```
//!
//! Every section and field is optional. A missing file yields defaults.
//! Command-line flags take precedence over anything set here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::key::{KeyLengthPolicy, KeyMode};
use crate::error::CookieLensError;

const APP_DIR: &str = "cookie-lens";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub keys: KeysConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    /// Key mode used when neither a flag nor a saved preference applies.
    pub default_mode: KeyMode,
    /// Resize Base64 keys to this many bytes.
    pub fixed_length: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Netscape cookie jar used by the `cookies` commands.
    pub jar: Option<PathBuf>,
    /// Preference file. Defaults to `state.json` in the config directory.
    pub state: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, CookieLensError> {
        let path = match path {
            Some(path) => expand_path(path),
            None => match default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| config_error(&path, e))?;
        let config = Self::parse(&contents).map_err(|reason| CookieLensError::ConfigError {
            path: path.display().to_string(),
            reason,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self, String> {
        let mut config: Self = toml::from_str(contents).map_err(|e| e.message().to_string())?;
        if config.keys.fixed_length == Some(0) {
            return Err("[keys] fixed_length must be greater than zero".to_string());
        }
        config.storage.jar = config.storage.jar.as_deref().map(expand_path);
        config.storage.state = config.storage.state.as_deref().map(expand_path);
        Ok(config)
    }

    pub fn key_length_policy(&self) -> KeyLengthPolicy {
        match self.keys.fixed_length {
            Some(len) => KeyLengthPolicy::Fixed(len),
            None => KeyLengthPolicy::AsDecoded,
        }
    }

    /// Where preferences are persisted, if a location can be determined.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.storage
            .state
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join("state.json")))
    }
}

/// `~/.config/cookie-lens/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn config_error(path: &Path, e: std::io::Error) -> CookieLensError {
    CookieLensError::ConfigError {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
