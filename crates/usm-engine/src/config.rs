//! Manager configuration, read from a RON file.

use std::{fs, io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Idle window before a typed edit is re-validated, in milliseconds.
const DEBOUNCE_MS: u64 = 300;
/// Namespace of persisted keys.
const STORAGE_PREFIX: &str = "usm";
/// Longest owner name shown unshortened.
const NAME_DISPLAY_WIDTH: usize = 30;

// Serde default functions
/// Default for [`ManagerConfig::debounce_ms`].
const fn default_debounce_ms() -> u64 {
    DEBOUNCE_MS
}
/// Default for [`ManagerConfig::storage_prefix`].
fn default_storage_prefix() -> String {
    STORAGE_PREFIX.to_string()
}
/// Default for [`ManagerConfig::name_display_width`].
const fn default_name_display_width() -> usize {
    NAME_DISPLAY_WIDTH
}

/// Tunables of a [`Manager`](crate::Manager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    /// Idle window before a typed edit is re-validated.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Namespace prefix of every persisted key.
    #[serde(default = "default_storage_prefix")]
    pub storage_prefix: String,
    /// Owner names longer than this are shortened in listings.
    #[serde(default = "default_name_display_width")]
    pub name_display_width: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            storage_prefix: STORAGE_PREFIX.to_string(),
            name_display_width: NAME_DISPLAY_WIDTH,
        }
    }
}

impl ManagerConfig {
    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse RON text. `path` is only used for error reporting.
    pub fn from_ron(text: &str, path: &Path) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_ron(&text, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }
}
