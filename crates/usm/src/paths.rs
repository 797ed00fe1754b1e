use std::{
    env,
    path::{Path, PathBuf},
};

/// Directory holding usm state: `~/.usm`.
pub fn default_base() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".usm");
    p
}

/// Files the binary reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Manager config (RON).
    pub config: PathBuf,
    /// Persisted values (JSON).
    pub store: PathBuf,
    /// Directory of owner schema files.
    pub schemas: PathBuf,
}

impl Paths {
    /// Standard layout below `base`.
    pub fn under(base: &Path) -> Self {
        Self {
            config: base.join("config.ron"),
            store: base.join("store.json"),
            schemas: base.join("schemas"),
        }
    }

    /// Standard layout below [`default_base`], with explicit overrides.
    pub fn resolve(config: Option<&Path>, store: Option<&Path>, schemas: Option<&Path>) -> Self {
        let base = Self::under(&default_base());
        Self {
            config: config.map_or(base.config, Path::to_path_buf),
            store: store.map_or(base.store, Path::to_path_buf),
            schemas: schemas.map_or(base.schemas, Path::to_path_buf),
        }
    }
}
