//! Read schema declarations from JSON files.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Error, RawSchema, Schema, error::excerpt_at};

/// Parse a schema declaration from JSON text. `path` is only used for diagnostics.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<RawSchema, Error> {
    serde_json::from_str::<RawSchema>(source).map_err(|e| {
        let (line, col) = (e.line().max(1), e.column().max(1));
        Error::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: e.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    })
}

/// Read and parse a schema declaration from a `.json` file.
pub fn load_from_path(path: &Path) -> Result<RawSchema, Error> {
    if path.extension() != Some(OsStr::new("json")) {
        return Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: "Unsupported schema format (expected a .json file)".to_string(),
        });
    }
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}

/// Read, parse, and resolve a schema file, reporting why it would be rejected.
pub fn check_path(path: &Path) -> Result<Schema, Error> {
    load_from_path(path)?
        .resolve()
        .map_err(|source| Error::Rejected {
            path: Some(path.to_path_buf()),
            source,
        })
}

/// Load every `.json` file in `dir`, sorted by file name.
///
/// A missing directory yields an empty list. Per-file failures are returned
/// alongside successes so one bad declaration does not hide the rest.
pub fn load_dir(dir: &Path) -> Result<Vec<(PathBuf, Result<RawSchema, Error>)>, Error> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "schema_dir_missing");
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| Error::Read {
        path: Some(dir.to_path_buf()),
        message: e.to_string(),
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension() == Some(OsStr::new("json")))
        .collect();
    paths.sort();
    Ok(paths
        .into_iter()
        .map(|p| {
            let loaded = load_from_path(&p);
            (p, loaded)
        })
        .collect())
}
