//! Errors returned by manager operations.

use std::{collections::BTreeMap, path::PathBuf, result::Result as StdResult};

use schema::SchemaError;
use thiserror::Error;

use crate::store::StoreError;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the settings engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A schema failed structural checks at registration.
    #[error("Schema rejected: {0}")]
    Rejected(#[from] SchemaError),

    /// No schema is registered under this owner id.
    #[error("Unknown owner: {id}")]
    UnknownOwner {
        /// Requested owner id.
        id: String,
    },

    /// The owner's schema declares no such field.
    #[error("Unknown field '{key}' for owner {owner}")]
    UnknownField {
        /// Owner id.
        owner: String,
        /// Requested field key.
        key: String,
    },

    /// A draft operation was attempted with no owner selected.
    #[error("No owner selected for editing")]
    NoActiveSession,

    /// Commit was refused because at least one field has violations.
    #[error("{} setting(s) failed validation", .errors.len())]
    ValidationFailed {
        /// Violations of every failing field, keyed by field.
        errors: BTreeMap<String, Vec<String>>,
    },

    /// Writing to or clearing the persistent store failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The manager configuration file could not be used.
    #[error("Config error in {}: {message}", path.display())]
    Config {
        /// Config file path.
        path: PathBuf,
        /// Reason.
        message: String,
    },
}
