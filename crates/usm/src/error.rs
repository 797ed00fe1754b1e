use std::io;

use thiserror::Error;
use usm_engine::{Error as EngineError, StoreError};

/// Failures surfaced to the user by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Schema file could not be loaded or was rejected.
    #[error(transparent)]
    Schema(#[from] schema::Error),

    /// The value store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Values could not be printed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed command-line input.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Multi-line rendering for the terminal.
    pub fn pretty(&self) -> String {
        match self {
            Self::Schema(e) => e.pretty(),
            Self::Engine(EngineError::ValidationFailed { errors }) => {
                let mut out = String::from("Validation errors:");
                for (key, messages) in errors {
                    for message in messages {
                        out.push_str(&format!("\n  {}: {}", key, message));
                    }
                }
                out
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn validation_failures_list_each_message() {
        let mut errors = BTreeMap::new();
        errors.insert("count".to_string(), vec!["Max: 10".to_string()]);
        errors.insert(
            "url".to_string(),
            vec!["Min 10 chars".to_string(), "Invalid format".to_string()],
        );
        let e = CliError::from(EngineError::ValidationFailed { errors });
        assert_eq!(
            e.pretty(),
            "Validation errors:\n  count: Max: 10\n  url: Min 10 chars\n  url: Invalid format"
        );
        assert_eq!(CliError::Usage("bad".into()).pretty(), "bad");
    }
}
