//! Error types for schema resolution and schema file loading.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Structural problems that cause a schema to be rejected wholesale.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required schema attribute is absent or blank.
    #[error("schema is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// The settings list is present but empty.
    #[error("schema `{id}` must declare at least one setting")]
    EmptySettings {
        /// Owner id of the schema.
        id: String,
    },
    /// A field lacks `key`, `type`, `label`, or `default`.
    #[error("setting #{index} is missing required attribute `{attribute}`")]
    MissingFieldAttribute {
        /// Zero-based position of the field in `settings`.
        index: usize,
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// The `type` string is not one of the supported kinds.
    #[error("setting `{key}` has unknown type `{kind}`")]
    UnknownFieldType {
        /// Field key.
        key: String,
        /// The offending type string.
        kind: String,
    },
    /// Two fields share a key.
    #[error("setting key `{key}` is declared more than once")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
    /// A choice field has no options to choose from.
    #[error("enum setting `{key}` has no options")]
    MissingOptions {
        /// Field key.
        key: String,
    },
    /// A `pattern` rule failed to compile.
    #[error("setting `{key}` has an invalid pattern: {message}")]
    InvalidPattern {
        /// Field key.
        key: String,
        /// Compiler message.
        message: String,
    },
    /// The default value does not have the field's native shape.
    #[error("default of setting `{key}` is a {found}, expected {kind}")]
    DefaultMismatch {
        /// Field key.
        key: String,
        /// Wire name of the field kind.
        kind: &'static str,
        /// Shape of the supplied default.
        found: &'static str,
    },
    /// The default of a choice field is not one of its option values.
    #[error("default `{value}` of enum setting `{key}` is not one of its options")]
    DefaultNotAnOption {
        /// Field key.
        key: String,
        /// The supplied default.
        value: String,
    },
}

/// Errors produced while loading a schema file.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// I/O or filesystem read error.
    #[error("{message}")]
    Read {
        /// Path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    /// JSON syntax or shape error with a concrete location and excerpt.
    #[error("{message}")]
    Parse {
        /// Path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
        /// Rendered excerpt including a caret at the error location.
        excerpt: String,
    },
    /// The file parsed but the schema is structurally invalid.
    #[error("{source}")]
    Rejected {
        /// Path of the rejected schema.
        path: Option<PathBuf>,
        /// Why the schema was rejected.
        source: SchemaError,
    },
}

impl Error {
    /// Render a human-friendly message including location and excerpt when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Schema parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Schema parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::Rejected { path, source } => match path {
                Some(p) => format!("Schema rejected at {}\n{}", p.display(), source),
                None => format!("Schema rejected\n{}", source),
            },
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Rejected { path, .. } => {
                path.as_deref()
            }
        }
    }
}

/// Build a small 2–3 line excerpt with a caret at `(line_no, col_no)`.
pub fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len();
    let start = max(1usize, line_no.saturating_sub(2));
    let end = min(total, line_no + 1);

    let mut out = String::new();
    for n in start..=end {
        let text = lines.get(n - 1).copied().unwrap_or("");
        let _ignored = writeln!(out, " {:>4} | {}", n, text);
        if n == line_no {
            let prefix = format!(" {:>4} | ", n);
            let _ignored = writeln!(
                out,
                "{}{}^",
                " ".repeat(prefix.len()),
                " ".repeat(col_no.saturating_sub(1))
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_points_at_column() {
        let src = "{\n  \"id\": \"a\",\n  \"name\" 1\n}";
        let ex = excerpt_at(src, 3, 10);
        assert!(ex.contains("   3 |   \"name\" 1"));
        let caret = ex.lines().find(|l| l.trim_end().ends_with('^')).unwrap();
        // " {:>4} | " renders as eight columns before the source text.
        assert_eq!(caret.find('^').unwrap(), 8 + 9);
    }

    #[test]
    fn rejected_pretty_includes_reason() {
        let err = Error::Rejected {
            path: Some(PathBuf::from("/tmp/a.json")),
            source: SchemaError::EmptySettings { id: "a".into() },
        };
        let text = err.pretty();
        assert!(text.contains("/tmp/a.json"));
        assert!(text.contains("at least one setting"));
    }
}
