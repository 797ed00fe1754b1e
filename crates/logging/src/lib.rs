#![warn(missing_docs)]

//! Shared logging setup for the usm workspace.
//!
//! - [`LogArgs`]: log level flags, flattened into each binary's CLI
//! - [`compute_spec`]: the filter directive those flags resolve to
//! - [`init`]: install the stderr subscriber

use std::{env, io};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "usm_engine=trace,schema=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter directive for these flags, consulting `RUST_LOG` when no flag
    /// is given.
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
            env::var("RUST_LOG").ok().as_deref(),
        )
    }
}

/// Level used when nothing else is configured.
const DEFAULT_LEVEL: &str = "warn";

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &["usm", "usm_engine", "schema", "logging"]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `rust_log` (the `RUST_LOG` environment value)
/// - default to crate-scoped `warn`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => level_spec_for(DEFAULT_LEVEL),
    }
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Install a compact stderr subscriber filtered by `spec`.
///
/// Returns false if a global subscriber was already installed.
pub fn init(spec: &str) -> bool {
    let installed = tracing_subscriber::registry()
        .with(env_filter_from_spec(spec))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(spec = %spec, "logging_initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(
            compute_spec(false, false, Some("info"), Some("schema=trace"), Some("x=debug")),
            "schema=trace"
        );
    }

    #[test]
    fn flags_scope_to_our_crates() {
        let spec = compute_spec(true, false, None, None, Some("x=debug"));
        assert_eq!(
            spec,
            "usm=trace,usm_engine=trace,schema=trace,logging=trace"
        );
        assert!(compute_spec(false, true, None, None, None).contains("usm_engine=debug"));
        assert!(compute_spec(false, false, Some("ERROR"), None, None).contains("schema=error"));
    }

    #[test]
    fn rust_log_then_default() {
        assert_eq!(compute_spec(false, false, None, None, Some("x=debug")), "x=debug");
        assert_eq!(
            compute_spec(false, false, None, None, Some("  ")),
            level_spec_for("warn")
        );
        assert_eq!(compute_spec(false, false, None, None, None), level_spec_for("warn"));
    }

    #[test]
    fn spec_parses_as_filter() {
        let filter = env_filter_from_spec(&level_spec_for("info"));
        assert!(filter.to_string().contains("usm_engine=info"));
    }
}
