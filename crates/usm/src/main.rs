//! Binary entrypoint for the usm settings editor.
use std::{
    io,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use clap::{Parser, Subcommand};
use tracing::{debug, error};
use usm_engine::{FileBackend, Manager, ManagerConfig};

/// Failures surfaced to the user.
mod error;
/// Default locations of config, store and schemas.
mod paths;
/// Text rendering of owners and drafts.
mod render;
/// Interactive editor.
mod repl;

use crate::{error::CliError, paths::Paths};

#[derive(Parser, Debug)]
#[command(name = "usm", about = "Schema-driven settings registry and editor", version)]
/// Command-line interface for the `usm` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Manager config file (defaults to ~/.usm/config.ron)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Value store file (defaults to ~/.usm/store.json)
    #[arg(long, value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    /// Directory of schema files (defaults to ~/.usm/schemas)
    #[arg(long, value_name = "DIR", global = true)]
    schemas: Option<PathBuf>,

    /// Extra schema file to register; may be repeated
    #[arg(long = "schema", value_name = "FILE", global = true)]
    extra_schemas: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// List registered owners.
    List {
        /// Only owners whose name or id contains this text
        filter: Option<String>,
    },
    /// Show the current settings of an owner.
    Show {
        /// Owner id
        id: String,
    },
    /// Load and validate a schema file then exit.
    Check {
        /// Schema file to check
        path: PathBuf,
    },
    /// Change settings of an owner and save them.
    Set {
        /// Owner id
        id: String,
        /// Settings to change
        #[arg(value_name = "KEY=VALUE", required = true)]
        assignments: Vec<String>,
    },
    /// Delete the stored settings of an owner, restoring defaults.
    Reset {
        /// Owner id
        id: String,
    },
    /// Interactive editor.
    Edit,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log.spec());

    if let Err(e) = run(cli).await {
        eprintln!("{}", e.pretty());
        process::exit(1);
    }
}

/// Dispatch a parsed command line.
async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        command,
        config,
        store,
        schemas,
        extra_schemas,
        ..
    } = cli;
    let paths = Paths::resolve(config.as_deref(), store.as_deref(), schemas.as_deref());
    let open = || open_manager(&paths, &extra_schemas);

    match command {
        Command::Check { path } => check(&path)?,
        Command::List { filter } => {
            let manager = open()?;
            let found = manager.filter_owners(filter.as_deref().unwrap_or_default());
            render::owners(&mut io::stdout(), &found)?;
        }
        Command::Show { id } => {
            let manager = open()?;
            manager.select(&id)?;
            render::session(&mut io::stdout(), &manager)?;
        }
        Command::Set { id, assignments } => {
            let saved = set(&open()?, &id, &assignments)?;
            println!("{}", render::values(&saved)?);
        }
        Command::Reset { id } => {
            let manager = open()?;
            manager.select(&id)?;
            let defaults = manager.discard()?;
            println!("{}", render::values(&defaults)?);
        }
        Command::Edit => repl::run(open()?).await?,
    }
    Ok(())
}

/// Build a manager over the file store and register every schema found.
///
/// Unreadable or rejected schema files are logged and skipped.
fn open_manager(paths: &Paths, extra: &[PathBuf]) -> Result<Manager, CliError> {
    let config = ManagerConfig::load(&paths.config)?;
    let backend = FileBackend::open(&paths.store)?;
    let manager = Manager::new(config, Arc::new(backend));

    let mut found = schema::load_dir(&paths.schemas)?;
    for path in extra {
        found.push((path.clone(), schema::load_from_path(path)));
    }
    for (path, loaded) in found {
        match loaded {
            Ok(raw) => {
                if !manager.register(raw) {
                    error!(path = %path.display(), "schema_not_registered");
                }
            }
            Err(e) => error!(path = %path.display(), error = %e, "schema_load_failed"),
        }
    }
    debug!(owners = manager.owners().len(), "manager_ready");
    Ok(manager)
}

/// Validate one schema file and print a summary.
fn check(path: &Path) -> Result<(), CliError> {
    let schema = schema::check_path(path)?;
    println!(
        "OK: {} ({}) v{}, {} settings",
        schema.name,
        schema.id,
        schema.version,
        schema.settings.len()
    );
    Ok(())
}

/// Apply `KEY=VALUE` assignments to `id` and commit them.
fn set(
    manager: &Manager,
    id: &str,
    assignments: &[String],
) -> Result<schema::Values, CliError> {
    manager.select(id)?;
    for assignment in assignments {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            CliError::Usage(format!("expected KEY=VALUE, got '{}'", assignment))
        })?;
        manager.edit_input(key.trim(), value)?;
    }
    Ok(manager.commit()?)
}
