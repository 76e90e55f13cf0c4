//! `taxreg`: command-line front end for the taxpayer registry.
//!
//! # Usage
//!
//! ```text
//! taxreg [--db <PATH> | --memory] [--log-level <LEVEL>] [--log-dir <DIR>] <COMMAND>
//! taxreg list [--json]
//! taxreg add <TID> <FIRST_NAME> <LAST_NAME> <ADDRESS>
//! taxreg search <TID> [--json]
//! ```
//!
//! Flags override `TAXREG_DB_PATH`, `TAXREG_LOG_LEVEL` and `TAXREG_LOG_DIR`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use taxreg_core::{
    init_logging, open_store, RegistryConfig, RegistryError, RegistryService, StoreBackend,
};

use commands::{AddArgs, ListArgs, SearchArgs};

#[derive(Parser, Debug)]
#[command(
    name = "taxreg",
    version,
    about = "Register and look up taxpayer records",
    long_about = None,
)]
struct Cli {
    /// SQLite database file backing the registry.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory registry.
    #[arg(long, global = true)]
    memory: bool,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every registered taxpayer.
    List(ListArgs),

    /// Register a new taxpayer.
    Add(AddArgs),

    /// Look up one taxpayer by TID.
    Search(SearchArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Add(_) => "add",
            Self::Search(_) => "search",
        }
    }
}

impl Cli {
    fn resolve_config(&self) -> Result<RegistryConfig> {
        let mut config = RegistryConfig::from_env().context("invalid registry environment")?;
        if self.memory {
            config.store = StoreBackend::Memory;
        } else if let Some(path) = &self.db {
            config.store = StoreBackend::Sqlite { path: path.clone() };
        }
        if let Some(level) = &self.log_level {
            config
                .set_log_level(level)
                .context("invalid --log-level")?;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)
            .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;
    }

    let store = open_store(&config.store).context("failed to open taxpayer store")?;
    let service = RegistryService::new(store);

    info!(
        "event=cli_command module=cli status=start command={} backend={}",
        cli.command.name(),
        backend_label(&config.store)
    );
    match cli.command {
        Commands::List(args) => commands::list(&service, &args),
        Commands::Add(args) => commands::add(&service, &args),
        Commands::Search(args) => commands::search(&service, &args),
    }
}

fn backend_label(backend: &StoreBackend) -> &'static str {
    match backend {
        StoreBackend::Memory => "memory",
        StoreBackend::Sqlite { .. } => "sqlite",
    }
}

/// 2 = invalid argument, 3 = duplicate TID, 1 = anything else.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RegistryError>() {
        Some(RegistryError::InvalidArgument(_)) => 2,
        Some(RegistryError::DuplicateKey(_)) => 3,
        _ => 1,
    }
}
