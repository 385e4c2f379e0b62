//! Text Harvester main entry point
//!
//! This is the command-line interface for the text harvester.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use text_harvester::config::{load_config_with_hash, Config};
use text_harvester::crawler::run_harvest;
use text_harvester::storage::CreateMode;
use tracing_subscriber::EnvFilter;

/// Text Harvester: scrapes typing texts into a SQLite database
///
/// Reads the list of texts from the listing page, fetches every text's detail
/// page and stores its text, source, type and author in a fresh database.
#[derive(Parser, Debug)]
#[command(name = "text-harvester")]
#[command(version)]
#[command(about = "Scrapes typing texts into a SQLite database", long_about = None)]
struct Cli {
    /// Path of the database file to create [default: texts.db]
    #[arg(long = "db", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write into an existing database instead of refusing to touch it
    #[arg(long)]
    open_existing: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

// Current-thread runtime: texts are harvested strictly one after another
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Some(db) = &cli.db {
        config.output.database_path = db.to_string_lossy().into_owned();
    }

    let mode = if cli.open_existing {
        CreateMode::OpenExisting
    } else {
        CreateMode::CreateNew
    };

    match run_harvest(&config, mode).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Accepts the single-dash `-db` spelling alongside `--db`
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-db") => OsString::from("--db"),
            Some(s) if s.starts_with("-db=") => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("text_harvester=info,warn"),
            1 => EnvFilter::new("text_harvester=debug,info"),
            2 => EnvFilter::new("text_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
