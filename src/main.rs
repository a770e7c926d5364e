//! Command-line interface for the inventory binary.
//!
//! The dynamic inventory contract requires the script to respond to `--list`
//! and `--host <name>`. Only `--list` runs the full pipeline; `--host` and
//! flagless invocations print the empty inventory without touching the
//! configuration or any repository.

use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    process,
};

use clap::{ArgAction, Parser};
use emdi::{
    Error, InventoryDocument, RepositorySource, build_inventory, collect_targets, empty_inventory,
    load_config, load_static_vars, write_inventory,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command line interface for generating the dynamic inventory document.
#[derive(Debug, Parser)]
#[command(
    name = "emdi",
    version,
    about = "Generate an Ansible dynamic inventory from Enterprise Manager repositories"
)]
struct Cli {
    /// Print the full inventory grouped by operational attributes.
    #[arg(long = "list", action = ArgAction::SetTrue)]
    list: bool,

    /// Host to describe. Accepted for the inventory contract; lookup is not
    /// implemented and yields the empty inventory.
    #[arg(long = "host", value_name = "NAME")]
    host: Option<String>,

    /// Path to the YAML configuration file describing repository connections.
    #[arg(long = "config", value_name = "PATH", default_value = "config.yaml")]
    config: PathBuf,

    /// Path to the optional JSON document with static host and group
    /// variables.
    #[arg(
        long = "static-vars",
        value_name = "PATH",
        default_value = "static_vars.json"
    )]
    static_vars: PathBuf,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main() {
    init_tracing();

    if let Err(error) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1);
    }
}

/// Installs the diagnostics subscriber on stderr so stdout stays a clean
/// document.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from configuration loading, repository
/// collection, and serialization.
#[tokio::main(flavor = "current_thread")]
async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    if !cli.list {
        // `--host` lookup is unimplemented because `--list` already returns
        // the `_meta` section; the contract still requires a document.
        if let Some(host) = cli.host.as_deref() {
            debug!("host detail lookup for '{host}' is not implemented; printing the empty inventory");
        }
        return print_inventory(&empty_inventory());
    }

    let config = load_config(&cli.config)?;
    let statics = load_static_vars(&cli.static_vars)?;

    let records = collect_targets(&RepositorySource, &config).await?;
    let document = build_inventory(&records, &statics);

    print_inventory(&document)
}

/// Serializes the document to locked standard output.
fn print_inventory(document: &InventoryDocument) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_inventory(&mut handle, document)
}
