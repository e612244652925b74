//! postmirror — mirror a remote list of content records into a directory.
//!
//! # Usage
//!
//! ```text
//! postmirror init [--source <URL|FILE>] [--store <DIR>] [--archive <DIR>] [--force]
//! postmirror sync [--dry-run] [--allow-empty] [--json]
//! postmirror status [--json]
//! postmirror diff
//! ```
//!
//! Every command accepts `--source`, `--store`, `--archive` and `--timeout`
//! overrides on top of `~/.postmirror/config.yaml` (or `--config <FILE>`).

mod commands;
mod source;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "postmirror",
    version,
    about = "Mirror remote content records into a local directory, archiving removed ones",
    long_about = None,
)]
struct Cli {
    /// Config file to use instead of ~/.postmirror/config.yaml.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log each write as well; archive moves are always logged (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config file for this mirror.
    Init(InitArgs),

    /// Fetch remote records and reconcile the local store with them.
    Sync(SyncArgs),

    /// Show what a sync would create, update or archive.
    Status(StatusArgs),

    /// Show unified diffs of what a sync would change.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Init(args) => args.run(config),
        Commands::Sync(args) => args.run(config),
        Commands::Status(args) => args.run(config),
        Commands::Diff(args) => args.run(config),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "info"
    } else {
        "warn,postmirror_sync::archive=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
