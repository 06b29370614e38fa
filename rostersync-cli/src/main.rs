//! rostersync: keep Dropbox employee profiles in line with the roster.
//!
//! # Usage
//!
//! ```text
//! rostersync sync [--dry-run] [--json] [--token T] [--app-key K --app-secret S --refresh-token R]
//!                 [--local-root DIR] [--config FILE] [--template-dir DIR]
//! rostersync diff [same storage options]
//! ```
//!
//! Credentials fall back to `DROPBOX_ACCESS_TOKEN`, `DROPBOX_APP_KEY`,
//! `DROPBOX_APP_SECRET` and `DROPBOX_REFRESH_TOKEN`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rostersync",
    version,
    about = "Reconcile employee profile documents against the roster",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Update changed profile fields and create missing profiles.
    Sync(SyncArgs),

    /// Show what `sync` would change, as unified diffs. Writes nothing.
    Diff(DiffArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
