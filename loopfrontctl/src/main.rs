//! Loopfront thumbnail pipeline administration CLI.
//!
//! Runs the backfill and verification sweeps of `loopfront-core` against a
//! JSON catalog file and a directory-backed object store. Intended for
//! operators; the storefront itself drives the same library directly.

mod catalog_file;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "loopfrontctl",
    about = "Administer the Loopfront thumbnail pipeline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract thumbnails for every catalog item that lacks one
    Backfill(BackfillArgs),
    /// Check every item against the ready-thumbnail invariant
    Verify(VerifyArgs),
}

#[derive(Debug, clap::Args)]
struct BackfillArgs {
    /// Path to the catalog JSON file
    #[arg(long)]
    catalog: PathBuf,

    /// Directory the derivative images are written to
    #[arg(long)]
    media_dir: PathBuf,

    /// Public URL prefix the media directory is served from
    #[arg(long)]
    base_url: String,

    /// Optional pipeline config overrides (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay between items in milliseconds (overrides config)
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// List the items a run would process, without processing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, clap::Args)]
struct VerifyArgs {
    /// Path to the catalog JSON file
    #[arg(long)]
    catalog: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "loopfrontctl=info,loopfront_core=info".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Backfill(args) => commands::backfill(args).await,
        Command::Verify(args) => commands::verify(args).await,
    }
}
