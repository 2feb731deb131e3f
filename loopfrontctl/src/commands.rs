//! Subcommand implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use loopfront_core::{
    BackfillRunner, PipelineConfig, ThumbnailService, Verifier,
    store::{CatalogStore, FsObjectStore},
    types::BackfillProgress,
};

use crate::{BackfillArgs, VerifyArgs, catalog_file::JsonCatalogStore};

async fn load_config(path: Option<&std::path::Path>) -> Result<PipelineConfig> {
    match path {
        None => Ok(PipelineConfig::default()),
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.with_context(
                || format!("reading config {}", path.display()),
            )?;
            toml::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))
        }
    }
}

pub async fn backfill(args: BackfillArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref()).await?;
    if let Some(pacing_ms) = args.pacing_ms {
        config.pacing_ms = pacing_ms;
    }

    let catalog = Arc::new(JsonCatalogStore::load(args.catalog).await?);

    if args.dry_run {
        let candidates =
            catalog.backfill_candidates(config.retry_failed).await?;
        println!("{} item(s) would be processed:", candidates.len());
        for item in candidates {
            println!("  {}  {}  [{}]", item.id, item.title, item.source_video_url);
        }
        return Ok(());
    }

    let decoder = make_decoder()?;
    let objects = Arc::new(FsObjectStore::new(args.media_dir, &args.base_url)?);
    let service = Arc::new(ThumbnailService::new(
        config.clone(),
        decoder,
        objects,
        catalog.clone(),
    )?);
    let runner = BackfillRunner::new(service, catalog.clone(), &config);

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current item");
            signal_token.cancel();
        }
    });

    let progress = runner.run(&token, &print_progress).await?;

    println!(
        "done: {} processed, {} succeeded, {} failed (of {})",
        progress.processed,
        progress.succeeded,
        progress.failed,
        progress.total
    );
    for error in &progress.errors {
        println!("  failed {} ({}): {}", error.id, error.title, error.reason);
    }
    Ok(())
}

fn print_progress(progress: BackfillProgress) {
    let current = progress
        .current
        .as_deref()
        .map(|title| format!(" :: {title}"))
        .unwrap_or_default();
    println!(
        "{}/{} processed ({} ok, {} failed){current}",
        progress.processed, progress.total, progress.succeeded, progress.failed
    );
}

pub async fn verify(args: VerifyArgs) -> Result<()> {
    let catalog = Arc::new(JsonCatalogStore::load(args.catalog).await?);
    let verifier = Verifier::new(catalog);
    let report = verifier.verify().await?;

    println!(
        "{} item(s): {} valid, {} invalid",
        report.total,
        report.valid,
        report.invalid.len()
    );
    for invalid in &report.invalid {
        println!("  {} ({})", invalid.id, invalid.title);
        for problem in &invalid.problems {
            println!("    - {problem}");
        }
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "ffmpeg")]
fn make_decoder() -> Result<Arc<dyn loopfront_core::decode::MediaDecoder>> {
    Ok(Arc::new(loopfront_core::decode::FfmpegDecoder::new()?))
}

#[cfg(not(feature = "ffmpeg"))]
fn make_decoder() -> Result<Arc<dyn loopfront_core::decode::MediaDecoder>> {
    anyhow::bail!(
        "this build has no media decoder; rebuild with `--features ffmpeg` \
         to run a real backfill (--dry-run works without one)"
    )
}
