//! Catalog-wide backfill orchestration.
//!
//! Scans the record store for items lacking a valid extracted thumbnail and
//! drives them through the per-item service one at a time. Sequencing is
//! deliberate: each item costs a real video decode, and concurrent decodes
//! would contend for the same decoder resources. A best-effort batch job:
//! one item's failure never aborts the run.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    config::PipelineConfig,
    error::Result,
    service::{ItemOutcome, ThumbnailService},
    store::{CatalogStore, ProgressFn},
    types::{BackfillError, BackfillProgress},
};

pub struct BackfillRunner {
    service: Arc<ThumbnailService>,
    catalog: Arc<dyn CatalogStore>,
    pacing: Duration,
    retry_failed: bool,
}

impl std::fmt::Debug for BackfillRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackfillRunner")
            .field("pacing", &self.pacing)
            .field("retry_failed", &self.retry_failed)
            .finish()
    }
}

impl BackfillRunner {
    pub fn new(
        service: Arc<ThumbnailService>,
        catalog: Arc<dyn CatalogStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            service,
            catalog,
            pacing: config.pacing(),
            retry_failed: config.retry_failed,
        }
    }

    /// Run the backfill to completion (or cancellation) and return the
    /// terminal progress snapshot.
    ///
    /// Items are processed in the order the initial query returns them.
    /// Cancellation is cooperative and checked between items; an item is
    /// atomic once started. The only error this returns is a failed
    /// candidate query; per-item failures land in the snapshot's `errors`.
    pub async fn run(
        &self,
        token: &CancellationToken,
        on_progress: &ProgressFn,
    ) -> Result<BackfillProgress> {
        let items = self.catalog.backfill_candidates(self.retry_failed).await?;
        info!(total = items.len(), "starting thumbnail backfill");

        let mut progress = BackfillProgress::new(items.len());
        emit(on_progress, &progress);

        for (index, item) in items.iter().enumerate() {
            if token.is_cancelled() {
                info!(processed = progress.processed, "backfill cancelled");
                break;
            }

            progress.current = Some(item.title.clone());
            emit(on_progress, &progress);

            let outcome = self.service.process_item(item).await;
            progress.processed += 1;
            match outcome {
                ItemOutcome::Ready { .. } => {
                    progress.succeeded += 1;
                }
                ItemOutcome::Failed { reason } => {
                    progress.failed += 1;
                    progress.errors.push(BackfillError {
                        id: item.id.clone(),
                        title: item.title.clone(),
                        reason,
                    });
                }
            }
            emit(on_progress, &progress);

            // Yield point between items so progress indicators repaint.
            if index + 1 < items.len() && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        progress.current = None;
        emit(on_progress, &progress);

        info!(
            processed = progress.processed,
            succeeded = progress.succeeded,
            failed = progress.failed,
            "backfill finished"
        );
        Ok(progress)
    }
}

/// Hand the observer an owned snapshot; a panicking callback must not be
/// able to kill the run.
fn emit(on_progress: &ProgressFn, progress: &BackfillProgress) {
    let snapshot = progress.clone();
    if catch_unwind(AssertUnwindSafe(|| on_progress(snapshot))).is_err() {
        warn!("progress callback panicked");
    }
}
