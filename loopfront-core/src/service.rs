//! Per-item thumbnail orchestration.
//!
//! `process_item` owns the full status lifecycle for one catalog item:
//! validate the source, mark it processing, extract and compose, upload the
//! three derivative objects, and resolve to a terminal `ready` or `failed`
//! write. Every error is contained here; the backfill orchestrator only
//! ever sees an [`ItemOutcome`].

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    compose::ThumbnailComposer,
    config::PipelineConfig,
    decode::MediaDecoder,
    error::{Result, ThumbError},
    extract::FrameExtractor,
    store::{CatalogStore, ObjectStore},
    types::{CatalogItem, ThumbPatch, ThumbUrls},
    validate::{SourcePolicy, resolve_source_url},
};

/// Terminal result of processing one item.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Ready { urls: ThumbUrls, frame_time: f64 },
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ItemOutcome::Ready { .. })
    }

    fn failed(reason: impl Into<String>) -> Self {
        ItemOutcome::Failed {
            reason: reason.into(),
        }
    }
}

pub struct ThumbnailService {
    config: PipelineConfig,
    policy: SourcePolicy,
    extractor: FrameExtractor,
    composer: ThumbnailComposer,
    objects: Arc<dyn ObjectStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl std::fmt::Debug for ThumbnailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailService")
            .field("config", &self.config)
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl ThumbnailService {
    pub fn new(
        config: PipelineConfig,
        decoder: Arc<dyn MediaDecoder>,
        objects: Arc<dyn ObjectStore>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Result<Self> {
        let policy = SourcePolicy::from_config(&config)?;
        let extractor = FrameExtractor::new(decoder, &config);
        let composer = ThumbnailComposer::new(&config);
        Ok(Self {
            config,
            policy,
            extractor,
            composer,
            objects,
            catalog,
        })
    }

    /// Process one item end to end. All record writes are awaited before
    /// this returns, so status is durably observable immediately after.
    pub async fn process_item(&self, item: &CatalogItem) -> ItemOutcome {
        // Pre-validation short-circuit: no extraction was attempted, so no
        // `processing` state is ever written for an invalid source.
        if !self.policy.is_valid_video_url(&item.source_video_url) {
            let reason = ThumbError::InvalidSource.to_string();
            warn!(
                id = %item.id,
                source = %item.source_video_url,
                "rejecting item without extraction"
            );
            if let Err(e) = self
                .catalog
                .update_thumb(&item.id, ThumbPatch::failed(&reason))
                .await
            {
                error!(id = %item.id, error = %e, "failed status write failed");
            }
            return ItemOutcome::failed(reason);
        }

        if let Err(e) = self
            .catalog
            .update_thumb(&item.id, ThumbPatch::Processing)
            .await
        {
            // Without the in-flight mark we never started; nothing to
            // resolve back to a terminal state.
            error!(id = %item.id, error = %e, "processing status write failed");
            return ItemOutcome::failed(e.to_string());
        }

        match self.run_pipeline(item).await {
            Ok((urls, frame_time)) => {
                let patch = ThumbPatch::ready(urls.clone(), frame_time);
                if let Err(e) =
                    self.catalog.update_thumb(&item.id, patch).await
                {
                    error!(id = %item.id, error = %e, "ready status write failed");
                    return self.resolve_failed(item, e.to_string()).await;
                }
                info!(
                    id = %item.id,
                    frame_time,
                    card = %urls.card,
                    "thumbnail ready"
                );
                ItemOutcome::Ready { urls, frame_time }
            }
            Err(e) => {
                warn!(id = %item.id, error = %e, "thumbnail pipeline failed");
                self.resolve_failed(item, e.to_string()).await
            }
        }
    }

    /// Extraction through upload; any error funnels back to the caller's
    /// single failure path.
    async fn run_pipeline(
        &self,
        item: &CatalogItem,
    ) -> Result<(ThumbUrls, f64)> {
        let resolved =
            resolve_source_url(&self.config.origin, &item.source_video_url)?;

        let frame =
            self.extractor.extract_frame_with_fallback(&resolved).await?;

        let composer = self.composer.clone();
        let set = tokio::task::spawn_blocking(move || composer.compose(&frame))
            .await
            .map_err(|e| {
                ThumbError::Composition(format!("compose task panicked: {e}"))
            })??;

        // The frame artifact is a copy of the card image, kept for
        // reference and debugging. Remove-then-upload makes reprocessing
        // overwrite rather than duplicate.
        let uploads: [(&str, &[u8]); 3] = [
            ("card", &set.card_image),
            ("poster", &set.poster_image),
            ("frame", &set.card_image),
        ];
        for (suffix, bytes) in uploads {
            let key = object_key(&item.id, suffix);
            self.objects.remove(&key).await?;
            self.objects.upload(&key, bytes, "image/jpeg").await?;
        }

        let urls = ThumbUrls {
            card: self.objects.public_url(&object_key(&item.id, "card")),
            poster: self.objects.public_url(&object_key(&item.id, "poster")),
            frame: self.objects.public_url(&object_key(&item.id, "frame")),
        };
        Ok((urls, set.frame_time))
    }

    /// Terminal failure write. Best-effort: a failing record store here is
    /// logged and folded into the outcome, never propagated.
    async fn resolve_failed(
        &self,
        item: &CatalogItem,
        reason: String,
    ) -> ItemOutcome {
        if let Err(e) = self
            .catalog
            .update_thumb(&item.id, ThumbPatch::failed(&reason))
            .await
        {
            error!(id = %item.id, error = %e, "failed status write failed");
        }
        ItemOutcome::failed(reason)
    }
}

fn object_key(item_id: &str, suffix: &str) -> String {
    format!("{item_id}_{suffix}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_follow_naming_scheme() {
        assert_eq!(object_key("itm_9", "card"), "itm_9_card.jpg");
        assert_eq!(object_key("itm_9", "poster"), "itm_9_poster.jpg");
        assert_eq!(object_key("itm_9", "frame"), "itm_9_frame.jpg");
    }
}
