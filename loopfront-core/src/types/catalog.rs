//! Catalog item thumbnail metadata.
//!
//! The catalog record itself lives in the external record store; this module
//! models the sub-slice of its fields owned by the thumbnail pipeline, plus
//! the typed patch used for every status write. The patch is an enum rather
//! than a bag of optionals so a half-written state (for example `ready`
//! without URLs) cannot be expressed at the type level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an item's thumbnail, owned exclusively by this
/// pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThumbStatus {
    #[default]
    Pending,
    /// Transient; never a terminal persisted value after a run completes.
    Processing,
    Ready,
    Failed,
}

impl ThumbStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ThumbStatus::Ready | ThumbStatus::Failed)
    }
}

/// How the currently-stored thumbnail was produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThumbSource {
    /// A genuine frame decoded from the source video.
    ExtractedFrame,
    /// Placeholder or permanent failure; no real extraction succeeded.
    #[default]
    Fallback,
}

/// Persisted thumbnail metadata for one catalog item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbRecord {
    #[serde(default)]
    pub status: ThumbStatus,
    #[serde(default)]
    pub source: ThumbSource,
    pub card_url: Option<String>,
    pub poster_url: Option<String>,
    pub frame_url: Option<String>,
    /// Video timestamp (seconds) used for the last successful extraction.
    pub frame_time: Option<f64>,
    pub extracted_at: Option<DateTime<Utc>>,
    /// Human-readable failure reason; cleared on success.
    pub error: Option<String>,
}

/// One item of the storefront catalog, as read from the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub source_video_url: String,
    #[serde(default)]
    pub thumb: ThumbRecord,
}

impl CatalogItem {
    /// Whether a backfill run should pick this item up: anything not
    /// already confirmed as a successful real extraction. `retry_failed`
    /// controls whether previously-failed items re-enter the sweep.
    pub fn needs_backfill(&self, retry_failed: bool) -> bool {
        match self.thumb.status {
            ThumbStatus::Ready => {
                self.thumb.source != ThumbSource::ExtractedFrame
            }
            ThumbStatus::Failed => retry_failed,
            ThumbStatus::Pending | ThumbStatus::Processing => true,
        }
    }
}

/// Public URLs of the three uploaded derivative objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbUrls {
    pub card: String,
    pub poster: String,
    pub frame: String,
}

/// A status write against one item's thumbnail metadata.
///
/// Only three transitions exist; each carries exactly the fields the record
/// store update needs, so callers cannot persist an inconsistent record.
#[derive(Debug, Clone)]
pub enum ThumbPatch {
    /// Mark the item in-flight before extraction begins.
    Processing,
    /// Terminal success: URLs, frame time, timestamp; clears the error.
    Ready {
        urls: ThumbUrls,
        frame_time: f64,
        extracted_at: DateTime<Utc>,
    },
    /// Terminal failure: reverts to the fallback source with a reason.
    Failed { reason: String },
}

impl ThumbPatch {
    pub fn ready(urls: ThumbUrls, frame_time: f64) -> Self {
        ThumbPatch::Ready {
            urls,
            frame_time,
            extracted_at: Utc::now(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        ThumbPatch::Failed {
            reason: reason.into(),
        }
    }

    /// The status this patch writes.
    pub fn status(&self) -> ThumbStatus {
        match self {
            ThumbPatch::Processing => ThumbStatus::Processing,
            ThumbPatch::Ready { .. } => ThumbStatus::Ready,
            ThumbPatch::Failed { .. } => ThumbStatus::Failed,
        }
    }

    /// Apply this patch to a thumbnail record. Store adapters call this so
    /// every backend interprets a patch identically.
    pub fn apply(&self, thumb: &mut ThumbRecord) {
        match self {
            ThumbPatch::Processing => {
                thumb.status = ThumbStatus::Processing;
            }
            ThumbPatch::Ready {
                urls,
                frame_time,
                extracted_at,
            } => {
                thumb.status = ThumbStatus::Ready;
                thumb.source = ThumbSource::ExtractedFrame;
                thumb.card_url = Some(urls.card.clone());
                thumb.poster_url = Some(urls.poster.clone());
                thumb.frame_url = Some(urls.frame.clone());
                thumb.frame_time = Some(*frame_time);
                thumb.extracted_at = Some(*extracted_at);
                thumb.error = None;
            }
            ThumbPatch::Failed { reason } => {
                thumb.status = ThumbStatus::Failed;
                thumb.source = ThumbSource::Fallback;
                thumb.error = Some(reason.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ThumbStatus, source: ThumbSource) -> CatalogItem {
        CatalogItem {
            id: "itm_1".to_string(),
            title: "Neon Rain".to_string(),
            source_video_url: "/videos/neon-rain.mp4".to_string(),
            thumb: ThumbRecord {
                status,
                source,
                ..Default::default()
            },
        }
    }

    #[test]
    fn ready_patch_satisfies_invariant() {
        let mut thumb = ThumbRecord {
            status: ThumbStatus::Processing,
            error: Some("stale".to_string()),
            ..Default::default()
        };
        ThumbPatch::ready(
            ThumbUrls {
                card: "https://cdn.example/itm_1_card.jpg".to_string(),
                poster: "https://cdn.example/itm_1_poster.jpg".to_string(),
                frame: "https://cdn.example/itm_1_frame.jpg".to_string(),
            },
            1.0,
        )
        .apply(&mut thumb);

        assert_eq!(thumb.status, ThumbStatus::Ready);
        assert_eq!(thumb.source, ThumbSource::ExtractedFrame);
        assert!(thumb.card_url.is_some() && thumb.poster_url.is_some());
        assert!(thumb.error.is_none());
    }

    #[test]
    fn failed_patch_reverts_to_fallback() {
        let mut thumb = ThumbRecord {
            status: ThumbStatus::Processing,
            source: ThumbSource::ExtractedFrame,
            ..Default::default()
        };
        ThumbPatch::failed("load failed").apply(&mut thumb);

        assert_eq!(thumb.status, ThumbStatus::Failed);
        assert_eq!(thumb.source, ThumbSource::Fallback);
        assert_eq!(thumb.error.as_deref(), Some("load failed"));
    }

    #[test]
    fn backfill_selection_honors_retry_policy() {
        assert!(item(ThumbStatus::Pending, ThumbSource::Fallback)
            .needs_backfill(true));
        assert!(item(ThumbStatus::Failed, ThumbSource::Fallback)
            .needs_backfill(true));
        assert!(!item(ThumbStatus::Failed, ThumbSource::Fallback)
            .needs_backfill(false));
        // Ready but not from a real extraction still qualifies.
        assert!(item(ThumbStatus::Ready, ThumbSource::Fallback)
            .needs_backfill(false));
        assert!(!item(ThumbStatus::Ready, ThumbSource::ExtractedFrame)
            .needs_backfill(true));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ThumbStatus::Ready).unwrap(),
            "\"ready\""
        );
        assert_eq!(
            serde_json::to_string(&ThumbSource::ExtractedFrame).unwrap(),
            "\"extracted_frame\""
        );
    }
}
