//! Read-only thumbnail consistency sweep.
//!
//! Confirms that every catalog item satisfies the ready-thumbnail
//! invariant and reports the specific conditions each violator fails.
//! Never mutates; repair is always a subsequent backfill run.

use std::sync::Arc;

use tracing::info;

use crate::{
    error::Result,
    store::CatalogStore,
    types::{InvalidThumb, ThumbRecord, ThumbSource, ThumbStatus, VerifyReport},
};

pub struct Verifier {
    catalog: Arc<dyn CatalogStore>,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").finish()
    }
}

impl Verifier {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub async fn verify(&self) -> Result<VerifyReport> {
        let items = self.catalog.all_items().await?;
        let mut report = VerifyReport {
            total: items.len(),
            ..Default::default()
        };

        for item in items {
            let problems = thumb_problems(&item.thumb);
            if problems.is_empty() {
                report.valid += 1;
            } else {
                report.invalid.push(InvalidThumb {
                    id: item.id,
                    title: item.title,
                    problems,
                });
            }
        }

        info!(
            total = report.total,
            valid = report.valid,
            invalid = report.invalid.len(),
            "verification sweep complete"
        );
        Ok(report)
    }
}

/// Which of the four ready-invariant conditions a record violates.
fn thumb_problems(thumb: &ThumbRecord) -> Vec<String> {
    let mut problems = Vec::new();
    if thumb.source != ThumbSource::ExtractedFrame {
        problems.push("thumb source is fallback, expected extracted_frame".to_string());
    }
    if thumb.status != ThumbStatus::Ready {
        problems.push(format!(
            "thumb status is {}, expected ready",
            status_name(thumb.status)
        ));
    }
    if thumb.card_url.is_none() {
        problems.push("missing card url".to_string());
    }
    if thumb.poster_url.is_none() {
        problems.push("missing poster url".to_string());
    }
    problems
}

fn status_name(status: ThumbStatus) -> &'static str {
    match status {
        ThumbStatus::Pending => "pending",
        ThumbStatus::Processing => "processing",
        ThumbStatus::Ready => "ready",
        ThumbStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_record() -> ThumbRecord {
        ThumbRecord {
            status: ThumbStatus::Ready,
            source: ThumbSource::ExtractedFrame,
            card_url: Some("https://cdn.example/a_card.jpg".into()),
            poster_url: Some("https://cdn.example/a_poster.jpg".into()),
            frame_url: Some("https://cdn.example/a_frame.jpg".into()),
            frame_time: Some(1.0),
            extracted_at: Some(chrono::Utc::now()),
            error: None,
        }
    }

    #[test]
    fn valid_record_has_no_problems() {
        assert!(thumb_problems(&ready_record()).is_empty());
    }

    #[test]
    fn missing_poster_is_cited_specifically() {
        let mut record = ready_record();
        record.poster_url = None;
        let problems = thumb_problems(&record);
        assert_eq!(problems, vec!["missing poster url".to_string()]);
    }

    #[test]
    fn failed_record_collects_every_violation() {
        let record = ThumbRecord {
            status: ThumbStatus::Failed,
            source: ThumbSource::Fallback,
            error: Some("load failed".into()),
            ..Default::default()
        };
        let problems = thumb_problems(&record);
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("expected ready")));
        assert!(problems.iter().any(|p| p.contains("extracted_frame")));
    }
}
