//! Pipeline configuration.
//!
//! All knobs the pipeline exposes live here with serde-friendly defaults so
//! a deployment can override them from a TOML/JSON file. Durations are
//! expressed in integral units to keep the serialized form obvious.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed output shape for a derived thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    pub width: u32,
    pub height: u32,
}

impl OutputShape {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Configuration for the thumbnail extraction and backfill pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Origin used to qualify relative source URLs.
    pub origin: String,

    /// Extensions accepted as genuine video sources (lowercase, with dot).
    pub video_extensions: Vec<String>,

    /// Regex patterns matching placeholder-image hosts; sources matching
    /// any of these are rejected without an extraction attempt.
    pub placeholder_hosts: Vec<String>,

    /// Seek offsets tried in order until one yields a frame.
    pub fallback_offsets: Vec<f64>,

    /// Near-square shape shown on catalog cards.
    pub card: OutputShape,

    /// Widescreen shape shown on detail pages.
    pub poster: OutputShape,

    /// JPEG quality for the raw extracted frame (0-100).
    pub frame_quality: u8,

    /// JPEG quality for the cropped derivatives (0-100).
    pub crop_quality: u8,

    /// Bound on a single load+seek+rasterize attempt. A hung fetch would
    /// otherwise stall the whole sequential backfill queue.
    pub load_timeout_secs: u64,

    /// Delay between backfill items; a yield point so progress indicators
    /// can repaint. Tests set this to zero.
    pub pacing_ms: u64,

    /// Whether a backfill run re-attempts items already marked `failed`.
    /// Defaults to `true`: a transient network failure should not
    /// permanently exclude an item.
    pub retry_failed: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            video_extensions: vec![
                ".mp4".to_string(),
                ".webm".to_string(),
                ".mov".to_string(),
            ],
            placeholder_hosts: default_placeholder_hosts(),
            fallback_offsets: vec![1.0, 0.5, 0.2, 0.0],
            card: OutputShape::new(600, 600),
            poster: OutputShape::new(1280, 720),
            frame_quality: 90,
            crop_quality: 85,
            load_timeout_secs: 30,
            pacing_ms: 100,
            retry_failed: true,
        }
    }
}

impl PipelineConfig {
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

fn default_placeholder_hosts() -> Vec<String> {
    [
        r"(?i)placehold\.co",
        r"(?i)via\.placeholder\.com",
        r"(?i)placeholder\.com",
        r"(?i)picsum\.photos",
        r"(?i)dummyimage\.com",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
