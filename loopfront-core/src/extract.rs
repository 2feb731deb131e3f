//! Frame extraction.
//!
//! Given a source video URL and a target offset, produce one decoded frame
//! as a JPEG buffer at the video's native resolution. The decode itself is
//! blocking and runs under `spawn_blocking`; the whole attempt is bounded by
//! the configured load timeout so a hung fetch cannot stall the sequential
//! backfill queue.

use std::{io::Cursor, sync::Arc, time::Duration};

use image::{ImageEncoder, codecs::jpeg::JpegEncoder};
use tracing::{debug, warn};

use crate::{
    config::PipelineConfig,
    decode::MediaDecoder,
    error::{Result, ThumbError},
    types::{ExtractedFrame, RawFrame},
};

/// Extracts single frames from source videos through a [`MediaDecoder`].
#[derive(Clone)]
pub struct FrameExtractor {
    decoder: Arc<dyn MediaDecoder>,
    offsets: Vec<f64>,
    frame_quality: u8,
    load_timeout: Duration,
}

impl std::fmt::Debug for FrameExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameExtractor")
            .field("offsets", &self.offsets)
            .field("frame_quality", &self.frame_quality)
            .field("load_timeout", &self.load_timeout)
            .finish()
    }
}

impl FrameExtractor {
    pub fn new(decoder: Arc<dyn MediaDecoder>, config: &PipelineConfig) -> Self {
        Self {
            decoder,
            offsets: config.fallback_offsets.clone(),
            frame_quality: config.frame_quality,
            load_timeout: config.load_timeout(),
        }
    }

    /// Extract one frame at (approximately) `target_secs`.
    ///
    /// The offset is clamped to `min(0.5, duration)` when the video is
    /// shorter than the request; a seek past the end is never attempted.
    pub async fn extract_frame(
        &self,
        url: &str,
        target_secs: f64,
    ) -> Result<ExtractedFrame> {
        let decoder = Arc::clone(&self.decoder);
        let url = url.to_string();
        let quality = self.frame_quality;

        let attempt =
            tokio::task::spawn_blocking(move || -> Result<ExtractedFrame> {
                // The session owns the demuxer/decoder and is dropped on
                // every exit path of this closure.
                let mut session = decoder.open(&url)?;
                let target = clamp_target(target_secs, session.duration());
                session.seek(target)?;
                let raw = session.rasterize()?;
                let image_data = encode_jpeg(&raw, quality)?;
                Ok(ExtractedFrame {
                    width: raw.width,
                    height: raw.height,
                    image_data,
                    captured_at: target,
                })
            });

        // The timeout bounds how long the caller waits, not the decode
        // itself: a timed-out attempt keeps running on the blocking pool
        // until its session drops, and may still hold the source open when
        // the next fallback offset is tried against the same URL.
        match tokio::time::timeout(self.load_timeout, attempt).await {
            Ok(joined) => joined.map_err(|e| {
                ThumbError::Extraction(format!("decode task panicked: {e}"))
            })?,
            Err(_) => Err(ThumbError::Timeout),
        }
    }

    /// Try the configured offsets in order, returning the first success.
    ///
    /// Very short or malformed videos frequently cannot seek to 1 second,
    /// hence the descending ladder ending at 0.0.
    pub async fn extract_frame_with_fallback(
        &self,
        url: &str,
    ) -> Result<ExtractedFrame> {
        for &offset in &self.offsets {
            match self.extract_frame(url, offset).await {
                Ok(frame) => {
                    debug!(
                        url,
                        offset,
                        captured_at = frame.captured_at,
                        width = frame.width,
                        height = frame.height,
                        "extracted frame"
                    );
                    return Ok(frame);
                }
                Err(e) => {
                    warn!(url, offset, error = %e, "extraction attempt failed");
                }
            }
        }
        Err(ThumbError::Extraction("all offsets exhausted".to_string()))
    }
}

/// Never seek past the end: a request beyond the known duration retargets
/// to `min(0.5, duration)`.
fn clamp_target(target: f64, duration: Option<f64>) -> f64 {
    let target = target.max(0.0);
    match duration {
        Some(duration) if duration < target => duration.min(0.5),
        _ => target,
    }
}

/// Encode packed RGB24 as JPEG.
fn encode_jpeg(raw: &RawFrame, quality: u8) -> Result<Vec<u8>> {
    let expected = raw.width as usize * raw.height as usize * 3;
    if raw.rgb.len() != expected {
        return Err(ThumbError::Extraction(format!(
            "frame buffer size mismatch: got {} bytes, expected {expected}",
            raw.rgb.len()
        )));
    }

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(
            &raw.rgb,
            raw.width,
            raw.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ThumbError::Extraction(format!("encode failed: {e}")))?;
    Ok(buf.into_inner())
}
