//! Media decode abstraction.
//!
//! The extraction algorithm (offset clamping, fallback ladder, resource
//! cleanup) is independent of how frames are actually decoded. Production
//! uses the FFmpeg adapter behind the `ffmpeg` feature; tests supply a
//! deterministic fake.
//!
//! Sessions are blocking by design: decoders are not async, so the
//! extractor runs them under `tokio::task::spawn_blocking`. A session owns
//! all decoder state and releases it on `Drop`, whichever way the
//! extraction exits, so repeated calls do not leak decoder instances.

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegDecoder;

use crate::{error::Result, types::RawFrame};

/// Opens decode sessions against source video URLs.
pub trait MediaDecoder: Send + Sync {
    /// Load the video's metadata (no full decode) and return a session
    /// positioned at the start of the stream.
    fn open(&self, url: &str) -> Result<Box<dyn DecodeSession>>;
}

/// One open video, seekable, able to rasterize the current frame.
pub trait DecodeSession: Send {
    /// Duration in seconds, when the container reports one.
    fn duration(&self) -> Option<f64>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Position the stream at `seconds`. Callers clamp before seeking;
    /// implementations may treat a failed seek as "decode from the start".
    fn seek(&mut self, seconds: f64) -> Result<()>;

    /// Decode and return the frame at the current position as packed RGB24
    /// at the video's native resolution.
    fn rasterize(&mut self) -> Result<RawFrame>;
}
