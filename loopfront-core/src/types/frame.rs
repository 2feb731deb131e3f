//! Ephemeral frame data flowing between pipeline stages.
//!
//! Nothing here is persisted directly; only the uploaded derivatives of a
//! [`ThumbnailSet`] outlive a single `process_item` call.

/// One decoded raster frame in packed RGB24, straight from the decoder.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Packed RGB24, `width * height * 3` bytes, no row padding.
    pub rgb: Vec<u8>,
}

/// A frame extracted from a source video, JPEG-encoded at native
/// resolution. Owned solely by one extraction call.
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    pub image_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Offset (seconds) actually reached after clamping and fallback.
    pub captured_at: f64,
}

/// The two aspect-cropped derivatives produced from one extracted frame,
/// consumed immediately by the per-item orchestrator.
#[derive(Debug, Clone)]
pub struct ThumbnailSet {
    pub card_image: Vec<u8>,
    pub poster_image: Vec<u8>,
    pub frame_time: f64,
    pub source_width: u32,
    pub source_height: u32,
}
