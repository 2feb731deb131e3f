//! Shared fixtures for the pipeline integration suite.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use loopfront_core::{
    config::PipelineConfig,
    decode::{DecodeSession, MediaDecoder},
    error::{Result, ThumbError},
    types::{CatalogItem, RawFrame, ThumbRecord},
};

/// One registered fake source video.
#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fail_open: bool,
    /// Seeks above this offset fail, exercising the fallback ladder.
    pub fail_seek_above: Option<f64>,
}

impl FakeVideo {
    pub fn clip(duration: f64) -> Self {
        Self {
            duration,
            width: 640,
            height: 360,
            fail_open: false,
            fail_seek_above: None,
        }
    }
}

/// Deterministic in-process decoder. Tracks open sessions so tests can
/// assert that every exit path releases its decode resources.
#[derive(Debug, Default)]
pub struct FakeDecoder {
    videos: HashMap<String, FakeVideo>,
    open_sessions: Arc<AtomicUsize>,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, url: &str, video: FakeVideo) -> Self {
        self.videos.insert(url.to_string(), video);
        self
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

impl MediaDecoder for FakeDecoder {
    fn open(&self, url: &str) -> Result<Box<dyn DecodeSession>> {
        let video = self
            .videos
            .get(url)
            .filter(|v| !v.fail_open)
            .cloned()
            .ok_or_else(|| {
                ThumbError::Extraction("load failed".to_string())
            })?;
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            video,
            counter: Arc::clone(&self.open_sessions),
        }))
    }
}

struct FakeSession {
    video: FakeVideo,
    counter: Arc<AtomicUsize>,
}

impl DecodeSession for FakeSession {
    fn duration(&self) -> Option<f64> {
        Some(self.video.duration)
    }

    fn width(&self) -> u32 {
        self.video.width
    }

    fn height(&self) -> u32 {
        self.video.height
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        assert!(
            seconds <= self.video.duration,
            "seek past end: {seconds} > {}",
            self.video.duration
        );
        if let Some(limit) = self.video.fail_seek_above {
            if seconds > limit {
                return Err(ThumbError::Extraction(format!(
                    "seek to {seconds} failed"
                )));
            }
        }
        Ok(())
    }

    fn rasterize(&mut self) -> Result<RawFrame> {
        let (w, h) = (self.video.width, self.video.height);
        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                rgb.push((x % 256) as u8);
                rgb.push((y % 256) as u8);
                rgb.push(90);
            }
        }
        Ok(RawFrame { width: w, height: h, rgb })
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Decoder whose `open` blocks until released, standing in for a source
/// that accepts the connection and then never delivers data.
#[derive(Debug, Default)]
pub struct StalledDecoder {
    released: Arc<AtomicBool>,
    opens: Arc<AtomicUsize>,
}

impl StalledDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unblock every pending and future `open`, letting the abandoned
    /// blocking tasks exit so the runtime can shut down promptly.
    pub fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl MediaDecoder for StalledDecoder {
    fn open(&self, _url: &str) -> Result<Box<dyn DecodeSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        while !self.released.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(25));
        }
        Err(ThumbError::Extraction("load failed".to_string()))
    }
}

/// Catalog item pointing at `source`, with default (pending) metadata.
pub fn pending_item(id: &str, source: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        title: format!("Loop {id}"),
        source_video_url: source.to_string(),
        thumb: ThumbRecord::default(),
    }
}

/// The URL the pipeline resolves a relative source to, for registering
/// fake videos under the address the extractor will actually request.
pub fn resolved(config: &PipelineConfig, source: &str) -> String {
    if source.starts_with("http") {
        source.to_string()
    } else {
        format!("{}{source}", config.origin.trim_end_matches('/'))
    }
}

/// Test config: zero pacing, short timeout.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        pacing_ms: 0,
        load_timeout_secs: 5,
        ..Default::default()
    }
}
