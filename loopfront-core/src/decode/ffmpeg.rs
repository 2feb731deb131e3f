//! FFmpeg-backed decode session.

use ffmpeg_next as ffmpeg;
use tracing::{debug, warn};

use crate::{
    decode::{DecodeSession, MediaDecoder},
    error::{Result, ThumbError},
    types::RawFrame,
};

/// Cap on packets examined while hunting for a decodable frame.
const MAX_PACKETS: usize = 500;

/// Decoder backed by the system FFmpeg libraries.
#[derive(Debug, Clone, Copy)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    pub fn new() -> Result<Self> {
        ffmpeg::init().map_err(|e| {
            ThumbError::Extraction(format!("failed to initialize ffmpeg: {e}"))
        })?;
        Ok(Self)
    }
}

impl MediaDecoder for FfmpegDecoder {
    fn open(&self, url: &str) -> Result<Box<dyn DecodeSession>> {
        Ok(Box::new(FfmpegSession::open(url)?))
    }
}

/// One open demuxer + video decoder pair. Dropping the session releases
/// both, on every exit path.
struct FfmpegSession {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::decoder::Video,
    seek_succeeded: bool,
}

impl FfmpegSession {
    fn open(url: &str) -> Result<Self> {
        let input = ffmpeg::format::input(&url).map_err(|e| {
            ThumbError::Extraction(format!("load failed: {e}"))
        })?;

        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| {
                ThumbError::Extraction("no video stream found".to_string())
            })?;
        let stream_index = stream.index();
        let codec_params = stream.parameters();

        let codec =
            ffmpeg::codec::context::Context::from_parameters(codec_params)?;
        let decoder = codec.decoder().video()?;

        debug!(
            url,
            width = decoder.width(),
            height = decoder.height(),
            "opened video stream"
        );

        Ok(Self {
            input,
            stream_index,
            decoder,
            seek_succeeded: false,
        })
    }
}

impl DecodeSession for FfmpegSession {
    fn duration(&self) -> Option<f64> {
        // Format duration is in AV_TIME_BASE units (microseconds).
        let duration = self.input.duration();
        (duration > 0).then(|| duration as f64 / 1_000_000.0)
    }

    fn width(&self) -> u32 {
        self.decoder.width()
    }

    fn height(&self) -> u32 {
        self.decoder.height()
    }

    fn seek(&mut self, seconds: f64) -> Result<()> {
        let position = (seconds * 1_000_000.0) as i64;
        match self.input.seek(position, ..position) {
            Ok(()) => {
                self.seek_succeeded = true;
                self.decoder.flush();
                Ok(())
            }
            Err(e) => {
                // Extract from the beginning instead; the frame hunt below
                // skips early frames to avoid black lead-ins.
                warn!(seconds, error = %e, "seek failed, decoding from start");
                self.seek_succeeded = false;
                Ok(())
            }
        }
    }

    fn rasterize(&mut self) -> Result<RawFrame> {
        let mut scaler = ffmpeg::software::scaling::context::Context::get(
            self.decoder.format(),
            self.decoder.width(),
            self.decoder.height(),
            ffmpeg::format::Pixel::RGB24,
            self.decoder.width(),
            self.decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .map_err(|e| {
            ThumbError::Extraction(format!("no rasterization context: {e}"))
        })?;

        let mut decoded = ffmpeg::util::frame::video::Video::empty();
        let mut rgb = ffmpeg::util::frame::video::Video::empty();
        let mut frame_count = 0usize;
        let mut packet_count = 0usize;

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }
            packet_count += 1;
            if packet_count > MAX_PACKETS {
                break;
            }

            if let Err(e) = self.decoder.send_packet(&packet) {
                debug!("failed to send packet: {e}");
                continue;
            }

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                frame_count += 1;

                // When the seek fell back to the start, skip the first few
                // frames to avoid black lead-in frames.
                if !self.seek_succeeded && frame_count < 10 {
                    continue;
                }

                scaler.run(&decoded, &mut rgb).map_err(|e| {
                    ThumbError::Extraction(format!(
                        "failed to scale frame: {e}"
                    ))
                })?;

                return Ok(destride(&rgb));
            }
        }

        Err(ThumbError::Extraction(format!(
            "no frame decoded after {packet_count} packets"
        )))
    }
}

/// Copy the frame out of FFmpeg's padded buffer into packed RGB24 rows.
fn destride(frame: &ffmpeg::util::frame::video::Video) -> RawFrame {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width as usize * 3;

    let rgb = if stride == row_len {
        data.to_vec()
    } else {
        let mut packed = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            packed.extend_from_slice(&data[start..start + row_len]);
        }
        packed
    };

    RawFrame { width, height, rgb }
}
