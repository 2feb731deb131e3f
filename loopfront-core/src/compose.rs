//! Thumbnail composition.
//!
//! Center-crop-to-fill: the extracted frame is cropped to the target aspect
//! ratio around its center, then scaled to the exact output shape. Both the
//! card and poster derive from the same single extracted frame, so total
//! decode cost stays at one seek per item.

use std::io::Cursor;

use image::{ImageEncoder, codecs::jpeg::JpegEncoder, imageops::FilterType};
use tracing::debug;

use crate::{
    config::{OutputShape, PipelineConfig},
    error::{Result, ThumbError},
    types::{ExtractedFrame, ThumbnailSet},
};

/// Produces the fixed card and poster derivatives from an extracted frame.
#[derive(Debug, Clone)]
pub struct ThumbnailComposer {
    card: OutputShape,
    poster: OutputShape,
    quality: u8,
}

impl ThumbnailComposer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            card: config.card,
            poster: config.poster,
            quality: config.crop_quality,
        }
    }

    /// Produce both derivatives. CPU-bound; the orchestrator runs this
    /// under `spawn_blocking`.
    pub fn compose(&self, frame: &ExtractedFrame) -> Result<ThumbnailSet> {
        let card_image =
            crop_to_fit(&frame.image_data, self.card, self.quality)?;
        let poster_image =
            crop_to_fit(&frame.image_data, self.poster, self.quality)?;

        debug!(
            source_width = frame.width,
            source_height = frame.height,
            card_bytes = card_image.len(),
            poster_bytes = poster_image.len(),
            "composed thumbnail set"
        );

        Ok(ThumbnailSet {
            card_image,
            poster_image,
            frame_time: frame.captured_at,
            source_width: frame.width,
            source_height: frame.height,
        })
    }
}

/// Crop `source` (an encoded image) to fill `shape` exactly, preserving
/// aspect ratio, and re-encode as JPEG.
pub fn crop_to_fit(
    source: &[u8],
    shape: OutputShape,
    quality: u8,
) -> Result<Vec<u8>> {
    let img = image::load_from_memory(source).map_err(|e| {
        ThumbError::Composition(format!("source image not decodable: {e}"))
    })?;

    let (x, y, w, h) = crop_rect(img.width(), img.height(), shape);
    let scaled = img.crop_imm(x, y, w, h).resize_exact(
        shape.width,
        shape.height,
        FilterType::Triangle,
    );

    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(
            scaled.to_rgb8().as_raw(),
            shape.width,
            shape.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| {
            ThumbError::Composition(format!("encode failed: {e}"))
        })?;
    Ok(buf.into_inner())
}

/// Centered source rectangle matching the target aspect ratio.
///
/// A relatively wider source is cropped left/right; a relatively taller (or
/// equal) source is cropped top/bottom.
fn crop_rect(src_w: u32, src_h: u32, shape: OutputShape) -> (u32, u32, u32, u32) {
    let source_aspect = f64::from(src_w) / f64::from(src_h);
    let target_aspect = shape.aspect();

    if source_aspect > target_aspect {
        let crop_w = (f64::from(src_h) * target_aspect).round() as u32;
        let x = (src_w - crop_w.min(src_w)) / 2;
        (x, 0, crop_w.min(src_w), src_h)
    } else {
        let crop_h = (f64::from(src_w) / target_aspect).round() as u32;
        let y = (src_h - crop_h.min(src_h)) / 2;
        (0, y, src_w, crop_h.min(src_h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_source_crops_left_right() {
        // 16:9 source into a square: crop width = 1080, left margin 420.
        let (x, y, w, h) = crop_rect(1920, 1080, OutputShape::new(600, 600));
        assert_eq!((x, y, w, h), (420, 0, 1080, 1080));
    }

    #[test]
    fn tall_source_crops_top_bottom() {
        // 9:16 source into a 16:9 poster: crop height = 1080 * 9/16.
        let (x, y, w, h) = crop_rect(1080, 1920, OutputShape::new(1280, 720));
        assert_eq!(w, 1080);
        assert_eq!(h, 608); // round(1080 / (16/9))
        assert_eq!(x, 0);
        assert_eq!(y, (1920 - 608) / 2);
    }

    #[test]
    fn matching_aspect_is_a_full_frame_crop() {
        let (x, y, w, h) = crop_rect(1280, 720, OutputShape::new(1280, 720));
        assert_eq!((x, y, w, h), (0, 0, 1280, 720));
    }

    #[test]
    fn crop_to_fit_produces_exact_shape() {
        // Encode a plain 32x18 image, then crop it square.
        let img = image::RgbImage::from_pixel(32, 18, image::Rgb([9, 120, 40]));
        let mut buf = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buf, 90)
            .write_image(img.as_raw(), 32, 18, image::ExtendedColorType::Rgb8)
            .unwrap();

        let out =
            crop_to_fit(&buf.into_inner(), OutputShape::new(8, 8), 85).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn undecodable_source_is_a_composition_error() {
        let err = crop_to_fit(b"not an image", OutputShape::new(8, 8), 85)
            .unwrap_err();
        assert!(matches!(err, ThumbError::Composition(_)));
    }
}
