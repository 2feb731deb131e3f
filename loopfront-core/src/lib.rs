//! # Loopfront Core
//!
//! Core library for the Loopfront storefront, implementing the thumbnail
//! extraction and backfill pipeline for looping-animation catalogs.
//!
//! ## Overview
//!
//! Every item in the catalog is backed by a short source video. This crate
//! derives the static preview images shown on catalog cards and detail pages
//! directly from those videos and durably records the outcome per item:
//!
//! - **Frame extraction**: decode one frame from the source video at a
//!   target offset, with a fallback ladder for very short clips
//! - **Composition**: center-crop the extracted frame into the fixed card
//!   (600x600) and poster (1280x720) shapes
//! - **Per-item orchestration**: validate the source, drive extraction and
//!   composition, upload derivatives, and persist the status transition
//! - **Backfill**: sweep the catalog for items without a real extracted
//!   thumbnail and process them sequentially with streamed progress
//! - **Verification**: read-only consistency sweep over the persisted
//!   thumbnail metadata
//!
//! ## Feature Flags
//!
//! - `ffmpeg`: enables the FFmpeg-backed [`decode::FfmpegDecoder`]; without
//!   it the pipeline runs against any caller-supplied [`decode::MediaDecoder`]
//!
//! ## Architecture
//!
//! The object store and catalog record store are external collaborators,
//! abstracted behind the ports in [`store`]. The media decode primitive is
//! abstracted behind [`decode::MediaDecoder`] so the extraction algorithm is
//! independent of the decoding backend.

pub mod backfill;
pub mod compose;
pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod service;
pub mod store;
pub mod types;
pub mod verify;

mod validate;

pub use backfill::BackfillRunner;
pub use config::PipelineConfig;
pub use error::{Result, ThumbError};
pub use extract::FrameExtractor;
pub use service::{ItemOutcome, ThumbnailService};
pub use types::{
    BackfillProgress, CatalogItem, ThumbPatch, ThumbRecord, ThumbSource,
    ThumbStatus, VerifyReport,
};
pub use verify::Verifier;
