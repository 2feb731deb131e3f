//! Shared types for the thumbnail pipeline.

pub mod catalog;
pub mod frame;
pub mod progress;

pub use catalog::{
    CatalogItem, ThumbPatch, ThumbRecord, ThumbSource, ThumbStatus, ThumbUrls,
};
pub use frame::{ExtractedFrame, RawFrame, ThumbnailSet};
pub use progress::{
    BackfillError, BackfillProgress, InvalidThumb, VerifyReport,
};
