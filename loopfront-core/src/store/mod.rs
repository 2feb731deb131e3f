//! Ports for the external object store and catalog record store.
//!
//! The hosted backends (CDN object storage, the storefront's record store)
//! are collaborators of this pipeline, not part of it. These ports
//! intentionally stay typed at the application boundary: thumbnail writes
//! go through [`ThumbPatch`](crate::types::ThumbPatch) so no adapter can
//! persist a half-written record.

pub mod fs;
pub mod memory;

pub use fs::FsObjectStore;
pub use memory::{MemoryCatalogStore, MemoryObjectStore};

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{BackfillProgress, CatalogItem, ThumbPatch},
};

/// Keyed blob storage with public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Remove the object at `key`. Removing a missing object is not an
    /// error; the service removes before upload for idempotent overwrite.
    async fn remove(&self, key: &str) -> Result<()>;

    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()>;

    /// Public URL an uploaded object is served from.
    fn public_url(&self, key: &str) -> String;
}

/// Catalog record access, restricted to the fields this pipeline owns.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Items lacking a valid extracted thumbnail, in stable store order.
    /// See [`CatalogItem::needs_backfill`] for the selection rule.
    async fn backfill_candidates(
        &self,
        retry_failed: bool,
    ) -> Result<Vec<CatalogItem>>;

    /// Every item, for the read-only verifier sweep.
    async fn all_items(&self) -> Result<Vec<CatalogItem>>;

    async fn get_item(&self, id: &str) -> Result<Option<CatalogItem>>;

    /// Apply a thumbnail status write. Must be durable when it returns;
    /// the orchestrator relies on status being observable immediately.
    async fn update_thumb(&self, id: &str, patch: ThumbPatch) -> Result<()>;
}

/// Caller-supplied progress observer. Receives an owned snapshot per
/// emission; a panicking callback is swallowed so it cannot kill a run.
pub type ProgressFn = dyn Fn(BackfillProgress) + Send + Sync;
