//! In-memory store adapters.
//!
//! Used by the integration suite and the CLI's dry-run mode. The catalog
//! adapter records the ordered history of status writes per item, which is
//! what makes "`processing` is never a terminal observed state" directly
//! testable.

use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    error::{Result, ThumbError},
    store::{CatalogStore, ObjectStore},
    types::{CatalogItem, ThumbPatch, ThumbStatus},
};

#[derive(Debug, Default)]
struct CatalogInner {
    items: BTreeMap<String, CatalogItem>,
    // Insertion order of item ids, to keep query order deterministic.
    order: Vec<String>,
    history: Vec<(String, ThumbStatus)>,
}

/// Catalog store backed by a map, with a status-write audit trail.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<CatalogInner>,
}

impl MemoryCatalogStore {
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let store = Self::default();
        for item in items {
            store.insert(item);
        }
        store
    }

    pub fn insert(&self, item: CatalogItem) {
        let mut inner = self.inner.lock().expect("catalog lock poisoned");
        if !inner.items.contains_key(&item.id) {
            inner.order.push(item.id.clone());
        }
        inner.items.insert(item.id.clone(), item);
    }

    /// Current state of one item.
    pub fn snapshot(&self, id: &str) -> Option<CatalogItem> {
        let inner = self.inner.lock().expect("catalog lock poisoned");
        inner.items.get(id).cloned()
    }

    /// Ordered status writes observed for one item.
    pub fn status_history(&self, id: &str) -> Vec<ThumbStatus> {
        let inner = self.inner.lock().expect("catalog lock poisoned");
        inner
            .history
            .iter()
            .filter(|(item_id, _)| item_id == id)
            .map(|(_, status)| *status)
            .collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn backfill_candidates(
        &self,
        retry_failed: bool,
    ) -> Result<Vec<CatalogItem>> {
        let inner = self.inner.lock().expect("catalog lock poisoned");
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .filter(|item| item.needs_backfill(retry_failed))
            .cloned()
            .collect())
    }

    async fn all_items(&self) -> Result<Vec<CatalogItem>> {
        let inner = self.inner.lock().expect("catalog lock poisoned");
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: &str) -> Result<Option<CatalogItem>> {
        Ok(self.snapshot(id))
    }

    async fn update_thumb(&self, id: &str, patch: ThumbPatch) -> Result<()> {
        let mut inner = self.inner.lock().expect("catalog lock poisoned");
        let status = patch.status();
        let item = inner
            .items
            .get_mut(id)
            .ok_or_else(|| ThumbError::Record(format!("unknown item {id}")))?;
        patch.apply(&mut item.thumb);
        inner.history.push((id.to_string(), status));
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Debug, Default)]
struct ObjectsInner {
    objects: BTreeMap<String, StoredObject>,
    upload_log: Vec<String>,
}

/// Object store backed by a map, with optional upload-failure injection.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    inner: Mutex<ObjectsInner>,
    fail_uploads: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail, to exercise the persistence
    /// failure path.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().expect("objects lock poisoned");
        inner.objects.get(key).map(|o| o.bytes.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().expect("objects lock poisoned");
        inner.objects.get(key).map(|o| o.content_type.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("objects lock poisoned");
        inner.objects.keys().cloned().collect()
    }

    /// Every upload in order, including overwrites of the same key.
    pub fn upload_log(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("objects lock poisoned");
        inner.upload_log.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("objects lock poisoned");
        inner.objects.remove(key);
        Ok(())
    }

    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ThumbError::Storage(format!(
                "upload of {key} refused"
            )));
        }
        let mut inner = self.inner.lock().expect("objects lock poisoned");
        inner.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        inner.upload_log.push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://objects/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ThumbRecord, ThumbUrls};

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Item {id}"),
            source_video_url: format!("/videos/{id}.mp4"),
            thumb: ThumbRecord::default(),
        }
    }

    #[tokio::test]
    async fn update_unknown_item_is_a_record_error() {
        let store = MemoryCatalogStore::default();
        let err = store
            .update_thumb("missing", ThumbPatch::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, ThumbError::Record(_)));
    }

    #[tokio::test]
    async fn history_preserves_write_order() {
        let store = MemoryCatalogStore::new([item("a")]);
        store.update_thumb("a", ThumbPatch::Processing).await.unwrap();
        store
            .update_thumb(
                "a",
                ThumbPatch::ready(
                    ThumbUrls {
                        card: "memory://objects/a_card.jpg".into(),
                        poster: "memory://objects/a_poster.jpg".into(),
                        frame: "memory://objects/a_frame.jpg".into(),
                    },
                    1.0,
                ),
            )
            .await
            .unwrap();

        assert_eq!(
            store.status_history("a"),
            vec![ThumbStatus::Processing, ThumbStatus::Ready]
        );
    }

    #[tokio::test]
    async fn candidates_follow_insertion_order() {
        let store = MemoryCatalogStore::new([item("b"), item("a"), item("c")]);
        let ids: Vec<String> = store
            .backfill_candidates(true)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let objects = MemoryObjectStore::new();
        objects.remove("nothing.jpg").await.unwrap();
        objects.upload("x.jpg", b"bytes", "image/jpeg").await.unwrap();
        assert_eq!(objects.content_type("x.jpg").as_deref(), Some("image/jpeg"));
        objects.remove("x.jpg").await.unwrap();
        assert!(objects.object("x.jpg").is_none());
    }
}
