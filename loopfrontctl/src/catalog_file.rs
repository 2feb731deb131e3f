//! JSON-file catalog store.
//!
//! The CLI's stand-in for the hosted record store: the whole catalog lives
//! in one JSON array on disk, and every thumbnail write persists the file
//! before returning so status stays durably observable, matching the
//! contract of [`CatalogStore`].

use std::{path::PathBuf, sync::Mutex};

use anyhow::Context;
use async_trait::async_trait;

use loopfront_core::{
    error::{Result, ThumbError},
    store::CatalogStore,
    types::{CatalogItem, ThumbPatch},
};

#[derive(Debug)]
pub struct JsonCatalogStore {
    path: PathBuf,
    items: Mutex<Vec<CatalogItem>>,
}

impl JsonCatalogStore {
    pub async fn load(path: PathBuf) -> anyhow::Result<Self> {
        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading catalog {}", path.display()))?;
        let items: Vec<CatalogItem> = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing catalog {}", path.display()))?;
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    async fn persist(&self, snapshot: Vec<CatalogItem>) -> Result<()> {
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| ThumbError::Record(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn backfill_candidates(
        &self,
        retry_failed: bool,
    ) -> Result<Vec<CatalogItem>> {
        let items = self.items.lock().expect("catalog lock poisoned");
        Ok(items
            .iter()
            .filter(|item| item.needs_backfill(retry_failed))
            .cloned()
            .collect())
    }

    async fn all_items(&self) -> Result<Vec<CatalogItem>> {
        let items = self.items.lock().expect("catalog lock poisoned");
        Ok(items.clone())
    }

    async fn get_item(&self, id: &str) -> Result<Option<CatalogItem>> {
        let items = self.items.lock().expect("catalog lock poisoned");
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn update_thumb(&self, id: &str, patch: ThumbPatch) -> Result<()> {
        let snapshot = {
            let mut items = self.items.lock().expect("catalog lock poisoned");
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| {
                    ThumbError::Record(format!("unknown item {id}"))
                })?;
            patch.apply(&mut item.thumb);
            items.clone()
        };
        self.persist(snapshot).await
    }
}
