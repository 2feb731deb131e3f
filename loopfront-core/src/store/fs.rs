//! Filesystem-backed object store.
//!
//! Writes derivative images under a local media directory served by the
//! storefront's static file host, forming public URLs by joining a base
//! URL. This is the adapter the admin CLI runs against.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::{
    error::{Result, ThumbError},
    store::ObjectStore,
};

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    base_url: Url,
}

impl FsObjectStore {
    /// `base_url` is the public prefix objects are served from; a trailing
    /// slash is added if missing so joins keep the full path.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            ThumbError::Config(format!("bad base url {base_url:?}: {e}"))
        })?;
        Ok(Self {
            root: root.into(),
            base_url,
        })
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(key);
        fs::write(&path, bytes).await?;
        debug!(?path, bytes = bytes.len(), "wrote object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.base_url
            .join(key)
            .map(Into::into)
            .unwrap_or_else(|_| format!("{}{key}", self.base_url))
    }
}
