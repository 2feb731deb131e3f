//! Source URL validation and resolution.
//!
//! Catalog records can carry anything in their source field: a hosted video,
//! a relative asset path, or a placeholder image left over from authoring.
//! The pipeline only ever attempts extraction against something that looks
//! like a genuine video.

use once_cell::sync::Lazy;
use regex::RegexSet;
use url::Url;

use crate::{
    config::PipelineConfig,
    error::{Result, ThumbError},
};

static DEFAULT_PLACEHOLDERS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(PipelineConfig::default().placeholder_hosts)
        .expect("default placeholder patterns are valid")
});

/// Compiled source-acceptance policy, built once per service.
#[derive(Debug, Clone)]
pub(crate) struct SourcePolicy {
    placeholders: RegexSet,
    extensions: Vec<String>,
}

impl SourcePolicy {
    pub(crate) fn from_config(config: &PipelineConfig) -> Result<Self> {
        let placeholders = if config.placeholder_hosts
            == PipelineConfig::default().placeholder_hosts
        {
            DEFAULT_PLACEHOLDERS.clone()
        } else {
            RegexSet::new(&config.placeholder_hosts).map_err(|e| {
                ThumbError::Config(format!(
                    "bad placeholder host pattern: {e}"
                ))
            })?
        };
        Ok(Self {
            placeholders,
            extensions: config
                .video_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        })
    }

    /// Accept only non-empty sources that do not match a placeholder host
    /// and carry a recognized video extension.
    pub(crate) fn is_valid_video_url(&self, source: &str) -> bool {
        let source = source.trim();
        if source.is_empty() {
            return false;
        }
        if self.placeholders.is_match(source) {
            return false;
        }
        let path = path_portion(source);
        let path = path.to_ascii_lowercase();
        self.extensions.iter().any(|ext| path.ends_with(ext))
    }
}

/// The path part of a source, with query/fragment stripped, for extension
/// checks. Works for both absolute URLs and relative asset paths.
fn path_portion(source: &str) -> &str {
    let end = source
        .find(['?', '#'])
        .unwrap_or(source.len());
    &source[..end]
}

/// Qualify a relative source against the configured origin; absolute URLs
/// pass through untouched.
pub(crate) fn resolve_source_url(origin: &str, source: &str) -> Result<String> {
    match Url::parse(source) {
        Ok(url) => Ok(url.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(origin).map_err(|e| {
                ThumbError::Config(format!("bad origin {origin:?}: {e}"))
            })?;
            let resolved = base
                .join(source)
                .map_err(|_| ThumbError::InvalidSource)?;
            Ok(resolved.into())
        }
        Err(_) => Err(ThumbError::InvalidSource),
    }
}
