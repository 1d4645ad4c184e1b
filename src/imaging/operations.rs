//! Thumbnail generation.
//!
//! [`ThumbnailEngine::generate`] combines the backend with the disk cache:
//!
//! 1. An embedded preview, if the file has one, is returned verbatim. Its
//!    size is whatever the camera stored.
//! 2. Otherwise the cache key for the file's current version and the
//!    requested size is computed, and a cached render is returned if present.
//! 3. Otherwise the backend renders, the result is stored, and returned.
//!
//! Any failure along the way means "no thumbnail": the caller shows a
//! placeholder. Failures are logged, never propagated.

use super::backend::ThumbnailBackend;
use super::calculations::clamp_dimension;
use super::params::{Quality, ThumbnailParams};
use crate::cache::{CacheStats, ThumbnailCache, ThumbnailCacheKey, ThumbnailSource};
use crate::config::ThumbnailsConfig;
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, warn};

/// Content type of every thumbnail this engine produces.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Encoded thumbnail bytes and where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub source: ThumbnailSource,
}

/// Thumbnail producer bound to one backend and one cache directory.
pub struct ThumbnailEngine<B> {
    backend: B,
    cache: ThumbnailCache,
    min_size: u32,
    max_size: u32,
    quality: Quality,
    background: [u8; 3],
    stats: Mutex<CacheStats>,
}

impl<B: ThumbnailBackend> ThumbnailEngine<B> {
    pub fn new(backend: B, config: &ThumbnailsConfig) -> Self {
        Self {
            backend,
            cache: ThumbnailCache::new(config.cache_dir.clone()),
            min_size: config.min_size,
            max_size: config.max_size,
            quality: Quality::new(config.quality),
            background: config.background,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    /// Snapshot of the outcome counters so far.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    /// Thumbnail for `path` no larger than `max_dimension` (clamped to the
    /// configured bounds), or `None` when the file cannot be thumbnailed.
    pub fn generate(&self, path: &Path, max_dimension: u32) -> Option<Thumbnail> {
        let result = self.produce(path, clamp_dimension(max_dimension.into(), self.min_size, self.max_size));
        let mut stats = self.stats.lock();
        match &result {
            Some(thumb) => stats.record(thumb.source),
            None => stats.fail(),
        }
        result
    }

    fn produce(&self, path: &Path, max_dimension: u32) -> Option<Thumbnail> {
        if let Some(bytes) = self.backend.embedded_preview(path) {
            debug!(path = %path.display(), "serving embedded preview");
            return Some(thumbnail(bytes, ThumbnailSource::Embedded));
        }

        let key = match ThumbnailCacheKey::for_file(path, max_dimension) {
            Ok(key) => key,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot stat thumbnail source");
                return None;
            }
        };
        if let Some(bytes) = self.cache.get(&key) {
            debug!(path = %path.display(), %key, "thumbnail cache hit");
            return Some(thumbnail(bytes, ThumbnailSource::Cached));
        }

        let params = ThumbnailParams {
            source: path.to_path_buf(),
            max_dimension,
            quality: self.quality,
            background: self.background,
        };
        let bytes = match self.backend.render(&params) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "thumbnail render failed");
                return None;
            }
        };
        if let Err(e) = self.cache.put(&key, &bytes) {
            warn!(
                path = %path.display(),
                cache_dir = %self.cache.dir().display(),
                error = %e,
                "failed to store thumbnail"
            );
        }
        Some(thumbnail(bytes, ThumbnailSource::Rendered))
    }
}

fn thumbnail(bytes: Vec<u8>, source: ThumbnailSource) -> Thumbnail {
    Thumbnail {
        bytes,
        content_type: THUMBNAIL_CONTENT_TYPE,
        source,
    }
}
