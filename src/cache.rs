//! Content-addressed disk cache for rendered thumbnails.
//!
//! Decoding and resizing a full-size photo dominates thumbnail latency, so
//! every rendered thumbnail is kept on disk and reused for as long as the
//! source file is unchanged.
//!
//! ## Cache keys
//!
//! A key is the SHA-256 of the source's resolved path, its size in bytes, its
//! modification time in nanoseconds and the requested longest edge. Editing
//! a photo changes its size or mtime and therefore its key; the previous
//! entry is simply never looked up again. Nothing is ever evicted, so the
//! directory grows with every distinct `(file, version, size)` requested.
//!
//! ## Storage
//!
//! Entries are flat files `<cache_dir>/<hex digest>.jpg`. Writes go to a
//! uniquely named temporary file in the same directory and are renamed into
//! place, so a reader sees either no entry or a complete one. Two requests
//! racing on the same missing key both render and the last rename wins.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

/// File extension of cache entries.
const ENTRY_EXTENSION: &str = "jpg";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Digest identifying one rendered variant of one version of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailCacheKey(String);

impl ThumbnailCacheKey {
    pub fn new(path: &Path, file_size: u64, modified_nanos: u128, max_dimension: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_os_str().as_encoded_bytes());
        hasher.update(format!("|{}|{}|{}", file_size, modified_nanos, max_dimension));
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Key for the current on-disk version of `path`.
    pub fn for_file(path: &Path, max_dimension: u32) -> io::Result<Self> {
        let resolved = fs::canonicalize(path)?;
        let meta = fs::metadata(&resolved)?;
        let modified_nanos = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Ok(Self::new(&resolved, meta.len(), modified_nanos, max_dimension))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThumbnailCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory of cached thumbnails.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the entry for `key`, whether or not it exists.
    pub fn entry_path(&self, key: &ThumbnailCacheKey) -> PathBuf {
        self.dir.join(format!("{}.{ENTRY_EXTENSION}", key.as_str()))
    }

    /// Cached bytes for `key`, or `None` on a miss.
    pub fn get(&self, key: &ThumbnailCacheKey) -> Option<Vec<u8>> {
        fs::read(self.entry_path(key)).ok()
    }

    /// Store `bytes` under `key`, replacing any existing entry.
    pub fn put(&self, key: &ThumbnailCacheKey, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp = self
            .dir
            .join(format!(".{}.{}-{}.tmp", key.as_str(), std::process::id(), unique));
        if let Err(e) = fs::write(&temp, bytes).and_then(|_| fs::rename(&temp, self.entry_path(key))) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        Ok(())
    }
}

/// Where a thumbnail's bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Preview embedded in the source file, returned verbatim.
    Embedded,
    /// Previously rendered entry read from the disk cache.
    Cached,
    /// Decoded and resized for this request.
    Rendered,
}

/// Tally of thumbnail requests by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub embedded: u32,
    pub hits: u32,
    pub rendered: u32,
    /// Requests that produced no thumbnail.
    pub failed: u32,
}

impl CacheStats {
    pub fn record(&mut self, source: ThumbnailSource) {
        match source {
            ThumbnailSource::Embedded => self.embedded += 1,
            ThumbnailSource::Cached => self.hits += 1,
            ThumbnailSource::Rendered => self.rendered += 1,
        }
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u32 {
        self.embedded + self.hits + self.rendered + self.failed
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} embedded, {} cached, {} rendered",
            self.embedded, self.hits, self.rendered
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
