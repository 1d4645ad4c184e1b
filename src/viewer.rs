//! The request-facing facade over one library root.
//!
//! [`Viewer`] owns everything a serving layer needs for one root: the
//! configuration, the scanner rules, the index cache and the thumbnail
//! engine. It is `Sync`, so a single instance can be shared by every request
//! thread.
//!
//! Request parameters arrive as raw strings and are normalized here:
//!
//! | Parameter | Absent | Malformed | Otherwise |
//! |---|---|---|---|
//! | `order` | `desc` | `desc` | `asc` / `desc`, case-insensitive |
//! | `limit` | configured default | [`ViewerError::InvalidInput`] | clamped to configured bounds |
//! | `size` | configured default | [`ViewerError::InvalidInput`] | clamped to configured bounds |
//! | `cursor` | first page | first page | `\` read as `/` |
//!
//! Relative paths are resolved with [`resolve_relative_path`], which rejects
//! absolute paths and anything that would leave the root.

use crate::cache::CacheStats;
use crate::config::{ConfigError, ViewerConfig};
use crate::imaging::{RustBackend, Thumbnail, ThumbnailBackend, ThumbnailEngine, clamp_dimension};
use crate::index::{Hierarchy, IndexCache};
use crate::listing::{self, DirectoryListing};
use crate::paginate::{self, GroupPage, TimelinePage};
use crate::scan::Scanner;
use crate::types::{SearchResult, SortOrder};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// Malformed request: bad path, bad number, missing parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Pagination parameters of a timeline or group request, unparsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest<'a> {
    pub cursor: Option<&'a str>,
    pub limit: Option<&'a str>,
    pub order: Option<&'a str>,
}

/// Resolve `relative` beneath `root`, which must already be canonical.
///
/// Components are applied one at a time and every existing prefix is
/// canonicalized, so a `..` after a symlink climbs from the link's target.
/// The empty path is the root. Absolute paths, `..` steps above the root
/// and symlinks leading outside it are rejected, even when the rest of the
/// path does not exist. The missing tail of a path is appended as given;
/// callers decide whether a missing path is an error.
pub fn resolve_relative_path(root: &Path, relative: &str) -> Result<PathBuf, ViewerError> {
    let absolute = || ViewerError::InvalidInput("absolute paths are not permitted".into());
    let escapes = || ViewerError::InvalidInput("requested path escapes the image root".into());

    let rel = Path::new(relative);
    if rel.has_root() {
        return Err(absolute());
    }

    let mut resolved = root.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                if let Ok(real) = fs::canonicalize(&resolved) {
                    if !real.starts_with(root) {
                        return Err(escapes());
                    }
                    resolved = real;
                }
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if resolved == root {
                    return Err(escapes());
                }
                resolved.pop();
            }
            Component::RootDir | Component::Prefix(_) => return Err(absolute()),
        }
    }

    Ok(resolved)
}

fn parse_number(name: &str, raw: &str) -> Result<i64, ViewerError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ViewerError::InvalidInput(format!("{name} must be an integer, got {raw:?}")))
}

/// Browsing operations against one library root.
pub struct Viewer<B = RustBackend> {
    root: PathBuf,
    config: ViewerConfig,
    scanner: Scanner,
    index: IndexCache,
    thumbnails: ThumbnailEngine<B>,
}

impl Viewer<RustBackend> {
    /// Open `root` with the pure Rust thumbnail backend.
    pub fn open(root: &Path, config: ViewerConfig) -> Result<Self, ViewerError> {
        Self::with_backend(root, config, RustBackend::new())
    }
}

impl<B: ThumbnailBackend> Viewer<B> {
    pub fn with_backend(root: &Path, config: ViewerConfig, backend: B) -> Result<Self, ViewerError> {
        config.validate()?;
        let root = fs::canonicalize(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ViewerError::NotFound(root.display().to_string()),
            _ => ViewerError::Io(e),
        })?;
        if !root.is_dir() {
            return Err(ViewerError::InvalidInput(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            scanner: Scanner::new(&config.library),
            index: IndexCache::new(config.index.ttl()),
            thumbnails: ThumbnailEngine::new(backend, &config.thumbnails),
            root,
            config,
        })
    }

    /// Canonical library root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    // =========================================================================
    // Parameter normalization
    // =========================================================================

    /// Page size for a raw `limit` parameter.
    pub fn parse_limit(&self, raw: Option<&str>) -> Result<usize, ViewerError> {
        let p = &self.config.pagination;
        match raw {
            None => Ok(p.default_limit),
            Some(raw) => {
                let value = parse_number("limit", raw)?;
                Ok(value.clamp(p.min_limit as i64, p.max_limit as i64) as usize)
            }
        }
    }

    /// Longest thumbnail edge for a raw `size` parameter.
    pub fn parse_size(&self, raw: Option<&str>) -> Result<u32, ViewerError> {
        let t = &self.config.thumbnails;
        match raw {
            None => Ok(t.default_size),
            Some(raw) => Ok(clamp_dimension(parse_number("size", raw)?, t.min_size, t.max_size)),
        }
    }

    /// Resolve `relative` to an existing regular file beneath the root.
    pub fn image_path(&self, relative: &str) -> Result<PathBuf, ViewerError> {
        if relative.trim().is_empty() {
            return Err(ViewerError::InvalidInput("missing image path".into()));
        }
        let path = resolve_relative_path(&self.root, relative)?;
        if !path.is_file() {
            return Err(ViewerError::NotFound(relative.to_string()));
        }
        Ok(path)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Contents of a folder. A path naming a file lists its folder.
    pub fn list_directory(&self, relative: &str) -> Result<DirectoryListing, ViewerError> {
        let mut target = resolve_relative_path(&self.root, relative)?;
        if !target.exists() {
            return Err(ViewerError::NotFound(relative.to_string()));
        }
        if target.is_file()
            && let Some(parent) = target.parent()
        {
            target = parent.to_path_buf();
        }
        listing::list_directory(&self.scanner, &self.root, &target).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ViewerError::NotFound(relative.to_string()),
            _ => ViewerError::Io(e),
        })
    }

    /// Folders matching `query`, capped at the configured search limit.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        listing::search(&self.scanner, &self.root, query, self.config.search.limit)
    }

    /// Every image path, chronologically.
    pub fn sorted_image_paths(&self, order: SortOrder) -> Vec<String> {
        self.index
            .sorted_paths(&self.scanner, &self.root)
            .ordered(order)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Current hierarchy snapshot. Call [`Hierarchy::view`] for a display order.
    pub fn hierarchy(&self) -> Arc<Hierarchy> {
        self.index.hierarchy(&self.scanner, &self.root)
    }

    /// One page of a subgroup's images. An unknown group is an empty page.
    pub fn group_images(&self, key: &str, request: PageRequest<'_>) -> Result<GroupPage, ViewerError> {
        if key.is_empty() {
            return Err(ViewerError::InvalidInput("missing group key".into()));
        }
        let limit = self.parse_limit(request.limit)?;
        let order = SortOrder::parse_lenient(request.order);
        let hierarchy = self.hierarchy();
        Ok(match hierarchy.group_images(key, order) {
            Some(images) => paginate::group_page(&images, request.cursor, limit),
            None => GroupPage::default(),
        })
    }

    /// One sectioned page of the flat timeline.
    pub fn timeline(&self, request: PageRequest<'_>) -> Result<TimelinePage, ViewerError> {
        let limit = self.parse_limit(request.limit)?;
        let order = SortOrder::parse_lenient(request.order);
        let sorted = self.index.sorted_paths(&self.scanner, &self.root);
        Ok(paginate::timeline_page(&sorted.ordered(order), request.cursor, limit))
    }

    /// Thumbnail of an image. `Ok(None)` means the image exists but could
    /// not be thumbnailed; serve a placeholder.
    pub fn thumbnail(&self, relative: &str, size: Option<&str>) -> Result<Option<Thumbnail>, ViewerError> {
        let max_dimension = self.parse_size(size)?;
        let path = self.image_path(relative)?;
        Ok(self.thumbnails.generate(&path, max_dimension))
    }

    /// Thumbnail outcome counters since this viewer was opened.
    pub fn thumbnail_stats(&self) -> CacheStats {
        self.thumbnails.stats()
    }

    /// Build both indexes now so the first request does not pay for the scan.
    pub fn warm(&self) {
        let started = Instant::now();
        let (paths, hierarchy) = rayon::join(
            || self.index.sorted_paths(&self.scanner, &self.root),
            || self.index.hierarchy(&self.scanner, &self.root),
        );
        info!(
            root = %self.root.display(),
            images = paths.len(),
            groups = hierarchy.top_groups().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "caches warm"
        );
    }
}
