//! Viewer configuration.
//!
//! Handles loading, validating, and merging `photoshelf.toml`. Every key is
//! optional: the stock defaults are serialized to a TOML table and the user
//! file is merged on top of it, so a config file only needs the values it
//! wants to change.
//!
//! ## Config File Location
//!
//! Pass `--config <file>` on the command line, or place `photoshelf.toml`
//! in the library root. Without either, the stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [library]
//! ignored_directories = [".Trash-1000"]  # never descended into (dot-dirs always skipped)
//! extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"]
//!
//! [index]
//! ttl_seconds = 30          # how long a scanned snapshot is served before rescanning
//!
//! [pagination]
//! default_limit = 120       # page size when the caller gives none
//! min_limit = 20
//! max_limit = 500
//!
//! [search]
//! limit = 75                # maximum folders returned by a search
//!
//! [thumbnails]
//! default_size = 320        # longest edge when the caller gives no size
//! min_size = 32
//! max_size = 1024
//! quality = 82              # JPEG quality (1-100)
//! background = [16, 16, 16] # transparency is flattened onto this colour
//! cache_dir = ".thumbnail_cache"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the library root when no `--config` is given.
pub const CONFIG_FILENAME: &str = "photoshelf.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Viewer configuration loaded from `photoshelf.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Which files and folders are part of the library.
    pub library: LibraryConfig,
    /// Index cache lifetime.
    pub index: IndexConfig,
    /// Page size bounds for the timeline and group views.
    pub pagination: PaginationConfig,
    /// Folder search settings.
    pub search: SearchConfig,
    /// Thumbnail rendering and disk cache.
    pub thumbnails: ThumbnailsConfig,
}

impl ViewerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "library.extensions must not be empty".into(),
            ));
        }
        let p = &self.pagination;
        if p.min_limit == 0 || p.min_limit > p.default_limit || p.default_limit > p.max_limit {
            return Err(ConfigError::Validation(
                "pagination limits must satisfy 0 < min_limit <= default_limit <= max_limit"
                    .into(),
            ));
        }
        if self.search.limit == 0 {
            return Err(ConfigError::Validation(
                "search.limit must be greater than 0".into(),
            ));
        }
        let t = &self.thumbnails;
        if t.min_size == 0 || t.min_size > t.default_size || t.default_size > t.max_size {
            return Err(ConfigError::Validation(
                "thumbnail sizes must satisfy 0 < min_size <= default_size <= max_size".into(),
            ));
        }
        if !(1..=100).contains(&t.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Library membership rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Directory names never descended into. Names starting with `.` are
    /// always skipped in addition to these.
    pub ignored_directories: Vec<String>,
    /// Lowercase file extensions (without the dot) treated as images.
    pub extensions: Vec<String>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            ignored_directories: vec![".Trash-1000".to_string()],
            extensions: ["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Age in seconds after which a cached snapshot is rebuilt on next access.
    pub ttl_seconds: u64,
}

impl IndexConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { ttl_seconds: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub min_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 120,
            min_limit: 20,
            max_limit: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: 75 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub default_size: u32,
    pub min_size: u32,
    pub max_size: u32,
    pub quality: u8,
    /// RGB colour that transparent pixels are composited onto.
    pub background: [u8; 3],
    /// Directory for rendered thumbnails. Relative paths resolve against
    /// the working directory.
    pub cache_dir: PathBuf,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            default_size: 320,
            min_size: 32,
            max_size: 1024,
            quality: 82,
            background: [16, 16, 16],
            cache_dir: PathBuf::from(".thumbnail_cache"),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ViewerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ViewerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ViewerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `photoshelf.toml` from the library root, falling back to defaults
/// when it does not exist.
pub fn load_config(root: &Path) -> Result<ViewerConfig, ConfigError> {
    let overlay = load_raw_config(&root.join(CONFIG_FILENAME))?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock `photoshelf.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photoshelf Configuration
# ========================
# All options are optional. Values shown are the stock defaults.
# Place this file in the library root as photoshelf.toml or pass --config.

[library]
# Directory names that are never scanned. Any name starting with "." is
# skipped as well.
ignored_directories = [".Trash-1000"]
# File extensions (lowercase, no dot) treated as images.
extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"]

[index]
# Seconds a scanned snapshot of the tree is reused before the next request
# triggers a rescan.
ttl_seconds = 30

[pagination]
# Page size used when a request gives no limit, and the bounds any
# requested limit is clamped to.
default_limit = 120
min_limit = 20
max_limit = 500

[search]
# Maximum number of folders returned by a search.
limit = 75

[thumbnails]
# Longest edge in pixels when a request gives no size, and the bounds any
# requested size is clamped to.
default_size = 320
min_size = 32
max_size = 1024
# JPEG quality for rendered thumbnails (1-100).
quality = 82
# RGB colour transparent pixels are flattened onto.
background = [16, 16, 16]
# Where rendered thumbnails are stored. Entries are named by a digest of
# the source path, size, modification time and requested size.
cache_dir = ".thumbnail_cache"
"##
}
