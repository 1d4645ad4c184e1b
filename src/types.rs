//! Shared types returned by the public operations.
//!
//! These are serialized as camelCase JSON by the CLI and by whatever web
//! layer sits in front of the [`Viewer`](crate::viewer::Viewer), so field
//! names are part of the contract.

use serde::{Deserialize, Serialize};

/// Requested display direction for date-ordered views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a request parameter. Anything other than `asc`/`desc`
    /// (case-insensitive), including no value at all, means [`SortOrder::Desc`].
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One image file directly inside a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub name: String,
    /// Path relative to the library root, `/`-separated. Unique per root.
    pub path: String,
    pub date_hint: Option<String>,
    /// File size in bytes.
    pub size: u64,
}

/// One subdirectory of a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    /// At least one image exists somewhere beneath this directory.
    pub has_images: bool,
}

/// One step of the ancestor chain from the root to a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// A folder matched by [`search`](crate::listing::search).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub path: String,
}
