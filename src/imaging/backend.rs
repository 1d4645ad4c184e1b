//! Thumbnail backend trait and shared types.
//!
//! The [`ThumbnailBackend`] trait defines the two operations the thumbnail
//! engine needs: pull an embedded preview out of a file, and render a
//! thumbnail from decoded pixels.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure Rust codecs.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Trait for thumbnail backends.
///
/// `Sync` so one backend can serve concurrent requests.
pub trait ThumbnailBackend: Sync {
    /// JPEG preview embedded in the file, if it carries one.
    fn embedded_preview(&self, path: &Path) -> Option<Vec<u8>>;

    /// Render a thumbnail and return the encoded JPEG bytes.
    fn render(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError>;
}
