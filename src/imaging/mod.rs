//! Thumbnail generation in pure Rust, with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Embedded preview** | custom parser (EXIF IFD1 in JPEG APP1 / TIFF) |
//! | **Decode + orientation** | `image` decoders + `apply_orientation` |
//! | **Resize → JPEG** | Lanczos3 + `JpegEncoder` |
//! | **Cache** | [`crate::cache`] content-addressed files |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ThumbnailBackend`] trait + [`RustBackend`]
//! - **Operations**: [`ThumbnailEngine`], combining backend and cache

pub mod backend;
mod calculations;
pub(crate) mod exif_parser;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ThumbnailBackend};
pub use calculations::{clamp_dimension, fit_within};
pub use operations::{THUMBNAIL_CONTENT_TYPE, Thumbnail, ThumbnailEngine};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
