//! # Photoshelf
//!
//! A read-only browsing core for large photo libraries. The filesystem is the
//! data source: folders are albums, and dates are read out of paths
//! (`2022-05-01 Picnic/`, `IMG_20220501_1200.jpg`, `May 3, 2022/`). Nothing
//! is imported, nothing is written next to the photos.
//!
//! # What It Serves
//!
//! ```text
//! list        one folder: breadcrumbs, subfolders, images, "next folder" link
//! search      folders whose relative path contains a query
//! timeline    every image newest first, cursor-paginated into date sections
//! hierarchy   two-level date grouping (top folder → second segment)
//! group       one subgroup's images, cursor-paginated
//! thumbnail   JPEG thumbnail: embedded EXIF preview, disk cache, or render
//! ```
//!
//! All of these go through [`viewer::Viewer`], which owns one root and is
//! safe to share across request threads.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Filesystem rules: ignored names, image extensions, deterministic walks |
//! | [`dates`] | Path date hints, sortable date values, display formatting |
//! | [`index`] | Chronological path order, the date hierarchy, and the TTL index cache |
//! | [`paginate`] | Cursor pagination, timeline sections, group pages |
//! | [`listing`] | Folder listings, breadcrumbs, next-folder lookup, folder search |
//! | [`imaging`] | Embedded previews, decode + orientation, resize, JPEG encode |
//! | [`cache`] | Content-addressed thumbnail files and outcome counters |
//! | [`config`] | `photoshelf.toml` loading, merging onto defaults, validation |
//! | [`viewer`] | Request-facing facade: path resolution and parameter normalization |
//! | [`types`] | Shared serialized payload types |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Scan Instead of a Database
//!
//! The library tree is walked on demand and the derived indexes are kept as
//! a single in-memory snapshot with a short lifetime (30 seconds by default).
//! Renaming a folder on disk is reflected on the next rebuild with no import
//! step. Within one snapshot, pagination cursors are stable.
//!
//! ## Stateless Cursors
//!
//! A cursor is the relative path of the last item of the previous page. The
//! server keeps no session state. A cursor that no longer exists restarts at
//! the first page.
//!
//! ## Deterministic Order
//!
//! Every walk sorts case-insensitively with files before folders, so the
//! same tree always yields the same listings, search results and "next
//! folder" answers regardless of the platform's directory order.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate's decoders, Lanczos3
//! resampling and JPEG encoder, plus a small bounds-checked EXIF reader for
//! camera previews. There are no system image libraries to install.

pub mod cache;
pub mod config;
pub mod dates;
pub mod imaging;
pub mod index;
pub mod listing;
pub mod output;
pub mod paginate;
pub mod scan;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
