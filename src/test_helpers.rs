//! Shared test utilities.
//!
//! Builds throwaway library trees and synthetic image files so tests never
//! depend on checked-in binaries.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = fixture_tree(&["2022-05-01/a.jpg", "misc/c.jpg", "empty/"]);
//! let scanner = Scanner::default();
//! let all: Vec<PathBuf> = scanner.walk_images(tmp.path()).collect();
//! assert_eq!(rel_paths(tmp.path(), &all), vec!["2022-05-01/a.jpg", "misc/c.jpg"]);
//! ```

use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::scan::relative_path;

// =========================================================================
// Fixture trees
// =========================================================================

/// Create a temp directory containing the given relative paths.
///
/// Entries ending in `/` become empty directories; everything else becomes
/// a small placeholder file (scanning only looks at extensions).
pub fn fixture_tree(entries: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for entry in entries {
        add_entry(tmp.path(), entry);
    }
    tmp
}

/// Add one fixture entry under `root` (same rules as [`fixture_tree`]).
pub fn add_entry(root: &Path, entry: &str) {
    let path = root.join(entry);
    if entry.ends_with('/') {
        std::fs::create_dir_all(&path).unwrap();
    } else {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "fake image").unwrap();
    }
}

/// Relative, `/`-separated forms of `paths` for readable assertions.
pub fn rel_paths(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| relative_path(root, p)).collect()
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a gradient RGB JPEG of the given dimensions.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Write a gradient RGB JPEG to `path`.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Write a fully transparent RGBA PNG to `path`.
pub fn write_transparent_png(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 0]));
    img.save(path).unwrap();
}

/// Little-endian TIFF block whose IFD1 points at an embedded JPEG thumbnail.
pub fn tiff_with_thumbnail(thumbnail: &[u8]) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0: no entries, next IFD at 14
    tiff.extend_from_slice(&0u16.to_le_bytes());
    tiff.extend_from_slice(&14u32.to_le_bytes());
    // IFD1: JPEGInterchangeFormat + JPEGInterchangeFormatLength
    let data_offset: u32 = 14 + 2 + 2 * 12 + 4;
    tiff.extend_from_slice(&2u16.to_le_bytes());
    push_entry(&mut tiff, 0x0201, 4, data_offset);
    push_entry(&mut tiff, 0x0202, 4, thumbnail.len() as u32);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(thumbnail);
    tiff
}

/// Little-endian TIFF block carrying only an IFD0 Orientation tag.
pub fn tiff_with_orientation(orientation: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    push_entry(&mut tiff, 0x0112, 3, orientation as u32);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff
}

fn push_entry(buf: &mut Vec<u8>, tag: u16, kind: u16, value: u32) {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Splice an APP1 `Exif` segment holding `tiff` right after the SOI marker.
pub fn jpeg_with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let seg_len = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE1]);
    out.extend_from_slice(&seg_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}
