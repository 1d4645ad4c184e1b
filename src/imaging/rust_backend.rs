//! Pure Rust thumbnail backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Embedded preview | custom `exif_parser` (EXIF IFD1 in JPEG APP1 / TIFF) |

use super::backend::{BackendError, ThumbnailBackend};
use super::calculations::fit_within;
use super::exif_parser::read_embedded_preview;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageReader, RgbImage};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode an image and rotate/flip it upright per its stored orientation.
fn load_upright(path: &Path) -> Result<DynamicImage, BackendError> {
    let decode_err =
        |e: image::ImageError| BackendError::Decode(format!("{}: {}", path.display(), e));

    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(decode_err)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Composite any transparency onto `background`, yielding opaque RGB.
fn flatten(img: &DynamicImage, background: [u8; 3]) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u16;
        let blend = |c: u8, bg: u8| ((c as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8;
        image::Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(buf)
}

impl ThumbnailBackend for RustBackend {
    fn embedded_preview(&self, path: &Path) -> Option<Vec<u8>> {
        read_embedded_preview(path)
    }

    fn render(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError> {
        let img = load_upright(&params.source)?;
        let (width, height) = fit_within((img.width(), img.height()), params.max_dimension);
        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };
        encode_jpeg(&flatten(&resized, params.background), params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{jpeg_bytes, jpeg_with_exif, tiff_with_orientation, write_jpeg, write_transparent_png};

    fn params(source: &Path, max_dimension: u32) -> ThumbnailParams {
        ThumbnailParams {
            source: source.to_path_buf(),
            max_dimension,
            quality: Quality::default(),
            background: [16, 16, 16],
        }
    }

    fn decode(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn render_shrinks_landscape() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        write_jpeg(&source, 400, 300);

        let bytes = RustBackend::new().render(&params(&source, 100)).unwrap();
        let thumb = decode(&bytes);
        assert_eq!((thumb.width(), thumb.height()), (100, 75));
    }

    #[test]
    fn render_does_not_enlarge() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        write_jpeg(&source, 40, 30);

        let bytes = RustBackend::new().render(&params(&source, 320)).unwrap();
        let thumb = decode(&bytes);
        assert_eq!((thumb.width(), thumb.height()), (40, 30));
    }

    #[test]
    fn render_applies_orientation() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("rotated.jpg");
        // Orientation 6: stored landscape, displayed rotated 90° clockwise
        let data = jpeg_with_exif(&jpeg_bytes(80, 40), &tiff_with_orientation(6));
        std::fs::write(&source, data).unwrap();

        let bytes = RustBackend::new().render(&params(&source, 320)).unwrap();
        let thumb = decode(&bytes);
        assert_eq!((thumb.width(), thumb.height()), (40, 80));
    }

    #[test]
    fn render_flattens_transparency_onto_background() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("clear.png");
        write_transparent_png(&source, 16, 16);

        let bytes = RustBackend::new().render(&params(&source, 320)).unwrap();
        let thumb = decode(&bytes).to_rgb8();
        let [r, g, b] = thumb.get_pixel(8, 8).0;
        // JPEG is lossy; the flat background colour survives within a few levels
        for c in [r, g, b] {
            assert!(c.abs_diff(16) <= 4, "expected near-background pixel, got {c}");
        }
    }

    #[test]
    fn render_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not an image").unwrap();
        assert!(RustBackend::new().render(&params(&source, 320)).is_err());
    }

    #[test]
    fn render_missing_file_is_io_error() {
        let result = RustBackend::new().render(&params(Path::new("/nonexistent/a.jpg"), 320));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn flatten_blends_half_alpha() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([255, 255, 255, 128]),
        ));
        let flat = flatten(&img, [0, 0, 0]);
        assert_eq!(flat.get_pixel(0, 0).0, [128, 128, 128]);
    }
}
