//! Minimal EXIF parser for embedded JPEG previews.
//!
//! Cameras store a small JPEG preview in the second image file directory
//! (IFD1) of the EXIF block, addressed by two tags:
//! - JPEGInterchangeFormat (0x0201): offset of the preview, relative to the
//!   TIFF header
//! - JPEGInterchangeFormatLength (0x0202): its length in bytes
//!
//! For JPEG: the TIFF block lives in the APP1 segment after `Exif\0\0`.
//! For TIFF: the file itself is the TIFF block. Only the header region is
//! read to locate the preview, then the preview bytes themselves; a file
//! whose IFD1 lies past [`TIFF_HEADER_LIMIT`] reports no preview.
//!
//! Every read is bounds-checked; malformed input yields `None`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// APP1 payload signature introducing an EXIF block.
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// EXIF lives in the first APP segments; never read more than this from a JPEG.
const JPEG_SCAN_LIMIT: u64 = 256 * 1024;

/// How much of a TIFF file is read to find IFD0 and IFD1.
const TIFF_HEADER_LIMIT: u64 = 64 * 1024;

/// Larger "previews" are not thumbnails; let the renderer handle the file.
const PREVIEW_LIMIT: usize = 1024 * 1024;

const TAG_PREVIEW_OFFSET: u16 = 0x0201;
const TAG_PREVIEW_LENGTH: u16 = 0x0202;

/// Read the embedded preview of an image file, dispatching by extension.
pub fn read_embedded_preview(path: &Path) -> Option<Vec<u8>> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => {
            let mut head = Vec::new();
            File::open(path)
                .ok()?
                .take(JPEG_SCAN_LIMIT)
                .read_to_end(&mut head)
                .ok()?;
            find_jpeg_exif(&head).and_then(preview_from_tiff).map(<[u8]>::to_vec)
        }
        "tif" | "tiff" => read_tiff_preview(path),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JPEG: locate the APP1 EXIF block
// ---------------------------------------------------------------------------

/// Find the TIFF block inside a JPEG's `APP1 Exif` segment.
pub(crate) fn find_jpeg_exif(data: &[u8]) -> Option<&[u8]> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS: entropy-coded data follows, metadata is over
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xE1 && seg_start <= seg_end {
            let segment = &data[seg_start..seg_end];
            if let Some(tiff) = segment.strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }
        pos += 2 + seg_len;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF: walk IFD0 -> IFD1
// ---------------------------------------------------------------------------

/// Byte-order aware, bounds-checked reads over a TIFF block.
struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let big_endian = match data.get(0..2)? {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let reader = Self { data, big_endian };
        (reader.u16_at(2)? == 42).then_some(reader)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    /// Offset of the IFD following the one at `ifd`.
    fn next_ifd(&self, ifd: usize) -> Option<usize> {
        let count = self.u16_at(ifd)? as usize;
        let next = self.u32_at(ifd + 2 + count * 12)? as usize;
        (next != 0).then_some(next)
    }

    /// Integer value of `tag` in the IFD at `ifd` (SHORT or LONG, count 1).
    fn tag_value(&self, ifd: usize, tag: u16) -> Option<u32> {
        let count = self.u16_at(ifd)? as usize;
        (0..count).find_map(|i| {
            let entry = ifd + 2 + i * 12;
            if self.u16_at(entry)? != tag {
                return None;
            }
            match self.u16_at(entry + 2)? {
                3 => self.u16_at(entry + 8).map(u32::from),
                4 => self.u32_at(entry + 8),
                _ => None,
            }
        })
    }
}

/// `(offset, length)` of the IFD1 preview, relative to the TIFF header.
fn preview_location(tiff: &[u8]) -> Option<(usize, usize)> {
    let reader = TiffReader::new(tiff)?;
    let ifd0 = reader.u32_at(4)? as usize;
    let ifd1 = reader.next_ifd(ifd0)?;
    let offset = reader.tag_value(ifd1, TAG_PREVIEW_OFFSET)? as usize;
    let length = reader.tag_value(ifd1, TAG_PREVIEW_LENGTH)? as usize;
    (length > 0 && length <= PREVIEW_LIMIT).then_some((offset, length))
}

fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

/// Slice the IFD1 JPEG preview out of a TIFF block.
pub(crate) fn preview_from_tiff(tiff: &[u8]) -> Option<&[u8]> {
    let (offset, length) = preview_location(tiff)?;
    let preview = tiff.get(offset..offset.checked_add(length)?)?;
    is_jpeg(preview).then_some(preview)
}

/// Read the IFD1 preview of a TIFF file without loading the whole file.
fn read_tiff_preview(path: &Path) -> Option<Vec<u8>> {
    let mut file = File::open(path).ok()?;
    let mut head = Vec::new();
    (&mut file).take(TIFF_HEADER_LIMIT).read_to_end(&mut head).ok()?;
    let (offset, length) = preview_location(&head)?;

    let mut preview = vec![0; length];
    file.seek(SeekFrom::Start(offset as u64)).ok()?;
    file.read_exact(&mut preview).ok()?;
    is_jpeg(&preview).then_some(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, jpeg_with_exif, tiff_with_orientation, tiff_with_thumbnail};

    // =========================================================================
    // JPEG
    // =========================================================================

    #[test]
    fn finds_exif_block_after_soi() {
        let tiff = tiff_with_orientation(6);
        let jpeg = jpeg_with_exif(&jpeg_bytes(8, 8), &tiff);
        assert_eq!(find_jpeg_exif(&jpeg), Some(&tiff[..]));
    }

    #[test]
    fn plain_jpeg_has_no_exif() {
        assert_eq!(find_jpeg_exif(&jpeg_bytes(8, 8)), None);
    }

    #[test]
    fn non_jpeg_input_is_none() {
        assert_eq!(find_jpeg_exif(b"not a jpeg"), None);
        assert_eq!(find_jpeg_exif(&[]), None);
    }

    #[test]
    fn reads_preview_from_jpeg_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let preview = jpeg_bytes(16, 12);
        let image = jpeg_with_exif(&jpeg_bytes(64, 48), &tiff_with_thumbnail(&preview));
        let path = tmp.path().join("photo.JPG");
        std::fs::write(&path, image).unwrap();
        assert_eq!(read_embedded_preview(&path), Some(preview));
    }

    #[test]
    fn jpeg_without_ifd1_has_no_preview() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        std::fs::write(&path, jpeg_with_exif(&jpeg_bytes(8, 8), &tiff_with_orientation(1))).unwrap();
        assert_eq!(read_embedded_preview(&path), None);
    }

    #[test]
    fn unsupported_extension_and_missing_file() {
        assert_eq!(read_embedded_preview(Path::new("/nonexistent/a.jpg")), None);
        assert_eq!(read_embedded_preview(Path::new("/nonexistent/a.png")), None);
    }

    // =========================================================================
    // TIFF
    // =========================================================================

    #[test]
    fn preview_from_little_endian_tiff() {
        let preview = jpeg_bytes(4, 4);
        let tiff = tiff_with_thumbnail(&preview);
        assert_eq!(preview_from_tiff(&tiff), Some(&preview[..]));
    }

    #[test]
    fn preview_must_be_jpeg() {
        let tiff = tiff_with_thumbnail(b"not a jpeg at all");
        assert_eq!(preview_from_tiff(&tiff), None);
    }

    #[test]
    fn reads_preview_from_tiff_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let preview = jpeg_bytes(16, 12);
        let path = tmp.path().join("scan.TIF");
        std::fs::write(&path, tiff_with_thumbnail(&preview)).unwrap();
        assert_eq!(read_embedded_preview(&path), Some(preview));
    }

    #[test]
    fn tiff_preview_past_header_region_is_read_by_offset() {
        let preview = jpeg_bytes(8, 8);
        let mut tiff = tiff_with_thumbnail(b"");
        // Move the preview far past the header region
        let offset = 2 * TIFF_HEADER_LIMIT as u32;
        tiff[24..28].copy_from_slice(&offset.to_le_bytes());
        tiff[36..40].copy_from_slice(&(preview.len() as u32).to_le_bytes());
        tiff.resize(offset as usize, 0);
        tiff.extend_from_slice(&preview);

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("large.tiff");
        std::fs::write(&path, &tiff).unwrap();
        assert_eq!(read_embedded_preview(&path), Some(preview));
    }

    #[test]
    fn oversized_preview_is_ignored() {
        let mut tiff = tiff_with_thumbnail(&jpeg_bytes(4, 4));
        tiff[36..40].copy_from_slice(&(PREVIEW_LIMIT as u32 + 1).to_le_bytes());
        assert_eq!(preview_location(&tiff), None);
    }

    #[test]
    fn truncated_tiff_is_none() {
        let preview = jpeg_bytes(4, 4);
        let tiff = tiff_with_thumbnail(&preview);
        assert_eq!(preview_from_tiff(&tiff[..tiff.len() - 10]), None);
        assert_eq!(preview_from_tiff(&tiff[..20]), None);
        assert_eq!(preview_from_tiff(b"II"), None);
    }

    #[test]
    fn bad_magic_is_none() {
        let mut tiff = tiff_with_thumbnail(&jpeg_bytes(4, 4));
        tiff[2] = 43;
        assert_eq!(preview_from_tiff(&tiff), None);
    }

    #[test]
    fn reads_orientation_tag_value() {
        let tiff = tiff_with_orientation(6);
        let reader = TiffReader::new(&tiff).unwrap();
        assert_eq!(reader.tag_value(8, 0x0112), Some(6));
        assert_eq!(reader.next_ifd(8), None);
    }
}
