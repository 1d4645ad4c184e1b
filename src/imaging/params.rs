//! Parameter types for thumbnail rendering.
//!
//! These structs describe *what* to render, not *how*. They are the interface
//! between the [`operations`](super::operations) engine (which decides when a
//! render is needed) and the [`backend`](super::backend) (which does the
//! pixel work), so a mock backend can stand in during tests.

use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(82)
    }
}

/// One thumbnail render: decode `source`, make it upright, shrink it to fit
/// a `max_dimension` square, flatten alpha onto `background`, encode JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    /// Longest edge of the output; smaller sources are never enlarged.
    pub max_dimension: u32,
    pub quality: Quality,
    pub background: [u8; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_82() {
        assert_eq!(Quality::default().value(), 82);
    }
}
