//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the five operations every backend must
//! support: identify, read_exif, measure_text, dominant_colors, and compose.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): decoding and encoding
//! through `image`, text through `imageproc`/`ab_glyph`, EXIF through
//! `kamadak-exif`. Everything is statically linked into the binary.

use super::params::{ComposeParams, Rgb};
use crate::layout::FontSpec;
use crate::metadata::ExifFields;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("No font loaded for text rendering")]
    FontUnavailable,
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Measured size of a line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Advance width in pixels.
    pub width: f32,
    /// Line box height (ascent to descent) in pixels.
    pub height: f32,
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
}

/// Trait for image processing backends.
///
/// Every backend must implement all five operations so layout and
/// orchestration stay backend-agnostic.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read raw EXIF values by tag name.
    ///
    /// A file without EXIF (or with unreadable EXIF) yields an empty map.
    fn read_exif(&self, path: &Path) -> Result<ExifFields, BackendError>;

    /// Measure `text` set in `font`.
    fn measure_text(&self, font: FontSpec, text: &str) -> Result<TextExtent, BackendError>;

    /// Most common colours of the image, most common first, at most `limit`.
    ///
    /// Colours closer than `tolerance` (0-100) are merged.
    fn dominant_colors(
        &self,
        path: &Path,
        tolerance: u8,
        limit: usize,
    ) -> Result<Vec<Rgb>, BackendError>;

    /// Build the bordered canvas, draw text and palette, and write the output.
    fn compose(&self, params: &ComposeParams) -> Result<(), BackendError>;
}
