//! Per-image processing and the batch loop.
//!
//! Turns the list produced by [`scan`](crate::scan) into bordered copies on
//! disk. Each input is handled independently:
//!
//! ```text
//! photo.jpg ──► extension check ──► plan (size, border, caption, swatch) ──► compose
//!                    │                                                         │
//!                    └── skipped (unsupported type)          photo_border-s.jpg ◄┘
//! ```
//!
//! ## Failure Isolation
//!
//! | Failure | Effect |
//! |---|---|
//! | filtered out by patterns | skipped, logged at `info` |
//! | extension not jpg/jpeg/png | skipped, logged at `info` |
//! | unreadable or corrupt image, write failure | failed, logged at `error`, batch continues |
//!
//! Nothing here aborts the batch. Fatal conditions (bad config, missing
//! fonts) are checked by the caller before the first image.

use crate::imaging::rust_backend::supported_input_extensions;
use crate::imaging::{BackendError, ImageBackend, RenderOptions, render};
use crate::scan::{self, FileFilter, ScanError, ScanResult, Skipped};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),
}

/// Whether the extension is one the backend reads (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Border a single image and return where the result was written.
pub fn process_image(
    backend: &impl ImageBackend,
    path: &Path,
    options: &RenderOptions,
) -> Result<PathBuf, ProcessError> {
    if !is_supported(path) {
        return Err(ProcessError::UnsupportedFileType(path.to_path_buf()));
    }
    info!(path = %path.display(), style = %options.style, "adding border");
    let output = render(backend, path, options)?;
    info!(output = %output.display(), "saved as");
    Ok(output)
}

/// An input and the bordered file written for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// An input that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a whole run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub saved: Vec<Saved>,
    pub skipped: Vec<Skipped>,
    pub failed: Vec<Failed>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.saved.len() + self.skipped.len() + self.failed.len()
    }
}

/// Process every selected input, carrying scan-time skips into the report.
pub fn process_batch(
    backend: &impl ImageBackend,
    inputs: ScanResult,
    options: &RenderOptions,
) -> BatchReport {
    let mut report = BatchReport::default();

    for skipped in inputs.skipped {
        info!(path = %skipped.path.display(), reason = %skipped.reason, "skipping");
        report.skipped.push(skipped);
    }

    for path in inputs.files {
        match process_image(backend, &path, options) {
            Ok(output) => report.saved.push(Saved {
                source: path,
                output,
            }),
            Err(ProcessError::UnsupportedFileType(path)) => {
                info!(path = %path.display(), "skipping unsupported file type");
                report.skipped.push(Skipped {
                    path,
                    reason: "unsupported file type".to_string(),
                });
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to add border");
                report.failed.push(Failed {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Scan `path` and border everything selected.
///
/// Only a bad root path is an error; per-file problems end up in the report.
pub fn process_path(
    backend: &impl ImageBackend,
    path: &Path,
    recursive: bool,
    filter: &FileFilter,
    options: &RenderOptions,
) -> Result<BatchReport, ScanError> {
    let inputs = scan::collect_inputs(path, recursive, filter)?;
    Ok(process_batch(backend, inputs, options))
}
