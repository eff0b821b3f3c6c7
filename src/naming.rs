//! Output filename convention.
//!
//! Every output sits next to its input and is named
//!
//! ```text
//! {basename}_border-{code}[_exif][_palette].{ext}
//! ```
//!
//! where `{code}` is the [`BorderStyle`] code and the `_exif` / `_palette`
//! suffixes appear only when that feature was actually drawn. Other tools
//! match on this pattern, so it is fixed.
//!
//! Re-running on an output must not stack suffixes: any trailing
//! `_border-{code}`, `_exif` and `_palette` parts are stripped from the input
//! basename before the new suffixes are appended.
//! - `photo.jpg` + Small → `photo_border-s.jpg`
//! - `photo_border-s_exif.jpg` + Small, exif → `photo_border-s_exif.jpg`
//! - `photo_border-p_exif_palette.JPG` + Large → `photo_border-l.JPG`

use crate::border::BorderStyle;
use std::path::{Path, PathBuf};

const BORDER_MARKER: &str = "_border-";
const EXIF_SUFFIX: &str = "_exif";
const PALETTE_SUFFIX: &str = "_palette";

/// Strip any trailing suffixes written by a previous run.
///
/// - `"photo_border-s_exif_palette"` → `"photo"`
/// - `"photo_border-x"` → `"photo_border-x"` (unknown style code, left alone)
/// - `"my_exif_notes"` → `"my_exif_notes"` (suffix not at the end)
pub fn strip_suffixes(stem: &str) -> &str {
    let mut rest = stem;
    loop {
        if let Some(s) = rest.strip_suffix(PALETTE_SUFFIX) {
            rest = s;
        } else if let Some(s) = rest.strip_suffix(EXIF_SUFFIX) {
            rest = s;
        } else if let Some(s) = strip_border_marker(rest) {
            rest = s;
        } else {
            return rest;
        }
    }
}

fn strip_border_marker(stem: &str) -> Option<&str> {
    let code = stem.chars().last()?;
    BorderStyle::from_code(code)?;
    stem[..stem.len() - code.len_utf8()].strip_suffix(BORDER_MARKER)
}

/// Output file stem for an input stem.
pub fn output_stem(input_stem: &str, style: BorderStyle, exif: bool, palette: bool) -> String {
    let mut stem = format!("{}{}{}", strip_suffixes(input_stem), BORDER_MARKER, style.code());
    if exif {
        stem.push_str(EXIF_SUFFIX);
    }
    if palette {
        stem.push_str(PALETTE_SUFFIX);
    }
    stem
}

/// Output path for `input`: same directory, same extension (case preserved).
pub fn output_path(input: &Path, style: BorderStyle, exif: bool, palette: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let mut name = output_stem(&stem, style, exif, palette);
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    input.with_file_name(name)
}
