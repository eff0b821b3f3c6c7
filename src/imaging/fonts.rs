//! Caption font resolution and loading.
//!
//! Two faces are used: a regular face for body lines and a bold (or medium)
//! face for the heading. Both resolve to files inside the configured fonts
//! directory (absolute names are used as-is). All faces are loaded and parsed
//! up front by [`FontSet::load`], so a missing or corrupt font fails the run
//! before the first image is touched.

use super::backend::TextExtent;
use crate::config::FontsConfig;
use crate::layout::FontRole;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("font file(s) not found: {}", format_paths(.0))]
    Missing(Vec<PathBuf>),
    #[error("cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid font {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One parsed font face.
pub struct FontFace {
    path: PathBuf,
    font: FontVec,
}

impl FontFace {
    /// Read and parse face `index` of the font file at `path`.
    pub fn load(path: &Path, index: u32) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font =
            FontVec::try_from_vec_and_index(data, index).map_err(|e| FontError::Invalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            font,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }

    /// Glyph scale for a font size given in pixels per em.
    ///
    /// `ab_glyph` scales by line height, so the em size is converted through
    /// the face's own height/units-per-em ratio.
    pub fn scale(&self, size: u32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size as f32 * self.font.height_unscaled() / units_per_em)
    }

    pub fn measure(&self, size: u32, text: &str) -> TextExtent {
        let scale = self.scale(size);
        let (width, height) = imageproc::drawing::text_size(scale, &self.font, text);
        TextExtent {
            width: width as f32,
            height: height as f32,
            ascent: self.font.as_scaled(scale).ascent(),
        }
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("path", &self.path).finish()
    }
}

/// Heading and body faces.
#[derive(Debug)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl FontSet {
    /// Resolve and load both faces; reports every missing file at once.
    pub fn load(config: &FontsConfig) -> Result<Self, FontError> {
        let regular_path = config.resolve(&config.regular);
        let bold_path = config.resolve(&config.bold);

        let missing: Vec<PathBuf> = [&regular_path, &bold_path]
            .into_iter()
            .filter(|p| !p.is_file())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(FontError::Missing(missing));
        }

        Ok(Self {
            regular: FontFace::load(&regular_path, config.index)?,
            bold: FontFace::load(&bold_path, config.index)?,
        })
    }

    pub fn face(&self, role: FontRole) -> &FontFace {
        match role {
            FontRole::Heading => &self.bold,
            FontRole::Body => &self.regular,
        }
    }
}
