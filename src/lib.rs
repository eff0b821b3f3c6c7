//! # Simple Border
//!
//! Adds a white border to photos, optionally with a caption built from the
//! photo's EXIF data and a swatch of its dominant colours. The output is a
//! new file next to the original; originals are never modified.
//!
//! # Architecture: Plan, Then Compose
//!
//! Each photo goes through two steps:
//!
//! ```text
//! 1. Plan      size + EXIF + text metrics  →  ComposeParams   (pure geometry)
//! 2. Compose   ComposeParams               →  photo_border-*.jpg
//! ```
//!
//! Planning only asks the backend questions (how big is the image, what does
//! its EXIF say, how wide is this string at this size). All geometry is
//! decided up front and handed to the backend as a single value. Tests run
//! the planner against a recording mock backend with synthetic text metrics,
//! so border sizes, caption placement and output names are checked without
//! decoding or encoding a single image.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`border`] | Border presets and the per-side geometry they produce |
//! | [`layout`] | Caption font fitting and line placement (centered or left-flow) |
//! | [`metadata`] | EXIF display formatting and the three-line caption |
//! | [`naming`] | `{name}_border-{code}[_exif][_palette].{ext}` output names |
//! | [`scan`] | Input discovery: single file or directory walk, include/exclude patterns |
//! | [`imaging`] | Border math, backend trait, pure-Rust compositor, fonts, palette |
//! | [`process`] | Per-image processing and the fault-isolating batch loop |
//! | [`config`] | `simple-border.toml` loading, merging, and validation |
//! | [`output`] | End-of-run summary formatting |
//!
//! # Design Decisions
//!
//! ## Golden-Ratio Borders
//!
//! Border thickness comes from the golden ratio applied to the image area
//! (see [`imaging::border_size`]), so a border looks equally heavy on a phone
//! snapshot and a 60 MP frame. Presets differ only in how much they divide
//! that base size per side.
//!
//! ## Fonts Fail Fast
//!
//! Caption fonts are loaded once, before the first image, and only when a
//! caption was asked for. A missing font ends the run with an error instead
//! of producing a batch of uncaptioned images.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, compositing, text rendering and encoding use `image`,
//! `imageproc`, and `ab_glyph`; EXIF is read with `kamadak-exif`. No
//! ImageMagick, no system libraries. JPEG output is always quality 95 with
//! full-resolution chroma so the border edge stays crisp.

pub mod border;
pub mod config;
pub mod imaging;
pub mod layout;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
