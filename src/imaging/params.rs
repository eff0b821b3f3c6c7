//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how* to draw it. They are the
//! interface between the [`operations`](super::operations) module (which
//! decides border geometry, caption placement and output name) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing layout logic.
//!
//! ## Types
//!
//! - [`Rgb`]: An sRGB colour, parsed from `#rrggbb` in config files.
//! - [`TextDraw`]: One caption line with its font, colour and top-left position.
//! - [`PaletteParams`]: Swatch colours, cell size, wrap width and placement.
//! - [`ComposeParams`]: Full specification for one bordered output image.

use crate::border::Border;
use crate::layout::FontSpec;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// An 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{s}' is not a #rrggbb colour"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// A caption line ready to rasterise.
///
/// `x`/`y` are the top-left of the line box on the canvas (the baseline sits
/// one font ascent below `y`). Lines are only emitted when both are on-canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub text: String,
    pub font: FontSpec,
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

/// A palette swatch that has already been fitted onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteParams {
    /// Cell colours, most common first.
    pub colors: Vec<Rgb>,
    /// Top-left corner of the swatch on the canvas.
    pub origin: (u32, u32),
    /// Edge length of one square swatch cell in pixels.
    pub cell_size: u32,
    /// Cells per row before wrapping.
    pub columns: u32,
}

/// Parameters for composing one bordered image.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub border: Border,
    /// Source image size the border was computed for.
    pub image_width: u32,
    pub image_height: u32,
    pub background: Rgb,
    pub text: Vec<TextDraw>,
    pub palette: Option<PaletteParams>,
}

impl ComposeParams {
    /// Canvas size: image plus border on every side.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.border
            .canvas_size((self.image_width, self.image_height))
    }
}
