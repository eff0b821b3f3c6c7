//! High-level image operations.
//!
//! These functions combine border geometry, caption layout and palette
//! placement with backend execution. [`plan_render`] decides everything about
//! an output image without touching pixels; [`render`] hands the plan to the
//! backend.
//!
//! ## Caption geometry
//!
//! Font sizes are fitted to a fraction of the bottom border (`0.2` for
//! centered styles, `0.5` for left-flow; the heading gets `+0.02`), measured
//! on [`SAMPLE_TEXT`]. With `sizes` the font sizes of the lines actually
//! present, the first baseline is
//!
//! ```text
//! centered:  canvas_h - bottom + bottom/2 - (sum(sizes) - sizes[0]/2) / 2
//! left-flow: canvas_h - bottom/2 + sizes[0]/3          (x starts at border.left)
//! ```
//!
//! A full caption is heading plus two body lines, so the centered block
//! height is `heading + 2*body - heading/2`; dropped lines shrink it.
//!
//! A line whose size falls under the configured minimum, or whose box would
//! start off-canvas, is not drawn; the cursor still advances past it.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{palette_offset, round_half_even, swatch_dimensions};
use super::params::{ComposeParams, PaletteParams, Rgb, TextDraw};
use crate::border::{Border, BorderStyle};
use crate::layout::{
    Cursor, FONT_SIZE_BOUNDS, FontRole, FontSpec, SAMPLE_TEXT, TextBlock, layout_block,
    optimal_font_size,
};
use crate::metadata::ExifSummary;
use crate::naming::output_path;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Caption sizes below this are treated as "no usable size".
pub const DEFAULT_MIN_FONT_SIZE: u32 = 4;

/// Canvas and caption colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: Rgb,
    pub heading: Rgb,
    pub body: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: Rgb::WHITE,
            heading: Rgb([100, 100, 100]),
            body: Rgb([128, 128, 128]),
        }
    }
}

impl ColorScheme {
    fn text(&self, role: FontRole) -> Rgb {
        match role {
            FontRole::Heading => self.heading,
            FontRole::Body => self.body,
        }
    }
}

/// Palette clustering and layout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteOptions {
    pub tolerance: u8,
    pub limit: usize,
    pub columns: u32,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            tolerance: 32,
            limit: 5,
            columns: 6,
        }
    }
}

/// What to draw around one image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub style: BorderStyle,
    /// Draw the EXIF caption.
    pub exif: bool,
    /// Draw a palette swatch with these settings.
    pub palette: Option<PaletteOptions>,
    pub colors: ColorScheme,
    pub min_font_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: BorderStyle::Small,
            exif: false,
            palette: None,
            colors: ColorScheme::default(),
            min_font_size: DEFAULT_MIN_FONT_SIZE,
        }
    }
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Largest size in [`FONT_SIZE_BOUNDS`] whose sample text fits `target_height`.
pub fn fit_font_size(backend: &impl ImageBackend, role: FontRole, target_height: f32) -> u32 {
    optimal_font_size(target_height, FONT_SIZE_BOUNDS, |size| {
        backend
            .measure_text(FontSpec { role, size }, SAMPLE_TEXT)
            .map(|extent| extent.height)
            .unwrap_or(f32::INFINITY)
    })
}

/// First baseline of a caption whose lines have font sizes `line_sizes`.
pub fn caption_start(border: &Border, canvas_height: u32, line_sizes: &[u32]) -> Cursor {
    let bottom = border.bottom as f32;
    let canvas_height = canvas_height as f32;
    let first = line_sizes.first().copied().unwrap_or(0) as f32;
    let y = if border.style.centered_caption() {
        let block_height = line_sizes.iter().map(|&s| s as f32).sum::<f32>() - first / 2.0;
        canvas_height - bottom + bottom / 2.0 - block_height / 2.0
    } else {
        canvas_height - bottom / 2.0 + first / 3.0
    };
    Cursor {
        x: border.left as f32,
        y,
    }
}

/// Lay out `block` in the bottom band and turn it into drawable lines.
pub fn plan_caption(
    backend: &impl ImageBackend,
    border: &Border,
    canvas: (u32, u32),
    block: &TextBlock,
    colors: &ColorScheme,
    min_font_size: u32,
) -> Result<Vec<TextDraw>> {
    let centered = border.style.centered_caption();
    let fraction = if centered { 0.2 } else { 0.5 };
    let bottom = border.bottom as f32;
    let body = fit_font_size(backend, FontRole::Body, bottom * fraction);
    let heading = fit_font_size(backend, FontRole::Heading, bottom * (fraction + 0.02));
    debug!(heading, body, centered, "caption font sizes");

    let size_for = |role| match role {
        FontRole::Heading => heading,
        FontRole::Body => body,
    };
    let line_sizes: Vec<u32> = block.lines.iter().map(|line| size_for(line.role)).collect();
    let start = caption_start(border, canvas.1, &line_sizes);

    let mut failure = None;
    let placed = layout_block(block, canvas.0, start, centered, size_for, |font, text| {
        match backend.measure_text(font, text) {
            Ok(extent) => extent.width,
            Err(e) => {
                failure.get_or_insert(e);
                0.0
            }
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    let mut lines = Vec::with_capacity(placed.len());
    for line in placed {
        if line.font.size < min_font_size {
            warn!(
                text = %line.text,
                size = line.font.size,
                min = min_font_size,
                "caption line too small to be legible, not drawn"
            );
            continue;
        }
        let ascent = backend.measure_text(line.font, &line.text)?.ascent;
        let x = line.x.round();
        let y = (line.baseline - ascent).round();
        if x < 0.0 || y < 0.0 {
            warn!(text = %line.text, x, y, "caption line starts off-canvas, not drawn");
            continue;
        }
        lines.push(TextDraw {
            text: line.text,
            font: line.font,
            x: x as i32,
            y: y as i32,
            color: colors.text(line.font.role),
        });
    }
    Ok(lines)
}

/// Palette cell edge: a third of the bottom band.
pub fn palette_cell_size(border: &Border) -> u32 {
    round_half_even(border.bottom as f64 / 3.0).max(0) as u32
}

/// Extract the swatch colours and place the swatch in the bottom band.
///
/// `None` when the band is too thin for a cell, the photo yields no colours,
/// or the swatch would run off the canvas. Very wide panoramas hit the last
/// case: cells scale with the bottom band, not with the width.
pub fn plan_palette(
    backend: &impl ImageBackend,
    source: &Path,
    border: &Border,
    canvas: (u32, u32),
    options: PaletteOptions,
) -> Result<Option<PaletteParams>> {
    let cell_size = palette_cell_size(border);
    if cell_size == 0 {
        debug!(bottom = border.bottom, "bottom band too thin for a palette");
        return Ok(None);
    }
    let colors = backend.dominant_colors(source, options.tolerance, options.limit)?;
    if colors.is_empty() {
        debug!(path = %source.display(), "no palette colours");
        return Ok(None);
    }

    let swatch = swatch_dimensions(colors.len(), cell_size, options.columns);
    match palette_offset(canvas, border.right, border.bottom, swatch) {
        Some(origin) => Ok(Some(PaletteParams {
            colors,
            origin,
            cell_size,
            columns: options.columns,
        })),
        None => {
            warn!(
                path = %source.display(),
                width = swatch.0,
                height = swatch.1,
                "palette swatch does not fit the canvas, skipped"
            );
            Ok(None)
        }
    }
}

/// Plan a bordered output for `source` without drawing it.
///
/// The output name records which features were actually drawn: `_exif` only
/// when at least one caption line made it onto the canvas, `_palette` only
/// when a swatch was placed on the canvas.
pub fn plan_render(
    backend: &impl ImageBackend,
    source: &Path,
    options: &RenderOptions,
) -> Result<ComposeParams> {
    let (width, height) = get_dimensions(backend, source)?;
    let border = options.style.compute(width, height);
    let canvas = border.canvas_size((width, height));
    debug!(
        top = border.top,
        right = border.right,
        bottom = border.bottom,
        left = border.left,
        "border computed"
    );

    let mut text = Vec::new();
    if options.exif {
        let fields = backend.read_exif(source)?;
        let summary = ExifSummary::from_fields(&fields);
        if summary.is_empty() {
            debug!(path = %source.display(), "no caption EXIF fields");
        } else {
            text = plan_caption(
                backend,
                &border,
                canvas,
                &summary.to_block(),
                &options.colors,
                options.min_font_size,
            )?;
        }
    }

    let palette = match options.palette {
        Some(palette) => plan_palette(backend, source, &border, canvas, palette)?,
        None => None,
    };

    Ok(ComposeParams {
        source: source.to_path_buf(),
        output: output_path(source, options.style, !text.is_empty(), palette.is_some()),
        border,
        image_width: width,
        image_height: height,
        background: options.colors.background,
        text,
        palette,
    })
}

/// Plan and draw the bordered image; returns the output path.
pub fn render(
    backend: &impl ImageBackend,
    source: &Path,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let params = plan_render(backend, source, options)?;
    backend.compose(&params)?;
    Ok(params.output)
}
