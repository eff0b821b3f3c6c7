//! Caption text layout inside the border band.
//!
//! Layout is pure: text metrics come from a caller-supplied measuring
//! function (in production, the [`ImageBackend`](crate::imaging::ImageBackend)
//! rasteriser), so every rule here is testable with synthetic metrics.
//!
//! ## Two flows
//!
//! - **Centered**: lines stack vertically. Each line is centered against the
//!   *full canvas width* (border included) so multi-line captions line up with
//!   the photo, not just the border strip. After a line the cursor drops by
//!   `size + size / 2`.
//! - **Left-flow**: lines are concatenated along one baseline. After a line
//!   the cursor moves right by the drawn width plus `size / 2`.
//!
//! These are not two modes of one axis: centered stacking never moves
//! horizontally on its own, left-flow never moves vertically.

use std::ops::RangeInclusive;

/// Text used to fit font sizes to a target height.
pub const SAMPLE_TEXT: &str = "Test string";

/// Default search bounds for [`optimal_font_size`].
pub const FONT_SIZE_BOUNDS: RangeInclusive<u32> = 1..=100;

/// Which face a line is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    /// Bold/medium face for the first caption line.
    Heading,
    /// Regular face for everything else.
    Body,
}

/// A font face at a concrete pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    pub role: FontRole,
    pub size: u32,
}

/// One caption line before layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub role: FontRole,
}

/// Ordered caption lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Append a line; blank lines are dropped.
    pub fn push(&mut self, text: impl Into<String>, role: FontRole) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.lines.push(TextLine { text, role });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Pen position. `y` is the text baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

/// A laid-out line: what to draw and where its baseline starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub font: FontSpec,
    pub x: f32,
    pub baseline: f32,
    pub width: f32,
}

/// Find the largest size in `bounds` whose measured height fits `target_height`.
///
/// Binary search assuming measured height grows with size. The result is the
/// search's `high` at loop exit, which is `bounds.start() - 1` when nothing
/// fits; callers must treat sizes below their legibility floor as "no usable
/// size". A measurement that fails should report `f32::INFINITY` (never fits).
///
/// Fonts whose metrics are not monotonic can make the search land on a size
/// that doesn't actually fit. That result is re-checked and, if needed, the
/// size steps down until one fits or the range is exhausted.
pub fn optimal_font_size(
    target_height: f32,
    bounds: RangeInclusive<u32>,
    mut measure_height: impl FnMut(u32) -> f32,
) -> u32 {
    let (min, max) = (*bounds.start() as i64, *bounds.end() as i64);
    let mut fits = |size: i64| measure_height(size as u32) <= target_height;

    let (mut low, mut high) = (min, max);
    while low <= high {
        let mid = (low + high) / 2;
        if fits(mid) {
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    while high >= min && !fits(high) {
        high -= 1;
    }

    high.max(0) as u32
}

/// Horizontal start that centers `text_width` on a canvas `canvas_width` wide.
pub fn centered_x(canvas_width: u32, text_width: f32) -> f32 {
    (canvas_width as f32 - text_width) / 2.0
}

/// Cursor for the next line after drawing `text_width` pixels at `cursor`.
pub fn advance_cursor(cursor: Cursor, font: FontSpec, text_width: f32, centered: bool) -> Cursor {
    let size = font.size as f32;
    if centered {
        Cursor {
            x: cursor.x,
            y: cursor.y + size + size / 2.0,
        }
    } else {
        Cursor {
            x: cursor.x + text_width + size / 2.0,
            y: cursor.y,
        }
    }
}

/// Lay out `block` starting at `start`.
///
/// `size_for` maps a role to its font size; `measure_width` returns the
/// advance width of a string in a given font.
pub fn layout_block(
    block: &TextBlock,
    canvas_width: u32,
    start: Cursor,
    centered: bool,
    size_for: impl Fn(FontRole) -> u32,
    mut measure_width: impl FnMut(FontSpec, &str) -> f32,
) -> Vec<PlacedLine> {
    let mut cursor = start;
    let mut placed = Vec::with_capacity(block.lines.len());

    for line in &block.lines {
        let font = FontSpec {
            role: line.role,
            size: size_for(line.role),
        };
        let width = measure_width(font, &line.text);
        if centered {
            cursor.x = centered_x(canvas_width, width);
        }
        placed.push(PlacedLine {
            text: line.text.clone(),
            font,
            x: cursor.x,
            baseline: cursor.y,
            width,
        });
        cursor = advance_cursor(cursor, font, width, centered);
    }

    placed
}
