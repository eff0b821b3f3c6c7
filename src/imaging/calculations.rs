//! Pure calculation functions for border geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// The golden ratio, φ = (1 + √5) / 2.
const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Calculate a border thickness from the image area using the golden ratio.
///
/// The photo area is scaled up by φ; the square root of the extra area is the
/// "natural" border, which `reduce_by` then divides down. A larger divisor
/// gives a thinner border.
///
/// Degenerate inputs clamp instead of failing: a zero width or height yields
/// `0`, and a zero divisor is treated as `1`.
///
/// # Examples
/// ```
/// # use simple_border::imaging::border_size;
/// // 4000x3000 → √(12M · 0.618) ≈ 2723.4 → /32 → 86
/// assert_eq!(border_size(4000, 3000, 32), 86);
/// ```
pub fn border_size(width: u32, height: u32, reduce_by: u32) -> u32 {
    if width == 0 || height == 0 {
        return 0;
    }
    let area = width as f64 * height as f64;
    let canvas_area = area * GOLDEN_RATIO;
    let reduce_by = reduce_by.max(1) as f64;
    ((canvas_area - area).sqrt() / reduce_by).ceil() as u32
}

/// Calculate symmetric `(horizontal, vertical)` borders that bring the
/// composited canvas to `target_ratio` (width / height).
///
/// The first pass pads the axis that is too short, halved per side and
/// floored at `min_border`; the other axis gets exactly `min_border`. The
/// second pass re-measures the achieved ratio and adds half of the remaining
/// deficit to the short axis once. Because both passes halve with floor
/// division the result can sit up to one pixel off target. That residual is
/// part of the contract: output names and downstream tooling were built
/// against exactly this two-pass behaviour.
pub fn ratio_borders(width: u32, height: u32, min_border: u32, target_ratio: f64) -> (u32, u32) {
    if width == 0 || height == 0 || !(target_ratio > 0.0) {
        return (min_border, min_border);
    }
    let (w, h, min) = (width as i64, height as i64, min_border as i64);
    let current_ratio = w as f64 / h as f64;

    let (mut horizontal, mut vertical) = if current_ratio > target_ratio {
        // Too wide: pad top and bottom
        let new_height = h.max((w as f64 / target_ratio).ceil() as i64);
        (min, ((new_height - h).div_euclid(2)).max(min))
    } else {
        // Too tall (or on target): pad left and right
        let new_width = w.max((h as f64 * target_ratio).ceil() as i64);
        (((new_width - w).div_euclid(2)).max(min), min)
    };

    let final_width = w + 2 * horizontal;
    let final_height = h + 2 * vertical;
    let final_ratio = final_width as f64 / final_height as f64;

    if final_ratio > target_ratio {
        let additional = (final_width as f64 / target_ratio).ceil() as i64 - final_height;
        vertical += additional.div_euclid(2);
    } else if final_ratio < target_ratio {
        let additional = (final_height as f64 * target_ratio).ceil() as i64 - final_width;
        horizontal += additional.div_euclid(2);
    }

    (horizontal.max(0) as u32, vertical.max(0) as u32)
}

/// Round half to even, the rounding used for every "half of a band" offset.
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Dimensions of a palette swatch laid out in rows of `columns` square cells.
///
/// The swatch always reserves `count / columns + 1` rows, so a count that
/// fills its last row exactly leaves one empty row below it. Only the height
/// used for centring grows; nothing is painted in that row.
///
/// Returns `(0, 0)` when there is nothing to draw.
pub fn swatch_dimensions(count: usize, cell_size: u32, columns: u32) -> (u32, u32) {
    if count == 0 || cell_size == 0 || columns == 0 {
        return (0, 0);
    }
    let count = count as u32;
    let cols = count.min(columns);
    let rows = count / columns + 1;
    (cols * cell_size, rows * cell_size)
}

/// Top-left corner for a palette swatch inside the bottom border band.
///
/// The swatch's right edge sits `border_right` pixels in from the canvas's
/// right edge and its vertical centre lines up with the centre of the bottom
/// band. Returns `None` if the swatch would start outside the canvas.
pub fn palette_offset(
    canvas: (u32, u32),
    border_right: u32,
    border_bottom: u32,
    swatch: (u32, u32),
) -> Option<(u32, u32)> {
    let (canvas_w, canvas_h) = (canvas.0 as i64, canvas.1 as i64);
    let x = canvas_w - border_right as i64 - swatch.0 as i64;
    let y = canvas_h
        - round_half_even(border_bottom as f64 / 2.0)
        - round_half_even(swatch.1 as f64 / 2.0);
    if x < 0 || y < 0 {
        return None;
    }
    Some((x as u32, y as u32))
}
