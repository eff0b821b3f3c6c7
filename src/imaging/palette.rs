//! Dominant colour extraction and swatch painting.
//!
//! The photo is downsampled so its longest edge is at most
//! [`SAMPLE_EDGE`] pixels, exact colours are counted, and colours are merged
//! greedily (most common first) into the first cluster whose representative
//! lies within the tolerance distance. Clusters are then ranked by pixel
//! count. A tolerance of `0` only merges identical colours; `100` merges
//! everything into one cluster.

use super::params::Rgb;
use image::RgbImage;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::collections::HashMap;

/// Longest edge of the sampled copy.
pub const SAMPLE_EDGE: u32 = 100;

/// Largest possible RGB distance, black to white.
fn max_distance() -> f32 {
    (3.0f32 * 255.0 * 255.0).sqrt()
}

/// A palette entry and how many sampled pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub color: Rgb,
    pub pixels: u32,
}

fn distance(a: Rgb, b: Rgb) -> f32 {
    let [r1, g1, b1] = a.0.map(f32::from);
    let [r2, g2, b2] = b.0.map(f32::from);
    ((r1 - r2).powi(2) + (g1 - g2).powi(2) + (b1 - b2).powi(2)).sqrt()
}

/// Extract up to `limit` dominant colours from `img`, most common first.
pub fn extract_palette(img: &RgbImage, tolerance: u8, limit: usize) -> Vec<PaletteColor> {
    if img.width() == 0 || img.height() == 0 || limit == 0 {
        return Vec::new();
    }

    let sample;
    let pixels = match sample_size(img.width(), img.height()) {
        Some((w, h)) => {
            sample = image::imageops::thumbnail(img, w, h);
            &sample
        }
        None => img,
    };

    let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
    for pixel in pixels.pixels() {
        *counts.entry(pixel.0).or_insert(0) += 1;
    }
    let mut colors: Vec<([u8; 3], u32)> = counts.into_iter().collect();
    // Ties broken by colour value so output is deterministic
    colors.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let threshold = max_distance() * (f32::from(tolerance.min(100)) / 100.0);
    let mut clusters: Vec<PaletteColor> = Vec::new();
    for (color, count) in colors {
        let color = Rgb(color);
        match clusters
            .iter_mut()
            .find(|c| distance(c.color, color) <= threshold)
        {
            Some(cluster) => cluster.pixels += count,
            None => clusters.push(PaletteColor {
                color,
                pixels: count,
            }),
        }
    }

    clusters.sort_by(|a, b| b.pixels.cmp(&a.pixels).then(a.color.0.cmp(&b.color.0)));
    clusters.truncate(limit);
    clusters
}

/// Aspect-preserving sample size, or `None` if the image is already small.
fn sample_size(width: u32, height: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= SAMPLE_EDGE {
        return None;
    }
    let scale = |v: u32| ((v as u64 * SAMPLE_EDGE as u64) / longest as u64).max(1) as u32;
    Some((scale(width), scale(height)))
}

/// Paint `colors` as a grid of `cell`-sized squares with its top-left at
/// `origin`, wrapping after `columns` cells. Cells falling off the canvas
/// are clipped.
pub fn paint_swatch(
    canvas: &mut RgbImage,
    colors: &[Rgb],
    origin: (u32, u32),
    cell: u32,
    columns: u32,
) {
    if cell == 0 || columns == 0 {
        return;
    }
    for (idx, color) in colors.iter().enumerate() {
        let idx = idx as u32;
        let x = origin.0 + (idx % columns) * cell;
        let y = origin.1 + (idx / columns) * cell;
        draw_filled_rect_mut(
            canvas,
            Rect::at(x as i32, y as i32).of_size(cell, cell),
            image::Rgb(color.0),
        );
    }
}
