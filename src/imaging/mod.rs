//! Image processing in pure Rust, statically linked.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **EXIF** | `kamadak-exif` |
//! | **Canvas + paste** | `image::imageops::overlay` |
//! | **Caption text** | `imageproc` + `ab_glyph` |
//! | **Palette** | in-crate clustering + `imageproc` rectangles |
//! | **Encode** | JPEG q95 (4:4:4, EXIF carried over) or PNG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for border and placement math (unit testable)
//! - **Parameters**: Data structures describing what to compose
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Fonts**: caption font loading ([`FontSet`])
//! - **Palette**: dominant colour extraction and swatch painting
//! - **Operations**: High-level functions combining calculations + layout + backend

pub mod backend;
mod calculations;
pub mod fonts;
pub mod operations;
pub mod palette;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, TextExtent};
pub use calculations::{
    border_size, palette_offset, ratio_borders, round_half_even, swatch_dimensions,
};
pub use fonts::{FontError, FontSet};
pub use operations::{
    ColorScheme, PaletteOptions, RenderOptions, get_dimensions, plan_palette, plan_render, render,
};
pub use params::{ComposeParams, PaletteParams, Rgb, TextDraw};
pub use rust_backend::RustBackend;
