//! Border presets and the concrete per-side geometry they produce.
//!
//! Every preset is a pure function from image size to a [`Border`]. Four of
//! them size each side independently from the golden-ratio border (see
//! [`border_size`]) with a per-side divisor; the ratio-locked preset pads the
//! photo out to a fixed aspect ratio instead.
//!
//! | Style | Code | Divisors (top, right, bottom, left) | Caption layout |
//! |---|---|---|---|
//! | Polaroid | `p` | 32, 32, 6, 32 | centered |
//! | Small | `s` | 32 | left-flow |
//! | Medium | `m` | 16 | left-flow |
//! | Large | `l` | 6 | centered |
//! | Instagram | `i` | 4:5 ratio, minimum = size at 32 | centered |

use crate::imaging::{border_size, ratio_borders};
use std::fmt;
use std::str::FromStr;

/// Width:height ratio the Instagram preset locks the canvas to.
pub const INSTAGRAM_RATIO: f64 = 4.0 / 5.0;

/// How a style sizes its sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Independent golden-ratio divisors for (top, right, bottom, left).
    Reduce([u32; 4]),
    /// Pad to `ratio` (width / height); every side is at least the border
    /// produced by `min_reduce`.
    RatioLock { ratio: f64, min_reduce: u32 },
}

/// Border presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum BorderStyle {
    /// Thin sides, thick caption band at the bottom.
    #[value(name = "p", alias = "polaroid")]
    Polaroid,
    #[value(name = "s", alias = "small")]
    Small,
    #[value(name = "m", alias = "medium")]
    Medium,
    #[value(name = "l", alias = "large")]
    Large,
    /// Locked to a 4:5 canvas.
    #[value(name = "i", alias = "instagram")]
    Instagram,
}

impl BorderStyle {
    pub const ALL: [BorderStyle; 5] = [
        BorderStyle::Polaroid,
        BorderStyle::Small,
        BorderStyle::Medium,
        BorderStyle::Large,
        BorderStyle::Instagram,
    ];

    /// Single-character code used on the command line and in output names.
    pub fn code(self) -> char {
        match self {
            BorderStyle::Polaroid => 'p',
            BorderStyle::Small => 's',
            BorderStyle::Medium => 'm',
            BorderStyle::Large => 'l',
            BorderStyle::Instagram => 'i',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn sizing(self) -> Sizing {
        match self {
            BorderStyle::Polaroid => Sizing::Reduce([32, 32, 6, 32]),
            BorderStyle::Small => Sizing::Reduce([32; 4]),
            BorderStyle::Medium => Sizing::Reduce([16; 4]),
            BorderStyle::Large => Sizing::Reduce([6; 4]),
            BorderStyle::Instagram => Sizing::RatioLock {
                ratio: INSTAGRAM_RATIO,
                min_reduce: 32,
            },
        }
    }

    /// Whether captions stack vertically, centered on the full canvas.
    /// The remaining styles lay the caption out along one baseline.
    pub fn centered_caption(self) -> bool {
        matches!(
            self,
            BorderStyle::Polaroid | BorderStyle::Large | BorderStyle::Instagram
        )
    }

    /// Build the border for an image of the given size.
    pub fn compute(self, width: u32, height: u32) -> Border {
        let (top, right, bottom, left) = match self.sizing() {
            Sizing::Reduce([top, right, bottom, left]) => (
                border_size(width, height, top),
                border_size(width, height, right),
                border_size(width, height, bottom),
                border_size(width, height, left),
            ),
            Sizing::RatioLock { ratio, min_reduce } => {
                let min_border = border_size(width, height, min_reduce);
                let (horizontal, vertical) = ratio_borders(width, height, min_border, ratio);
                (vertical, horizontal, vertical, horizontal)
            }
        };
        Border {
            top,
            right,
            bottom,
            left,
            style: self,
        }
    }
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "polaroid" => Ok(BorderStyle::Polaroid),
            "s" | "small" => Ok(BorderStyle::Small),
            "m" | "medium" => Ok(BorderStyle::Medium),
            "l" | "large" => Ok(BorderStyle::Large),
            "i" | "instagram" => Ok(BorderStyle::Instagram),
            other => Err(format!("unknown border style '{other}'")),
        }
    }
}

/// Per-side border thickness in pixels. Built once per image, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
    pub style: BorderStyle,
}

impl Border {
    /// Size of the canvas once this border surrounds an image of `image` size.
    pub fn canvas_size(&self, image: (u32, u32)) -> (u32, u32) {
        (
            image.0 + self.left + self.right,
            image.1 + self.top + self.bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_is_uniform_golden_border() {
        let border = BorderStyle::Small.compute(4000, 3000);
        let b = border_size(4000, 3000, 32);
        assert_eq!(b, 86);
        assert_eq!((border.top, border.right, border.bottom, border.left), (b, b, b, b));
        assert_eq!(border.canvas_size((4000, 3000)), (4172, 3172));
    }

    #[test]
    fn tiers_get_thicker_from_small_to_large() {
        let small = BorderStyle::Small.compute(2000, 1500).top;
        let medium = BorderStyle::Medium.compute(2000, 1500).top;
        let large = BorderStyle::Large.compute(2000, 1500).top;
        assert!(small < medium);
        assert!(medium < large);
    }

    #[test]
    fn polaroid_has_thick_bottom_band() {
        let border = BorderStyle::Polaroid.compute(3000, 3000);
        assert_eq!(border.top, border.left);
        assert_eq!(border.left, border.right);
        assert_eq!(border.bottom, border_size(3000, 3000, 6));
        assert!(border.bottom > 4 * border.top);
    }

    #[test]
    fn instagram_portrait_reaches_four_by_five() {
        let border = BorderStyle::Instagram.compute(3000, 4000);
        assert_eq!(border.left, border.right);
        assert_eq!(border.top, border.bottom);
        let (w, h) = border.canvas_size((3000, 4000));
        assert_eq!((w, h), (3338, 4172));
        assert!((w as f64 - h as f64 * INSTAGRAM_RATIO).abs() <= 1.0);
    }

    #[test]
    fn instagram_landscape_reaches_four_by_five() {
        let border = BorderStyle::Instagram.compute(4000, 3000);
        let (w, h) = border.canvas_size((4000, 3000));
        assert!((w as f64 - h as f64 * INSTAGRAM_RATIO).abs() <= 1.0);
        assert!(border.top > border.left);
    }

    #[test]
    fn instagram_keeps_minimum_border_on_unpadded_axis() {
        let border = BorderStyle::Instagram.compute(3000, 4000);
        assert_eq!(border.top, border_size(3000, 4000, 32));
    }

    #[test]
    fn border_records_its_style() {
        for style in BorderStyle::ALL {
            assert_eq!(style.compute(640, 480).style, style);
        }
    }

    #[test]
    fn codes_round_trip() {
        for style in BorderStyle::ALL {
            assert_eq!(BorderStyle::from_code(style.code()), Some(style));
            assert_eq!(style.to_string().parse::<BorderStyle>(), Ok(style));
        }
        assert_eq!(BorderStyle::from_code('x'), None);
    }

    #[test]
    fn parse_accepts_long_names() {
        assert_eq!("Polaroid".parse(), Ok(BorderStyle::Polaroid));
        assert_eq!("instagram".parse(), Ok(BorderStyle::Instagram));
        assert!("huge".parse::<BorderStyle>().is_err());
    }

    #[test]
    fn centered_caption_styles() {
        assert!(BorderStyle::Polaroid.centered_caption());
        assert!(BorderStyle::Large.centered_caption());
        assert!(BorderStyle::Instagram.centered_caption());
        assert!(!BorderStyle::Small.centered_caption());
        assert!(!BorderStyle::Medium.centered_caption());
    }
}
