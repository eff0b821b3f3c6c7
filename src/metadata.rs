//! EXIF display formatting.
//!
//! Raw EXIF values arrive as strings keyed by tag name (see
//! [`ImageBackend::read_exif`](crate::imaging::ImageBackend::read_exif)).
//! This module turns them into caption text:
//!
//! | Tag | Display |
//! |---|---|
//! | `Make` | `Shot on {make}` |
//! | `FocalLength` | rounded, `{value}mm` |
//! | `FNumber` | `f/{value}` |
//! | `ISOSpeedRatings` | `ISO{value}` |
//! | `ExposureTime` | simple fraction, `{value} sec` |
//! | anything else | trimmed value |
//!
//! Missing or blank fields format to the empty string and are left out of
//! caption lines entirely, so no separator is ever doubled or dangling.

use crate::layout::{FontRole, TextBlock};
use std::collections::BTreeMap;

/// Raw EXIF values by tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifFields(BTreeMap<String, String>);

impl ExifFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.0.insert(tag.into(), value.into());
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Display string for `tag`, or `""` if absent.
    pub fn display(&self, tag: &str) -> String {
        self.get(tag)
            .map(|raw| format_field(tag, raw))
            .unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExifFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Format one raw value for display.
pub fn format_field(tag: &str, raw: &str) -> String {
    let data = raw.trim();
    if data.is_empty() {
        return String::new();
    }
    match tag {
        "Make" => format!("Shot on {data}"),
        "FocalLength" => format!("{}mm", format_focal_length(data)),
        "FNumber" => format!("f/{data}"),
        "ISOSpeedRatings" => format!("ISO{data}"),
        "ExposureTime" => format!("{} sec", format_shutter_speed(data)),
        _ => data.to_string(),
    }
}

/// Render an exposure time as a photographer would read it.
///
/// Values of one second or more show the numerator of the reduced fraction
/// (`"2"` → `2`); shorter exposures show `1/N` with `N = round(1 / value)`
/// (`"0.004"` → `1/250`). Input may be decimal or `a/b`. Anything that doesn't
/// parse, or is zero, is returned unchanged.
pub fn format_shutter_speed(value: &str) -> String {
    let Some((num, den)) = parse_fraction(value) else {
        return value.to_string();
    };
    if num == 0 {
        return value.to_string();
    }
    if num >= den {
        num.to_string()
    } else {
        let reciprocal = (den as f64 / num as f64).round() as u64;
        format!("1/{reciprocal}")
    }
}

/// Round a focal length for display.
///
/// Written with two or more decimals → two decimals (`24.878` → `24.88`).
/// Otherwise → whole millimetres, half to even (`24.0` → `24`).
/// Unparseable input is returned unchanged.
pub fn format_focal_length(value: &str) -> String {
    let Ok(parsed) = value.parse::<f64>() else {
        return value.to_string();
    };
    let decimals = value
        .rfind('.')
        .map(|pos| value.len() - pos - 1)
        .unwrap_or(0);
    if decimals >= 2 {
        format!("{}", (parsed * 100.0).round() / 100.0)
    } else {
        format!("{}", parsed.round_ties_even())
    }
}

/// Parse `a/b` or a plain decimal into a reduced, non-negative fraction.
fn parse_fraction(value: &str) -> Option<(u64, u64)> {
    let value = value.trim();
    let (num, den) = match value.split_once('/') {
        Some((n, d)) => (n.trim().parse::<u64>().ok()?, d.trim().parse::<u64>().ok()?),
        None => {
            let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
            if frac.len() > 12 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
            let scale = 10u64.pow(frac.len() as u32);
            let frac: u64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
            (whole.checked_mul(scale)?.checked_add(frac)?, scale)
        }
    };
    if den == 0 {
        return None;
    }
    let divisor = gcd(num, den).max(1);
    Some((num / divisor, den / divisor))
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Join the non-empty parts with `separator`.
fn join_present(parts: &[String], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

/// The three caption lines built from EXIF fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifSummary {
    /// `Shot on {Make} {Model}`
    pub camera: String,
    /// `{LensMake} {LensModel}`
    pub lens: String,
    /// `{FocalLength}  {FNumber}  {ISO}  {ExposureTime}`
    pub settings: String,
}

impl ExifSummary {
    pub fn from_fields(fields: &ExifFields) -> Self {
        let d = |tag: &str| fields.display(tag);
        Self {
            camera: join_present(&[d("Make"), d("Model")], " "),
            lens: join_present(&[d("LensMake"), d("LensModel")], " "),
            settings: join_present(
                &[
                    d("FocalLength"),
                    d("FNumber"),
                    d("ISOSpeedRatings"),
                    d("ExposureTime"),
                ],
                "  ",
            ),
        }
    }

    /// True when there is nothing worth drawing.
    pub fn is_empty(&self) -> bool {
        self.camera.is_empty() && self.lens.is_empty() && self.settings.is_empty()
    }

    /// Caption block: camera as heading, lens and settings as body text.
    pub fn to_block(&self) -> TextBlock {
        let mut block = TextBlock::default();
        block.push(self.camera.clone(), FontRole::Heading);
        block.push(self.lens.clone(), FontRole::Body);
        block.push(self.settings.clone(), FontRole::Body);
        block
    }
}
