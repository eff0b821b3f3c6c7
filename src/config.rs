//! Run configuration.
//!
//! Handles loading, validating, and merging `simple-border.toml`. Stock
//! defaults are the base layer; a user file only needs the keys it wants to
//! change, and CLI flags are applied on top of the merged result.
//!
//! ## Config File Location
//!
//! Pass `--config <file>` explicitly, or place `simple-border.toml` in the
//! directory the tool is run from. Without either, stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [fonts]
//! dir = "fonts"                  # Directory relative font names resolve against
//! regular = "Roboto-Regular.ttf" # Body lines (lens, exposure)
//! bold = "Roboto-Medium.ttf"     # Heading line (camera)
//! index = 0                      # Face index inside .ttc collections
//!
//! [files]
//! include = ["*.jpg", "*.jpeg", "*.png", "*.JPG", "*.JPEG", "*.PNG"]
//! exclude = ["*_border*"]
//!
//! [colors]
//! background = "#ffffff"         # Border fill
//! heading = "#646464"
//! body = "#808080"
//!
//! [text]
//! min_font_size = 4              # Smaller caption lines are not drawn
//!
//! [palette]
//! tolerance = 32                 # 0-100, how far apart swatch colours must be
//! limit = 5                      # Maximum swatch colours
//! columns = 6                    # Swatch cells per row
//! ```
//!
//! Unknown keys are rejected to catch typos early. Colours are validated at
//! load time so a bad value fails before any image is touched.

use crate::imaging::{ColorScheme, PaletteOptions, Rgb};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "simple-border.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `simple-border.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderConfig {
    /// Caption font files.
    pub fonts: FontsConfig,
    /// Input filename patterns.
    pub files: FilesConfig,
    /// Border and caption colours.
    pub colors: ColorsConfig,
    /// Caption text limits.
    pub text: TextConfig,
    /// Colour swatch settings.
    pub palette: PaletteConfig,
}

impl BorderConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.colors.scheme()?;
        if self.palette.tolerance > 100 {
            return Err(ConfigError::Validation(
                "palette.tolerance must be 0-100".into(),
            ));
        }
        if self.palette.limit == 0 {
            return Err(ConfigError::Validation(
                "palette.limit must be at least 1".into(),
            ));
        }
        if self.palette.columns == 0 {
            return Err(ConfigError::Validation(
                "palette.columns must be non-zero".into(),
            ));
        }
        if self.text.min_font_size == 0 {
            return Err(ConfigError::Validation(
                "text.min_font_size must be non-zero".into(),
            ));
        }
        if self.files.include.is_empty() {
            return Err(ConfigError::Validation(
                "files.include must not be empty".into(),
            ));
        }
        if self.fonts.regular.is_empty() || self.fonts.bold.is_empty() {
            return Err(ConfigError::Validation(
                "fonts.regular and fonts.bold must name a file".into(),
            ));
        }
        Ok(())
    }

    /// Colours parsed into render-ready values.
    pub fn color_scheme(&self) -> Result<ColorScheme, ConfigError> {
        self.colors.scheme()
    }

    pub fn palette_options(&self) -> PaletteOptions {
        PaletteOptions {
            tolerance: self.palette.tolerance,
            limit: self.palette.limit,
            columns: self.palette.columns,
        }
    }
}

/// Caption font files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    /// Directory that relative font names resolve against.
    pub dir: PathBuf,
    /// Body face.
    pub regular: String,
    /// Heading face.
    pub bold: String,
    /// Face index inside font collections. Applies to both faces.
    pub index: u32,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("fonts"),
            regular: "Roboto-Regular.ttf".to_string(),
            bold: "Roboto-Medium.ttf".to_string(),
            index: 0,
        }
    }
}

impl FontsConfig {
    /// Absolute names are used as given; anything else lives in `dir`.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }
}

/// Shell-style filename patterns for input discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: ["*.jpg", "*.jpeg", "*.png", "*.JPG", "*.JPEG", "*.PNG"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude: vec!["*_border*".to_string()],
        }
    }
}

/// Hex colours, kept as strings so the file round-trips as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorsConfig {
    pub background: String,
    pub heading: String,
    pub body: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            heading: "#646464".to_string(),
            body: "#808080".to_string(),
        }
    }
}

impl ColorsConfig {
    fn scheme(&self) -> Result<ColorScheme, ConfigError> {
        Ok(ColorScheme {
            background: parse_color("colors.background", &self.background)?,
            heading: parse_color("colors.heading", &self.heading)?,
            body: parse_color("colors.body", &self.body)?,
        })
    }
}

fn parse_color(key: &str, value: &str) -> Result<Rgb, ConfigError> {
    value
        .parse()
        .map_err(|e: String| ConfigError::Validation(format!("{key}: {e}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Caption lines that would fit below this pixel size are not drawn.
    pub min_font_size: u32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { min_font_size: 4 }
    }
}

/// Colour swatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    /// Merge distance as a percentage of the RGB colour-distance range.
    pub tolerance: u8,
    /// Maximum number of swatch colours.
    pub limit: usize,
    /// Swatch cells per row.
    pub columns: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let stock = PaletteOptions::default();
        Self {
            tolerance: stock.tolerance,
            limit: stock.limit,
            columns: stock.columns,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(BorderConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(file: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(file)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BorderConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BorderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// `simple-border.toml` in `dir`, if there is one.
pub fn discover_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Load config from `file`, or stock defaults when `None`.
///
/// An explicitly named file that does not exist is an error.
pub fn load_config(file: Option<&Path>) -> Result<BorderConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = file.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `simple-border.toml` with all keys.
///
/// Used by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-border configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from --config <file>, or from simple-border.toml in the
# directory the tool runs in. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Caption fonts
# ---------------------------------------------------------------------------
[fonts]
# Directory that relative font file names are looked up in.
dir = "fonts"

# Body lines (lens, exposure settings).
regular = "Roboto-Regular.ttf"

# Heading line (camera make and model).
bold = "Roboto-Medium.ttf"

# Face index inside .ttc/.otc collections. Applies to both fonts.
index = 0

# ---------------------------------------------------------------------------
# Input files
# ---------------------------------------------------------------------------
[files]
# Shell-style patterns matched against file names (case-sensitive).
# A file must match one include pattern and no exclude pattern.
include = ["*.jpg", "*.jpeg", "*.png", "*.JPG", "*.JPEG", "*.PNG"]

# Keeps results of an earlier run from getting a second border.
exclude = ["*_border*"]

# ---------------------------------------------------------------------------
# Colors (#rrggbb)
# ---------------------------------------------------------------------------
[colors]
# Border fill.
background = "#ffffff"

# Camera line.
heading = "#646464"

# Lens and exposure lines.
body = "#808080"

# ---------------------------------------------------------------------------
# Caption text
# ---------------------------------------------------------------------------
[text]
# Lines whose fitted font size falls below this are left out.
min_font_size = 4

# ---------------------------------------------------------------------------
# Colour swatch (--palette)
# ---------------------------------------------------------------------------
[palette]
# How different two colours must be to get separate cells,
# as a percentage of the full RGB distance (0-100).
tolerance = 32

# Maximum number of colours shown.
limit = 5

# Cells per swatch row.
columns = 6
"##
}
