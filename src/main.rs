use clap::Parser;
use simple_border::border::BorderStyle;
use simple_border::config::{self, BorderConfig};
use simple_border::imaging::{FontSet, RenderOptions, RustBackend};
use simple_border::scan::FileFilter;
use simple_border::{output, process};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "simple-border")]
#[command(about = "Add a border, EXIF caption, and colour swatch to photos")]
#[command(long_about = "\
Add a border, EXIF caption, and colour swatch to photos

Each photo is saved next to the original with the style and features in its
name; originals are never modified:

  photo.jpg  →  photo_border-s.jpg               (default)
             →  photo_border-p_exif.jpg          (-t p -e)
             →  photo_border-l_exif_palette.jpg  (-t l -e -p)

Border styles:
  p  Polaroid   thin sides, wide caption band at the bottom
  s  Small      thin even border (default)
  m  Medium     medium even border
  l  Large      wide even border
  i  Instagram  padded to a 4:5 canvas

Running again on a directory skips earlier outputs (they match the
*_border* exclude pattern), so re-runs never stack borders.

Run 'simple-border --gen-config' to print a documented simple-border.toml.")]
#[command(version)]
struct Cli {
    /// Image file or directory of images
    #[arg(required_unless_present = "gen_config")]
    path: Option<PathBuf>,

    /// Draw a caption from the photo's EXIF data (camera, lens, exposure)
    #[arg(short, long)]
    exif: bool,

    /// Draw a swatch of the photo's dominant colours
    #[arg(short, long)]
    palette: bool,

    /// Border style
    #[arg(short = 't', long, value_enum, default_value = "s")]
    border_type: BorderStyle,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// File name patterns to include (replaces the configured list)
    #[arg(long, num_args = 1..)]
    include: Option<Vec<String>>,

    /// File name patterns to exclude (replaces the configured list)
    #[arg(long, num_args = 1..)]
    exclude: Option<Vec<String>>,

    /// Regular font file, by name inside the fonts directory or as a path
    #[arg(short = 'f', long)]
    font: Option<String>,

    /// Bold font file for the camera line
    #[arg(short = 'b', long)]
    fontbold: Option<String>,

    /// Directory font names are looked up in
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Config file (default: ./simple-border.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a stock simple-border.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply_overrides(&self, config: &mut BorderConfig) {
        if let Some(include) = &self.include {
            config.files.include = include.clone();
        }
        if let Some(exclude) = &self.exclude {
            config.files.exclude = exclude.clone();
        }
        if let Some(font) = &self.font {
            config.fonts.regular = font.clone();
        }
        if let Some(bold) = &self.fontbold {
            config.fonts.bold = bold.clone();
        }
        if let Some(dir) = &self.fonts_dir {
            config.fonts.dir = dir.clone();
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }
    let Some(path) = cli.path.as_deref() else {
        return Ok(ExitCode::FAILURE);
    };

    let config_file = cli
        .config
        .clone()
        .or_else(|| config::discover_config(Path::new(".")));
    if let Some(file) = &config_file {
        info!(file = %file.display(), "using config");
    }
    let mut config = config::load_config(config_file.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let options = RenderOptions {
        style: cli.border_type,
        exif: cli.exif,
        palette: cli.palette.then(|| config.palette_options()),
        colors: config.color_scheme()?,
        min_font_size: config.text.min_font_size,
    };

    let backend = if cli.exif {
        RustBackend::with_fonts(FontSet::load(&config.fonts)?)
    } else {
        RustBackend::new()
    };

    let filter = FileFilter::new(config.files.include, config.files.exclude);
    let report = match process::process_path(&backend, path, cli.recursive, &filter, &options) {
        Ok(report) => report,
        Err(e) => {
            error!(path = %path.display(), error = %e, "cannot read input");
            return Ok(ExitCode::FAILURE);
        }
    };

    let root = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    output::print_batch_summary(&report, root);

    Ok(ExitCode::SUCCESS)
}
