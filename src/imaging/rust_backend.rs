//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image` crate |
//! | Canvas + paste | `image::RgbImage::from_pixel` + `image::imageops::overlay` |
//! | Caption text | `imageproc::drawing::draw_text_mut` with `ab_glyph` faces |
//! | Palette | [`palette`](super::palette) + `imageproc::drawing::draw_filled_rect_mut` |
//! | EXIF read | `kamadak-exif` (`exif::Reader`) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder`, quality 95, 4:4:4, source EXIF spliced in |
//! | Encode → PNG | `image` crate |

use super::backend::{BackendError, Dimensions, ImageBackend, TextExtent};
use super::fonts::FontSet;
use super::palette::{extract_palette, paint_swatch};
use super::params::{ComposeParams, Rgb};
use crate::layout::FontSpec;
use crate::metadata::ExifFields;
use exif::{In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, ImageReader, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

/// Extensions that can be read and written.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// JPEG output quality. Fixed: the border edge against the photo must stay
/// crisp, and the encoder never subsamples chroma.
pub const JPEG_QUALITY: u8 = 95;

/// Identifier that opens an EXIF APP1 payload.
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Returns the image file extensions this backend can process.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// Caption text needs fonts; a backend built with [`RustBackend::new`] can
/// compose borders and palettes but reports
/// [`BackendError::FontUnavailable`] for any text operation.
#[derive(Debug, Default)]
pub struct RustBackend {
    fonts: Option<FontSet>,
}

impl RustBackend {
    pub fn new() -> Self {
        Self { fonts: None }
    }

    pub fn with_fonts(fonts: FontSet) -> Self {
        Self { fonts: Some(fonts) }
    }

    fn fonts(&self) -> Result<&FontSet, BackendError> {
        self.fonts.as_ref().ok_or(BackendError::FontUnavailable)
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Parse the EXIF container of `path`, if it has one.
fn read_exif_container(path: &Path) -> Option<exif::Exif> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Some(exif),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no usable EXIF");
            None
        }
    }
}

/// Flatten the primary image's EXIF into display-ready strings.
fn exif_fields(exif: &exif::Exif) -> ExifFields {
    let mut fields = ExifFields::new();
    for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
        let name = if field.tag == Tag::PhotographicSensitivity {
            "ISOSpeedRatings".to_string()
        } else {
            field.tag.to_string()
        };
        match value_string(field.tag, &field.value) {
            Some(value) => fields.insert(name, value),
            None => debug!(tag = %name, "dropping undecodable EXIF field"),
        }
    }
    fields
}

/// Render the first component of an EXIF value as text.
///
/// Byte payloads must be valid UTF-8; anything else yields `None`.
fn value_string(tag: Tag, value: &Value) -> Option<String> {
    let text = match value {
        Value::Ascii(parts) => {
            let mut out = Vec::new();
            for part in parts {
                out.push(std::str::from_utf8(part).ok()?);
            }
            out.join(" ")
        }
        Value::Undefined(bytes, _) => std::str::from_utf8(bytes).ok()?.to_string(),
        Value::Byte(v) => v.first()?.to_string(),
        Value::Short(v) => v.first()?.to_string(),
        Value::Long(v) => v.first()?.to_string(),
        Value::SByte(v) => v.first()?.to_string(),
        Value::SShort(v) => v.first()?.to_string(),
        Value::SLong(v) => v.first()?.to_string(),
        Value::Float(v) => v.first()?.to_string(),
        Value::Double(v) => v.first()?.to_string(),
        Value::Rational(v) => {
            let r = v.first()?;
            rational_string(tag, i64::from(r.num), i64::from(r.denom))?
        }
        Value::SRational(v) => {
            let r = v.first()?;
            rational_string(tag, i64::from(r.num), i64::from(r.denom))?
        }
        _ => return None,
    };
    Some(text.trim_end_matches('\0').to_string())
}

/// Whole rationals print as integers, exposure times keep their `a/b` form,
/// everything else becomes a decimal.
fn rational_string(tag: Tag, num: i64, denom: i64) -> Option<String> {
    if denom == 0 {
        return None;
    }
    if num % denom == 0 {
        Some((num / denom).to_string())
    } else if tag == Tag::ExposureTime {
        Some(format!("{num}/{denom}"))
    } else {
        Some((num as f64 / denom as f64).to_string())
    }
}

/// Insert `tiff` (raw EXIF TIFF data) as an APP1 segment right after the
/// SOI marker, or after a leading JFIF APP0 segment.
///
/// Returns `None` when `jpeg` is not a JPEG stream or the EXIF block does
/// not fit in a single segment.
pub fn splice_exif(jpeg: &[u8], tiff: &[u8]) -> Option<Vec<u8>> {
    if jpeg.len() < 4 || jpeg[..2] != [0xFF, 0xD8] {
        return None;
    }
    let segment_len = u16::try_from(EXIF_HEADER.len() + tiff.len() + 2).ok()?;

    let mut insert_at = 2;
    if jpeg[2..4] == [0xFF, 0xE0] {
        let app0_len = u16::from_be_bytes([*jpeg.get(4)?, *jpeg.get(5)?]) as usize;
        insert_at = 4 + app0_len;
        if insert_at > jpeg.len() {
            return None;
        }
    }

    let mut out = Vec::with_capacity(jpeg.len() + segment_len as usize + 2);
    out.extend_from_slice(&jpeg[..insert_at]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[insert_at..]);
    Some(out)
}

/// Encode `canvas` to `path`, choosing the format from the extension.
fn save_image(canvas: &RgbImage, path: &Path, exif: Option<&[u8]>) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!("Unsupported output format: {}", e))
    })?;

    match format {
        ImageFormat::Jpeg => {
            let mut encoded = Vec::new();
            JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY)
                .write_image(
                    canvas.as_raw(),
                    canvas.width(),
                    canvas.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
            let bytes = match exif.and_then(|tiff| splice_exif(&encoded, tiff)) {
                Some(with_exif) => with_exif,
                None => {
                    if exif.is_some() {
                        warn!(path = %path.display(), "EXIF block too large to carry over");
                    }
                    encoded
                }
            };
            std::fs::write(path, bytes)?;
            Ok(())
        }
        ImageFormat::Png => canvas
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e))),
        other => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {:?}",
            other
        ))),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn read_exif(&self, path: &Path) -> Result<ExifFields, BackendError> {
        Ok(read_exif_container(path)
            .map(|exif| exif_fields(&exif))
            .unwrap_or_default())
    }

    fn measure_text(&self, font: FontSpec, text: &str) -> Result<TextExtent, BackendError> {
        Ok(self.fonts()?.face(font.role).measure(font.size, text))
    }

    fn dominant_colors(
        &self,
        path: &Path,
        tolerance: u8,
        limit: usize,
    ) -> Result<Vec<Rgb>, BackendError> {
        let photo = load_image(path)?.to_rgb8();
        Ok(extract_palette(&photo, tolerance, limit)
            .into_iter()
            .map(|entry| entry.color)
            .collect())
    }

    fn compose(&self, params: &ComposeParams) -> Result<(), BackendError> {
        let photo = load_image(&params.source)?.to_rgb8();
        let (width, height) = params.canvas_size();
        let mut canvas = RgbImage::from_pixel(width, height, image::Rgb(params.background.0));
        image::imageops::overlay(
            &mut canvas,
            &photo,
            params.border.left as i64,
            params.border.top as i64,
        );

        if !params.text.is_empty() {
            let fonts = self.fonts()?;
            for line in &params.text {
                let face = fonts.face(line.font.role);
                draw_text_mut(
                    &mut canvas,
                    image::Rgb(line.color.0),
                    line.x,
                    line.y,
                    face.scale(line.font.size),
                    face.font(),
                    &line.text,
                );
            }
        }

        if let Some(palette) = &params.palette {
            debug!(
                colors = palette.colors.len(),
                x = palette.origin.0,
                y = palette.origin.1,
                "painting palette"
            );
            paint_swatch(
                &mut canvas,
                &palette.colors,
                palette.origin,
                palette.cell_size,
                palette.columns,
            );
        }

        let source_exif = read_exif_container(&params.source);
        save_image(
            &canvas,
            &params.output,
            source_exif.as_ref().map(|e| e.buf()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::BorderStyle;
    use crate::imaging::params::{PaletteParams, TextDraw};
    use crate::layout::FontRole;
    use crate::test_helpers::{create_test_jpeg, create_test_png};

    /// Little-endian TIFF block: IFD0 with Make "Sony", Model "X" and an
    /// Exif IFD holding ExposureTime 1/250 and ISO 200.
    fn camera_tiff() -> Vec<u8> {
        fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&kind.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&value);
        }
        let mut t = b"II\x2A\x00".to_vec();
        t.extend_from_slice(&8u32.to_le_bytes());
        // IFD0 at 8: 3 entries, ends at 50
        t.extend_from_slice(&3u16.to_le_bytes());
        entry(&mut t, 0x010F, 2, 5, 80u32.to_le_bytes());
        entry(&mut t, 0x0110, 2, 2, *b"X\0\0\0");
        entry(&mut t, 0x8769, 4, 1, 50u32.to_le_bytes());
        t.extend_from_slice(&0u32.to_le_bytes());
        // Exif IFD at 50: 2 entries, ends at 80
        t.extend_from_slice(&2u16.to_le_bytes());
        entry(&mut t, 0x829A, 5, 1, 86u32.to_le_bytes());
        entry(&mut t, 0x8827, 3, 1, [200, 0, 0, 0]);
        t.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(t.len(), 80);
        t.extend_from_slice(b"Sony\0\0");
        t.extend_from_slice(&1u32.to_le_bytes());
        t.extend_from_slice(&250u32.to_le_bytes());
        t
    }

    fn jpeg_with_exif(path: &Path, width: u32, height: u32) {
        create_test_jpeg(path, width, height);
        let plain = std::fs::read(path).unwrap();
        std::fs::write(path, splice_exif(&plain, &camera_tiff()).unwrap()).unwrap();
    }

    fn params(source: &Path, output: &Path, style: BorderStyle, size: (u32, u32)) -> ComposeParams {
        ComposeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            border: style.compute(size.0, size.1),
            image_width: size.0,
            image_height: size.1,
            background: Rgb::WHITE,
            text: Vec::new(),
            palette: None,
        }
    }

    #[test]
    fn supported_extensions_are_jpeg_and_png() {
        assert_eq!(supported_input_extensions(), &["jpg", "jpeg", "png"]);
    }

    // =========================================================================
    // identify / read_exif
    // =========================================================================

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn dominant_colors_of_missing_file_errors() {
        let result = RustBackend::new().dominant_colors(Path::new("/nonexistent/a.png"), 32, 5);
        assert!(result.is_err());
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn read_exif_without_exif_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 100, 100);

        let backend = RustBackend::new();
        assert!(backend.read_exif(&path).unwrap().is_empty());
        assert!(
            backend
                .read_exif(Path::new("/nonexistent/image.jpg"))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn read_exif_maps_camera_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("camera.jpg");
        jpeg_with_exif(&path, 64, 48);

        let fields = RustBackend::new().read_exif(&path).unwrap();
        assert_eq!(fields.get("Make"), Some("Sony"));
        assert_eq!(fields.get("Model"), Some("X"));
        assert_eq!(fields.get("ISOSpeedRatings"), Some("200"));
        assert_eq!(fields.get("ExposureTime"), Some("1/250"));
        assert_eq!(fields.display("ExposureTime"), "1/250 sec");
    }

    #[test]
    fn rational_rendering() {
        assert_eq!(rational_string(Tag::FocalLength, 23, 1).as_deref(), Some("23"));
        assert_eq!(rational_string(Tag::FNumber, 28, 10).as_deref(), Some("2.8"));
        assert_eq!(rational_string(Tag::ExposureTime, 1, 60).as_deref(), Some("1/60"));
        assert_eq!(rational_string(Tag::FNumber, 1, 0), None);
    }

    #[test]
    fn invalid_utf8_field_is_dropped() {
        let value = Value::Ascii(vec![vec![0xFF, 0xFE]]);
        assert_eq!(value_string(Tag::Make, &value), None);
        let value = Value::Ascii(vec![b"Canon\0".to_vec()]);
        assert_eq!(value_string(Tag::Make, &value).as_deref(), Some("Canon"));
    }

    // =========================================================================
    // splice_exif
    // =========================================================================

    #[test]
    fn splice_goes_after_jfif_header() {
        // SOI, APP0 (length 4 → 2 payload bytes), then SOS-ish tail
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB, 0xFF, 0xDA];
        let out = splice_exif(&jpeg, b"TIFF").unwrap();
        assert_eq!(&out[..8], &jpeg[..8]);
        assert_eq!(&out[8..10], &[0xFF, 0xE1]);
        assert_eq!(u16::from_be_bytes([out[10], out[11]]), 12);
        assert_eq!(&out[12..18], b"Exif\0\0");
        assert_eq!(&out[18..22], b"TIFF");
        assert_eq!(&out[22..], &[0xFF, 0xDA]);
    }

    #[test]
    fn splice_without_app0_goes_after_soi() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xDB, 0x00];
        let out = splice_exif(&jpeg, b"T").unwrap();
        assert_eq!(&out[2..4], &[0xFF, 0xE1]);
    }

    #[test]
    fn splice_rejects_non_jpeg_and_oversized() {
        assert!(splice_exif(b"\x89PNG", b"T").is_none());
        let huge = vec![0u8; 70_000];
        assert!(splice_exif(&[0xFF, 0xD8, 0xFF, 0xDA], &huge).is_none());
    }

    // =========================================================================
    // compose
    // =========================================================================

    #[test]
    fn compose_small_border_canvas_and_fill() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 100, 80);
        let output = tmp.path().join("source_border-l.png");

        let p = params(&source, &output, BorderStyle::Large, (100, 80));
        RustBackend::new().compose(&p).unwrap();

        let out = image::open(&output).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (124, 104));
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(123, 103).0, [255, 255, 255]);
        // Photo pasted at (left, top)
        let src = image::open(&source).unwrap().to_rgb8();
        assert_eq!(out.get_pixel(12, 12), src.get_pixel(0, 0));
        assert_eq!(out.get_pixel(111, 91), src.get_pixel(99, 79));
    }

    #[test]
    fn compose_paints_palette_in_bottom_band() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("red.png");
        RgbImage::from_pixel(100, 80, image::Rgb([200, 10, 10]))
            .save(&source)
            .unwrap();
        let output = tmp.path().join("red_border-l_palette.png");

        let mut p = params(&source, &output, BorderStyle::Large, (100, 80));
        let colors = RustBackend::new().dominant_colors(&source, 32, 5).unwrap();
        assert_eq!(colors, vec![Rgb([200, 10, 10])]);
        // x = 124 - 12 - 4 = 108, y = 104 - 6 - 2 = 96
        p.palette = Some(PaletteParams {
            colors,
            origin: (108, 96),
            cell_size: 4,
            columns: 6,
        });
        RustBackend::new().compose(&p).unwrap();

        let out = image::open(&output).unwrap().to_rgb8();
        assert_eq!(out.get_pixel(108, 96).0, [200, 10, 10]);
        assert_eq!(out.get_pixel(111, 99).0, [200, 10, 10]);
        assert_eq!(out.get_pixel(107, 96).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(112, 96).0, [255, 255, 255]);
    }

    #[test]
    fn compose_jpeg_carries_source_exif() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("camera.jpg");
        jpeg_with_exif(&source, 120, 90);
        let output = tmp.path().join("camera_border-s.jpg");

        let backend = RustBackend::new();
        backend
            .compose(&params(&source, &output, BorderStyle::Small, (120, 90)))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        let border = BorderStyle::Small.compute(120, 90);
        assert_eq!(
            (dims.width, dims.height),
            border.canvas_size((120, 90))
        );
        assert_eq!(backend.read_exif(&output).unwrap().get("Make"), Some("Sony"));
    }

    #[test]
    fn compose_text_without_fonts_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 50, 50);

        let mut p = params(&source, &tmp.path().join("out.png"), BorderStyle::Polaroid, (50, 50));
        p.text.push(TextDraw {
            text: "Shot on Sony".into(),
            font: FontSpec {
                role: FontRole::Heading,
                size: 5,
            },
            x: 1,
            y: 55,
            color: Rgb([100, 100, 100]),
        });
        let err = RustBackend::new().compose(&p).unwrap_err();
        assert!(matches!(err, BackendError::FontUnavailable));
    }

    #[test]
    fn measure_without_fonts_fails() {
        let font = FontSpec {
            role: FontRole::Body,
            size: 12,
        };
        assert!(matches!(
            RustBackend::new().measure_text(font, "abc"),
            Err(BackendError::FontUnavailable)
        ));
    }

    #[test]
    fn compose_unsupported_output_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 20, 20);

        let p = params(&source, &tmp.path().join("out.gif"), BorderStyle::Small, (20, 20));
        assert!(RustBackend::new().compose(&p).is_err());
    }

    #[test]
    fn compose_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        let p = params(&source, &tmp.path().join("out.jpg"), BorderStyle::Small, (20, 20));
        assert!(RustBackend::new().compose(&p).is_err());
    }
}
