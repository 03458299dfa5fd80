// ============================================================================
// I/O BOUNDARY: decoded rasters <-> Canvas, ASCII stamp descriptions, and
// the native .pxs document format
// ============================================================================
//
// PNG/JPEG decoding and encoding belong to the `image` crate; this module only
// converts its already-decoded RGBA buffers to and from the float canvas.
// ============================================================================

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::{ImageError, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::color::ColorData;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure to read a raster, either a decoded image or an ASCII description.
#[derive(Debug)]
pub enum RasterError {
    Io(std::io::Error),
    Malformed(String),
    Image(ImageError),
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::Io(e) => write!(f, "I/O error: {}", e),
            RasterError::Malformed(e) => write!(f, "Malformed raster: {}", e),
            RasterError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for RasterError {}

impl From<std::io::Error> for RasterError {
    fn from(e: std::io::Error) -> Self {
        RasterError::Io(e)
    }
}

impl From<ImageError> for RasterError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::IoError(io) => RasterError::Io(io),
            other => RasterError::Image(other),
        }
    }
}

/// Failure to read or write a .pxs document.
#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
    Raster(RasterError),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Io(e) => write!(f, "I/O error: {}", e),
            DocumentError::Serialize(e) => write!(f, "Serialization error: {}", e),
            DocumentError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
            DocumentError::Raster(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<std::io::Error> for DocumentError {
    fn from(e: std::io::Error) -> Self {
        DocumentError::Io(e)
    }
}

impl From<RasterError> for DocumentError {
    fn from(e: RasterError) -> Self {
        DocumentError::Raster(e)
    }
}

impl From<Box<bincode::ErrorKind>> for DocumentError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        DocumentError::Serialize(e.to_string())
    }
}

// ============================================================================
// ASCII RASTER (plain PPM): built-in decorative stamps
// ============================================================================

/// Decoded ASCII raster, RGB normalised to [0, 1], row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct AsciiRaster {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[f32; 3]>,
}

impl AsciiRaster {
    pub fn rgb(&self, col: usize, row: usize) -> [f32; 3] {
        self.pixels[row * self.width + col]
    }
}

fn header_value(token: Option<&str>, what: &str) -> Result<usize, RasterError> {
    let token = token.ok_or_else(|| RasterError::Malformed(format!("missing {}", what)))?;
    let value: i64 = token
        .parse()
        .map_err(|_| RasterError::Malformed(format!("invalid {} '{}'", what, token)))?;
    if value < 1 {
        return Err(RasterError::Malformed(format!("{} must be positive, got {}", what, value)));
    }
    Ok(value as usize)
}

/// Parse `[P3] width height maxval` followed by one `R G B` triple per pixel.
/// `#` starts a comment running to the end of the line.
pub fn parse_ascii_raster(text: &str) -> Result<AsciiRaster, RasterError> {
    let mut tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .peekable();

    if let Some(first) = tokens.peek()
        && first.starts_with('P')
    {
        if *first != "P3" {
            return Err(RasterError::Malformed(format!("unsupported magic '{}'", first)));
        }
        tokens.next();
    }

    let width = header_value(tokens.next(), "width")?;
    let height = header_value(tokens.next(), "height")?;
    let max_value = header_value(tokens.next(), "max color value")? as f32;

    let expected = width
        .checked_mul(height)
        .filter(|n| n.checked_mul(3).is_some())
        .ok_or_else(|| RasterError::Malformed(format!("size {}x{} is too large", width, height)))?;
    // The header is untrusted; grow with the data actually present.
    let mut pixels = Vec::new();
    for i in 0..expected {
        let mut rgb = [0.0f32; 3];
        for channel in rgb.iter_mut() {
            let token = tokens.next().ok_or_else(|| {
                RasterError::Malformed(format!("pixel data ends after {} of {} pixels", i, expected))
            })?;
            let v: u32 = token
                .parse()
                .map_err(|_| RasterError::Malformed(format!("invalid channel value '{}'", token)))?;
            *channel = v as f32 / max_value;
        }
        pixels.push(rgb);
    }

    if let Some(extra) = tokens.next() {
        return Err(RasterError::Malformed(format!("trailing data '{}'", extra)));
    }

    Ok(AsciiRaster { width, height, pixels })
}

pub fn load_ascii_raster(path: &Path) -> Result<AsciiRaster, RasterError> {
    let text = std::fs::read_to_string(path)?;
    parse_ascii_raster(&text)
}

// ============================================================================
// DECODED RASTER <-> CANVAS
// ============================================================================

/// Convert an 8-bit RGBA image into a canvas. With `composite`, each pixel
/// is blended over `background` by its alpha (loading a document); without,
/// transparency is kept (loading a stamp).
pub fn canvas_from_rgba(img: &RgbaImage, background: ColorData, composite: bool) -> Canvas {
    let mut canvas = Canvas::new(img.width(), img.height(), background);
    let bg = background.clamped_color();
    for (x, y, px) in img.enumerate_pixels() {
        let [r, g, b, a] = px.0.map(|v| v as f32 / 255.0);
        let mut color = ColorData::new(r, g, b, a);
        if composite {
            color = ColorData::new(
                r * a + bg.red * (1.0 - a),
                g * a + bg.green * (1.0 - a),
                b * a + bg.blue * (1.0 - a),
                a + bg.alpha * (1.0 - a),
            );
        }
        canvas.set_valid_pixel(x as i32, y as i32, color);
    }
    canvas
}

/// Clamp and quantise the canvas to 8-bit RGBA, top row first.
pub fn canvas_to_rgba(canvas: &Canvas) -> RgbaImage {
    RgbaImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let c = canvas.get_valid_pixel(x as i32, y as i32).clamped_color();
        Rgba(c.to_array().map(|v| (v * 255.0).round() as u8))
    })
}

/// Decode any format the `image` crate understands.
pub fn load_canvas(path: &Path, background: ColorData) -> Result<Canvas, RasterError> {
    let img = image::open(path)?.into_rgba8();
    Ok(canvas_from_rgba(&img, background, true))
}

/// Decode an image for use as a stamp, transparency preserved.
pub fn load_stamp_image(path: &Path) -> Result<Canvas, RasterError> {
    let img = image::open(path)?.into_rgba8();
    Ok(canvas_from_rgba(&img, ColorData::TRANSPARENT, false))
}

/// Encode the canvas; the format follows the file extension.
pub fn save_canvas(canvas: &Canvas, path: &Path) -> Result<(), RasterError> {
    let img = canvas_to_rgba(canvas);
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_lowercase().as_str(), "jpg" | "jpeg"));
    if is_jpeg {
        // JPEG has no alpha channel.
        image::DynamicImage::ImageRgba8(img).into_rgb8().save(path)?;
    } else {
        img.save(path)?;
    }
    Ok(())
}

// ============================================================================
// NATIVE DOCUMENT FORMAT (.pxs)
// ============================================================================

const DOCUMENT_MAGIC: &str = "PXS1";
pub const DOCUMENT_EXTENSION: &str = "pxs";

#[derive(Serialize, Deserialize)]
struct DocumentFile {
    magic: String,
    width: u32,
    height: u32,
    background: ColorData,
    /// Storage order, exactly as `Canvas::get_all_pixels` returns it.
    pixels: Vec<ColorData>,
}

pub fn save_document(canvas: &Canvas, path: &Path) -> Result<(), DocumentError> {
    let doc = DocumentFile {
        magic: DOCUMENT_MAGIC.to_string(),
        width: canvas.width(),
        height: canvas.height(),
        background: canvas.background_color(),
        pixels: canvas.get_all_pixels(),
    };
    let writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(writer, &doc)?;
    Ok(())
}

pub fn load_document(path: &Path) -> Result<Canvas, DocumentError> {
    let reader = BufReader::new(File::open(path)?);
    let doc: DocumentFile = bincode::deserialize_from(reader)?;
    if doc.magic != DOCUMENT_MAGIC {
        return Err(DocumentError::InvalidFormat(format!("bad magic '{}'", doc.magic)));
    }
    let expected = u64::from(doc.width) * u64::from(doc.height);
    if doc.pixels.len() as u64 != expected {
        return Err(DocumentError::InvalidFormat(format!(
            "{}x{} document carries {} pixels",
            doc.width,
            doc.height,
            doc.pixels.len()
        )));
    }
    let mut canvas = Canvas::new(doc.width, doc.height, doc.background);
    canvas
        .set_all_pixels(&doc.pixels)
        .map_err(|e| DocumentError::InvalidFormat(e.to_string()))?;
    Ok(canvas)
}

/// True for paths carrying the native document extension.
pub fn is_document_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// Open either a native document or any decodable image.
pub fn open_path(path: &Path, background: ColorData) -> Result<Canvas, DocumentError> {
    if is_document_path(path) {
        load_document(path)
    } else {
        Ok(load_canvas(path, background)?)
    }
}

/// Save as a native document or an encoded image, by extension.
pub fn save_path(canvas: &Canvas, path: &Path) -> Result<(), DocumentError> {
    if is_document_path(path) {
        save_document(canvas, path)
    } else {
        Ok(save_canvas(canvas, path)?)
    }
}
