//! Cover resize and re-encode.
//!
//! The source is scaled uniformly by `max(tw / sw, th / sh)` so both sides
//! meet or exceed the target, centered, and cropped to exactly `tw x th`.
//! PNG sources stay PNG; everything else (including rasterised SVG) is
//! re-encoded as baseline JPEG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};

/// Largest intermediate surface we are willing to allocate, in pixels.
const MAX_SURFACE_PIXELS: u64 = 200_000_000;

/// Error while decoding, drawing or encoding an image.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The source bytes are not a decodable image.
    #[error("failed to load image: {0}")]
    Decode(String),

    /// The render surface could not be allocated.
    #[error("could not allocate a {width}x{height} render surface")]
    Surface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Encoding the output failed.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Target width or height is zero.
    #[error("invalid target size {width}x{height}")]
    InvalidTarget {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless, used only for PNG sources.
    Png,
    /// Lossy baseline.
    Jpeg,
}

impl OutputFormat {
    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Placement of the scaled source inside the target box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverGeometry {
    /// Uniform scale factor applied to the source.
    pub scale: f64,
    /// Scaled source width.
    pub scaled_width: f64,
    /// Scaled source height.
    pub scaled_height: f64,
    /// Left edge of the scaled source relative to the target (<= 0).
    pub offset_x: f64,
    /// Top edge of the scaled source relative to the target (<= 0).
    pub offset_y: f64,
}

impl CoverGeometry {
    /// Computes cover placement of a `sw x sh` source in a `tw x th` box.
    pub fn compute(sw: f64, sh: f64, tw: u32, th: u32) -> Self {
        let (tw, th) = (f64::from(tw), f64::from(th));
        let scale = (tw / sw).max(th / sh);
        let scaled_width = sw * scale;
        let scaled_height = sh * scale;
        Self {
            scale,
            scaled_width,
            scaled_height,
            offset_x: (tw - scaled_width) / 2.0,
            offset_y: (th - scaled_height) / 2.0,
        }
    }

    /// Integer scaled size, never smaller than the target.
    fn pixel_size(&self, tw: u32, th: u32) -> (u32, u32) {
        (
            (self.scaled_width.round() as u32).max(tw),
            (self.scaled_height.round() as u32).max(th),
        )
    }
}

/// Result of a transform.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Encoded bytes.
    pub data: Vec<u8>,
    /// Encoding of `data`.
    pub format: OutputFormat,
    /// Output width (always the target width).
    pub width: u32,
    /// Output height (always the target height).
    pub height: u32,
    /// Placement that was applied.
    pub geometry: CoverGeometry,
}

impl Transformed {
    /// Encoded size in kilobytes.
    pub fn size_kb(&self) -> f64 {
        self.data.len() as f64 / 1024.0
    }
}

/// Returns true iff the file name's extension (case-insensitive) is allowed.
///
/// Advisory string matching only; the content is not sniffed. A name with
/// no text before its only dot (`.png`) has no extension and is rejected.
pub fn validate_format(filename: &str, allowed: &[&str]) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Scales `data` to cover exactly `target_width x target_height`.
///
/// # Arguments
/// * `data` - Encoded source image (JPEG, PNG, WebP or SVG)
/// * `target_width`, `target_height` - Output size in pixels
/// * `quality` - Lossy quality factor in (0, 1]
pub fn resize_cover(
    data: &[u8],
    target_width: u32,
    target_height: u32,
    quality: f32,
) -> Result<Transformed, TransformError> {
    if target_width == 0 || target_height == 0 {
        return Err(TransformError::InvalidTarget {
            width: target_width,
            height: target_height,
        });
    }

    let (image, geometry, format) = match image::guess_format(data) {
        Ok(source_format) => {
            let (image, geometry) = draw_raster(data, target_width, target_height)?;
            let format = if source_format == ImageFormat::Png {
                OutputFormat::Png
            } else {
                OutputFormat::Jpeg
            };
            (image, geometry, format)
        }
        Err(_) if looks_like_svg(data) => {
            let (image, geometry) = draw_svg(data, target_width, target_height)?;
            (image, geometry, OutputFormat::Jpeg)
        }
        Err(e) => return Err(TransformError::Decode(e.to_string())),
    };

    let data = encode(&image, format, quality)?;
    Ok(Transformed {
        data,
        format,
        width: target_width,
        height: target_height,
        geometry,
    })
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    String::from_utf8_lossy(head).contains("<svg")
}

fn draw_raster(
    data: &[u8],
    tw: u32,
    th: u32,
) -> Result<(DynamicImage, CoverGeometry), TransformError> {
    let source = image::load_from_memory(data).map_err(|e| TransformError::Decode(e.to_string()))?;
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 {
        return Err(TransformError::Decode("image has no pixels".to_string()));
    }

    let geometry = CoverGeometry::compute(f64::from(sw), f64::from(sh), tw, th);
    let (scaled_w, scaled_h) = geometry.pixel_size(tw, th);
    if u64::from(scaled_w) * u64::from(scaled_h) > MAX_SURFACE_PIXELS {
        return Err(TransformError::Surface {
            width: scaled_w,
            height: scaled_h,
        });
    }

    let scaled = source.resize_exact(scaled_w, scaled_h, FilterType::Lanczos3);
    let crop_x = (scaled_w - tw) / 2;
    let crop_y = (scaled_h - th) / 2;
    Ok((scaled.crop_imm(crop_x, crop_y, tw, th), geometry))
}

fn draw_svg(data: &[u8], tw: u32, th: u32) -> Result<(DynamicImage, CoverGeometry), TransformError> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    let size = tree.size();

    let geometry = CoverGeometry::compute(
        f64::from(size.width()),
        f64::from(size.height()),
        tw,
        th,
    );

    let mut pixmap = tiny_skia::Pixmap::new(tw, th).ok_or(TransformError::Surface {
        width: tw,
        height: th,
    })?;
    let transform = tiny_skia::Transform::from_row(
        geometry.scale as f32,
        0.0,
        0.0,
        geometry.scale as f32,
        geometry.offset_x as f32,
        geometry.offset_y as f32,
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity((tw * th * 4) as usize);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let image = RgbaImage::from_raw(tw, th, rgba).ok_or(TransformError::Surface {
        width: tw,
        height: th,
    })?;

    Ok((DynamicImage::ImageRgba8(image), geometry))
}

fn encode(image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>, TransformError> {
    let mut out = Vec::new();
    let result = match format {
        OutputFormat::Png => image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png),
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
        }
    };
    result.map_err(|e| TransformError::Encode(e.to_string()))?;
    Ok(out)
}
