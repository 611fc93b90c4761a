//! Image decoding to RGBA and encoding of finished canvases and bands.
//!
//! Decoding accepts raw bytes (PNG, JPEG, WebP) and always yields an
//! 8-bit RGBA buffer so every later stage can alpha-composite without
//! caring about the source color type.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::types::{PipelineError, RgbaImage};

/// Decode raw image bytes and convert to RGBA8.
///
/// `origin` is only used to label errors; no file is touched.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the data is not a
/// recognizable image.
pub fn decode_rgba(bytes: &[u8], origin: &Path) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput(origin.to_path_buf()));
    }

    let img = image::load_from_memory(bytes).map_err(|source| PipelineError::ImageDecode {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Raster formats the build can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    Png,
    /// JPEG; alpha is dropped.
    Jpeg,
    /// Lossless WebP with alpha.
    WebP,
}

impl OutputFormat {
    /// JPEG quality used for exported canvases.
    pub const JPEG_QUALITY: u8 = 90;

    /// Infer the format from a file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when the extension is
    /// missing or not one of `png`, `jpg`, `jpeg`, `webp`.
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("jpg" | "jpeg") => Ok(Self::Jpeg),
            Some("webp") => Ok(Self::WebP),
            _ => Err(PipelineError::invalid_config(format!(
                "unsupported output file type: {}",
                path.display()
            ))),
        }
    }

    /// Canonical file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }
}

/// Encode an RGBA image into the given format.
///
/// # Errors
///
/// Returns [`PipelineError::ImageEncode`] if the encoder rejects the
/// image (e.g. dimensions beyond the format's limits).
pub fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    let (w, h) = image.dimensions();
    match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut buf).write_image(image.as_raw(), w, h, ExtendedColorType::Rgba8)
        }
        OutputFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, OutputFormat::JPEG_QUALITY).write_image(
                rgb.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::WebP => WebPEncoder::new_lossless(&mut buf).write_image(
            image.as_raw(),
            w,
            h,
            ExtendedColorType::Rgba8,
        ),
    }
    .map_err(PipelineError::ImageEncode)?;
    Ok(buf)
}
