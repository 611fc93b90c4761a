//! Background synthesis: the canvas-sized base layer every panel is
//! composited onto.

use std::fmt;
use std::path::{Path, PathBuf};

use image::imageops;
use serde::{Deserialize, Serialize};

use crate::fit;
use crate::source::ImageSource;
use crate::types::{Dimensions, PipelineError, Rgba, RgbaImage};

/// How a background image is sized to the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Fill the canvas, cropping overflow. No transparent bars.
    #[default]
    Cover,
    /// Fit inside the canvas, centered, with transparent bars.
    Contain,
    /// Resize to the canvas exactly, distorting if needed.
    Stretch,
}

impl fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cover => f.write_str("cover"),
            Self::Contain => f.write_str("contain"),
            Self::Stretch => f.write_str("stretch"),
        }
    }
}

/// The single background variant active for a build.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSpec {
    /// Uniform fill.
    Solid {
        /// Straight RGBA fill color.
        color: Rgba<u8>,
    },
    /// One image sized to the canvas.
    Image {
        /// Image to load.
        file: PathBuf,
        /// Sizing policy.
        mode: BackgroundMode,
    },
    /// A tile repeated from the origin.
    Pattern {
        /// Tile image to load.
        file: PathBuf,
        /// Pre-scale factor applied to the tile.
        scale: f64,
    },
}

impl BackgroundSpec {
    /// Opaque white, used when a layout has no background section.
    pub const DEFAULT: Self = Self::Solid {
        color: Rgba([255, 255, 255, 255]),
    };

    /// Pattern tiles are used at their native size unless scaled.
    pub const DEFAULT_PATTERN_SCALE: f64 = 1.0;

    /// Check values that can be rejected without decoding anything.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for a pattern scale
    /// that is not a finite positive number.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if let Self::Pattern { scale, .. } = self {
            check_pattern_scale(*scale)?;
        }
        Ok(())
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_pattern_scale(scale: f64) -> Result<(), PipelineError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(PipelineError::invalid_config(format!(
            "pattern scale must be a positive number, got {scale}"
        )));
    }
    Ok(())
}

/// Build the canvas-sized RGBA base layer.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a zero canvas or a bad
/// pattern scale, and propagates load errors from `source`.
pub fn synthesize<S: ImageSource + ?Sized>(
    spec: &BackgroundSpec,
    canvas: Dimensions,
    source: &S,
) -> Result<RgbaImage, PipelineError> {
    let canvas = Dimensions::non_zero(canvas.width, canvas.height, "canvas")?;
    match spec {
        BackgroundSpec::Solid { color } => {
            tracing::debug!(?color, %canvas, "solid background");
            Ok(RgbaImage::from_pixel(canvas.width, canvas.height, *color))
        }
        BackgroundSpec::Image { file, mode } => {
            tracing::debug!(file = %file.display(), %mode, %canvas, "image background");
            let img = source.load(file)?;
            image_background(&img, *mode, canvas)
        }
        BackgroundSpec::Pattern { file, scale } => {
            check_pattern_scale(*scale)?;
            tracing::debug!(file = %file.display(), scale, %canvas, "pattern background");
            let tile = source.load(file)?;
            let tile = scale_tile(tile, *scale, file)?;
            Ok(tile_canvas(&tile, canvas))
        }
    }
}

/// Size a decoded background image to the canvas.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the image or canvas is
/// empty.
pub fn image_background(
    img: &RgbaImage,
    mode: BackgroundMode,
    canvas: Dimensions,
) -> Result<RgbaImage, PipelineError> {
    match mode {
        BackgroundMode::Stretch => fit::stretch(img, canvas.width, canvas.height),
        BackgroundMode::Cover => fit::cover(img, canvas.width, canvas.height),
        BackgroundMode::Contain => {
            let placed = fit::contain(img, canvas.width, canvas.height)?;
            let mut out = RgbaImage::new(canvas.width, canvas.height);
            let x = (canvas.width - placed.width()) / 2;
            let y = (canvas.height - placed.height()) / 2;
            imageops::replace(&mut out, &placed, i64::from(x), i64::from(y));
            Ok(out)
        }
    }
}

/// Apply the pattern pre-scale. A scale of exactly 1 keeps the tile
/// untouched; otherwise each axis is rounded and kept at least 1px.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a non-positive scale or
/// an empty tile.
#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn scale_tile(tile: RgbaImage, scale: f64, file: &Path) -> Result<RgbaImage, PipelineError> {
    check_pattern_scale(scale)?;
    if Dimensions::of(&tile).is_empty() {
        return Err(PipelineError::invalid_config(format!(
            "pattern tile {} has no pixels",
            file.display()
        )));
    }
    if scale == BackgroundSpec::DEFAULT_PATTERN_SCALE {
        return Ok(tile);
    }
    let tw = ((f64::from(tile.width()) * scale).round_ties_even() as u32).max(1);
    let th = ((f64::from(tile.height()) * scale).round_ties_even() as u32).max(1);
    Ok(imageops::resize(&tile, tw, th, fit::RESAMPLE_FILTER))
}

/// Top-left corners of every tile needed to cover `canvas`, row by row.
///
/// Yields `ceil(W / tw) * ceil(H / th)` positions. An empty tile yields
/// nothing.
pub fn tile_origins(canvas: Dimensions, tile: Dimensions) -> impl Iterator<Item = (u32, u32)> {
    let step_x = tile.width.max(1) as usize;
    let step_y = tile.height.max(1) as usize;
    let rows = if tile.is_empty() { 0 } else { canvas.height };
    (0..rows)
        .step_by(step_y)
        .flat_map(move |y| (0..canvas.width).step_by(step_x).map(move |x| (x, y)))
}

/// Repeat `tile` across a transparent canvas. Tiles are copied, not
/// blended, and clipped at the right and bottom edges.
#[must_use]
pub fn tile_canvas(tile: &RgbaImage, canvas: Dimensions) -> RgbaImage {
    let mut out = RgbaImage::new(canvas.width, canvas.height);
    for (x, y) in tile_origins(canvas, Dimensions::of(tile)) {
        imageops::replace(&mut out, tile, i64::from(x), i64::from(y));
    }
    out
}
