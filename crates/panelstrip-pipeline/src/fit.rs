//! Aspect-aware resizing of panels and background images.
//!
//! All resampling uses Lanczos3. When shrinking, the `image` crate widens
//! the filter support by the scale factor, so the result is area-correct
//! and keeps thin comic line art free of the banding nearest-neighbor
//! would produce.
//!
//! Every function returns a new image; the source is never modified.

use std::fmt;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError, RgbaImage};

/// Resampling filter for every resize in the pipeline.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// How a placed panel is sized into its `w x h` box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Shrink to fit inside the box, preserving aspect ratio.
    #[default]
    Contain,
    /// Fill the box, preserving aspect ratio, cropping the overflow.
    Cover,
    /// Place at native size.
    None,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contain => f.write_str("contain"),
            Self::Cover => f.write_str("cover"),
            Self::None => f.write_str("none"),
        }
    }
}

/// Compute the size [`contain`] produces for `source` inside `bounds`.
///
/// Thumbnail semantics: a source that already fits is left at its own
/// size. Otherwise the tighter axis takes the bound exactly and the
/// other axis is the floor or ceiling of its exact value, whichever
/// keeps the aspect ratio closer (ties go to the floor), never below 1.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn contain_dimensions(source: Dimensions, bounds: Dimensions) -> Dimensions {
    if source.is_empty() || bounds.is_empty() {
        return source;
    }
    if bounds.width >= source.width && bounds.height >= source.height {
        return source;
    }

    let aspect = f64::from(source.width) / f64::from(source.height);
    let bound_w = f64::from(bounds.width);
    let bound_h = f64::from(bounds.height);

    if bound_w / bound_h >= aspect {
        let width = round_aspect(bound_h * aspect, |n| (aspect - n / bound_h).abs());
        Dimensions::new(width, bounds.height)
    } else {
        let height = round_aspect(bound_w / aspect, |n| {
            if n == 0.0 {
                0.0
            } else {
                (aspect - bound_w / n).abs()
            }
        });
        Dimensions::new(bounds.width, height)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_aspect(exact: f64, error: impl Fn(f64) -> f64) -> u32 {
    let floor = exact.floor();
    let ceil = exact.ceil();
    let best = if error(ceil) < error(floor) { ceil } else { floor };
    (best as u32).max(1)
}

/// Compute the intermediate scaled size [`cover`] resizes to before
/// cropping.
///
/// `scale = max(w / iw, h / ih)`; each axis is rounded half-to-even and
/// never falls below the target, so the crop always fits.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cover_dimensions(source: Dimensions, target: Dimensions) -> Dimensions {
    if source.is_empty() {
        return target;
    }
    let scale = (f64::from(target.width) / f64::from(source.width))
        .max(f64::from(target.height) / f64::from(source.height));
    let width = (f64::from(source.width) * scale).round_ties_even() as u32;
    let height = (f64::from(source.height) * scale).round_ties_even() as u32;
    Dimensions::new(width.max(target.width), height.max(target.height))
}

fn require_source(image: &RgbaImage) -> Result<Dimensions, PipelineError> {
    let dims = Dimensions::of(image);
    if dims.is_empty() {
        return Err(PipelineError::invalid_config(format!(
            "cannot resize an empty {dims} image"
        )));
    }
    Ok(dims)
}

/// Shrink `image` to fit entirely inside `width x height`.
///
/// The result may be smaller than the box on one axis; centering it is
/// the caller's job.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the box or the source
/// has a zero dimension.
pub fn contain(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, PipelineError> {
    let bounds = Dimensions::non_zero(width, height, "contain target")?;
    let source = require_source(image)?;
    let target = contain_dimensions(source, bounds);
    if target == source {
        return Ok(image.clone());
    }
    tracing::debug!(%source, %target, "contain resize");
    Ok(imageops::resize(image, target.width, target.height, RESAMPLE_FILTER))
}

/// Scale `image` to fill `width x height` and center-crop the overflow.
///
/// The result is exactly `width x height`.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the box or the source
/// has a zero dimension.
pub fn cover(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, PipelineError> {
    let target = Dimensions::non_zero(width, height, "cover target")?;
    let source = require_source(image)?;
    let scaled_dims = cover_dimensions(source, target);
    tracing::debug!(%source, scaled = %scaled_dims, %target, "cover resize");

    let scaled = if scaled_dims == source {
        image.clone()
    } else {
        imageops::resize(image, scaled_dims.width, scaled_dims.height, RESAMPLE_FILTER)
    };

    let left = (scaled_dims.width - target.width) / 2;
    let top = (scaled_dims.height - target.height) / 2;
    Ok(imageops::crop_imm(&scaled, left, top, target.width, target.height).to_image())
}

/// Resize `image` to exactly `width x height`, ignoring aspect ratio.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the box or the source
/// has a zero dimension.
pub fn stretch(image: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, PipelineError> {
    let target = Dimensions::non_zero(width, height, "stretch target")?;
    let source = require_source(image)?;
    if target == source {
        return Ok(image.clone());
    }
    Ok(imageops::resize(image, target.width, target.height, RESAMPLE_FILTER))
}

/// Apply a panel [`Fit`] policy, consuming the decoded image.
///
/// [`Fit::None`] hands the image back untouched.
///
/// # Errors
///
/// Propagates the errors of [`contain`] and [`cover`].
pub fn apply(image: RgbaImage, fit: Fit, width: u32, height: u32) -> Result<RgbaImage, PipelineError> {
    match fit {
        Fit::Contain => contain(&image, width, height),
        Fit::Cover => cover(&image, width, height),
        Fit::None => Ok(image),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]))
    }

    #[test]
    fn default_fit_is_contain() {
        assert_eq!(Fit::default(), Fit::Contain);
    }

    #[test]
    fn fit_deserializes_lowercase() {
        let fits: Vec<Fit> = serde_json::from_str(r#"["contain","cover","none"]"#).unwrap();
        assert_eq!(fits, vec![Fit::Contain, Fit::Cover, Fit::None]);
        assert!(serde_json::from_str::<Fit>(r#""fill""#).is_err());
    }

    #[test]
    fn contain_landscape_into_square() {
        let out = contain(&solid(1000, 500), 400, 400).unwrap();
        assert_eq!(out.dimensions(), (400, 200));
    }

    #[test]
    fn contain_portrait_into_wide_box() {
        let out = contain(&solid(600, 1200), 700, 500).unwrap();
        assert_eq!(out.dimensions(), (250, 500));
    }

    #[test]
    fn contain_never_enlarges() {
        let out = contain(&solid(100, 80), 400, 400).unwrap();
        assert_eq!(out.dimensions(), (100, 80));
    }

    #[test]
    fn contain_shrinks_when_only_one_axis_overflows() {
        // Width already fits, height does not.
        let out = contain(&solid(300, 1000), 400, 500).unwrap();
        assert_eq!(out.dimensions(), (150, 500));
    }

    #[test]
    fn contain_picks_closest_rounding() {
        // 1000x333 into 100x100: exact height 33.3 -> 33.
        assert_eq!(
            contain_dimensions(Dimensions::new(1000, 333), Dimensions::new(100, 100)),
            Dimensions::new(100, 33)
        );
        // 3x2 into 2x2: exact height 1.333 -> 1.
        assert_eq!(
            contain_dimensions(Dimensions::new(3, 2), Dimensions::new(2, 2)),
            Dimensions::new(2, 1)
        );
        // 2x3 into 2x2: exact width 1.333 -> 1.
        assert_eq!(
            contain_dimensions(Dimensions::new(2, 3), Dimensions::new(2, 2)),
            Dimensions::new(1, 2)
        );
    }

    #[test]
    fn contain_never_collapses_to_zero() {
        assert_eq!(
            contain_dimensions(Dimensions::new(5000, 2), Dimensions::new(100, 100)),
            Dimensions::new(100, 1)
        );
    }

    #[test]
    fn contain_stays_within_bounds_and_keeps_aspect() {
        let sources = [(1, 1), (7, 3), (640, 480), (800, 2500), (33, 1000), (1920, 1080)];
        let boxes = [(1, 1), (10, 10), (300, 200), (200, 300), (1200, 1), (1, 1200)];
        for &(iw, ih) in &sources {
            for &(w, h) in &boxes {
                let src = Dimensions::new(iw, ih);
                let out = contain_dimensions(src, Dimensions::new(w, h));
                assert!(out.width <= w && out.height <= h, "{src} in {w}x{h} -> {out}");
                assert!(out.width >= 1 && out.height >= 1);
                // Rounding moves each axis by under one pixel.
                let expected_h = f64::from(out.width) * f64::from(ih) / f64::from(iw);
                let expected_w = f64::from(out.height) * f64::from(iw) / f64::from(ih);
                assert!(
                    (f64::from(out.height) - expected_h).abs() < 1.0
                        || (f64::from(out.width) - expected_w).abs() < 1.0,
                    "{src} in {w}x{h} -> {out} lost its aspect ratio"
                );
            }
        }
    }

    #[test]
    fn cover_is_exact_target() {
        let sources = [(1, 1), (7, 3), (64, 48), (80, 250), (33, 1000)];
        let targets = [(1, 1), (10, 10), (30, 20), (20, 30), (120, 5)];
        for &(iw, ih) in &sources {
            for &(w, h) in &targets {
                let out = cover(&solid(iw, ih), w, h).unwrap();
                assert_eq!(out.dimensions(), (w, h), "{iw}x{ih} cover {w}x{h}");
            }
        }
    }

    #[test]
    fn cover_scaled_dimensions() {
        // 1000x500 into 400x400: scale 0.8 -> 800x400, crop 200 from the left.
        assert_eq!(
            cover_dimensions(Dimensions::new(1000, 500), Dimensions::new(400, 400)),
            Dimensions::new(800, 400)
        );
    }

    #[test]
    fn cover_crops_from_the_center() {
        // Left third red, middle third green, right third blue.
        let src = RgbaImage::from_fn(300, 100, |x, _| match x {
            0..100 => Rgba([255, 0, 0, 255]),
            100..200 => Rgba([0, 255, 0, 255]),
            _ => Rgba([0, 0, 255, 255]),
        });
        // Same height, so no resampling: a pure center crop of 100 columns.
        let out = cover(&src, 100, 100).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert!(out.pixels().all(|p| *p == Rgba([0, 255, 0, 255])));
    }

    #[test]
    fn stretch_ignores_aspect() {
        let out = stretch(&solid(100, 100), 300, 20).unwrap();
        assert_eq!(out.dimensions(), (300, 20));
    }

    #[test]
    fn zero_target_is_rejected() {
        let img = solid(10, 10);
        assert!(matches!(contain(&img, 0, 10), Err(PipelineError::InvalidConfig(_))));
        assert!(matches!(cover(&img, 10, 0), Err(PipelineError::InvalidConfig(_))));
        assert!(matches!(stretch(&img, 0, 0), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn apply_none_passes_through() {
        let img = solid(37, 11);
        let out = apply(img.clone(), Fit::None, 5, 5).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn apply_dispatches_cover_and_contain() {
        let img = solid(200, 100);
        assert_eq!(
            apply(img.clone(), Fit::Cover, 50, 50).unwrap().dimensions(),
            (50, 50)
        );
        assert_eq!(
            apply(img, Fit::Contain, 50, 50).unwrap().dimensions(),
            (50, 25)
        );
    }
}
