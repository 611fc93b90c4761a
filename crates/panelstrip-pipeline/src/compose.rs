//! The compositor: background first, then every placement item in
//! order, alpha-blended onto one canvas.

use std::path::Path;

use crate::background;
use crate::fit;
use crate::layout::{Defaults, Layout, PlacementItem, Sizing};
use crate::source::ImageSource;
use crate::types::{PipelineError, Rgba, RgbaImage};

/// Panel file extensions the compositor accepts (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Reject a panel whose extension is not in [`SUPPORTED_EXTENSIONS`].
///
/// The comparison is case-insensitive.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] naming `path`.
pub fn check_extension(path: &Path) -> Result<(), PipelineError> {
    let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        });
    if supported {
        Ok(())
    } else {
        Err(PipelineError::invalid_config(format!(
            "unsupported file type: {} (expected one of: {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        )))
    }
}

/// Straight-alpha source-over of one pixel.
///
/// An opaque `src` replaces `dst` exactly and a fully transparent `src`
/// leaves it untouched.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    // Everything below is scaled by 255 to stay in integers.
    let dst_weight = u32::from(dst[3]) * (255 - sa);
    let src_weight = sa * 255;
    let alpha = src_weight + dst_weight;
    if alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let num = u32::from(src[c]) * src_weight + u32::from(dst[c]) * dst_weight;
        out[c] = ((num + alpha / 2) / alpha) as u8;
    }
    out[3] = ((alpha + 127) / 255) as u8;
    Rgba(out)
}

/// Alpha-blend `panel` onto `canvas` with its top-left corner at
/// `(x, y)`.
///
/// Pixels falling outside the canvas, including at negative offsets,
/// are clipped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend_at(canvas: &mut RgbaImage, panel: &RgbaImage, x: i64, y: i64) {
    let left = x.max(0);
    let top = y.max(0);
    let right = x
        .saturating_add(i64::from(panel.width()))
        .min(i64::from(canvas.width()));
    let bottom = y
        .saturating_add(i64::from(panel.height()))
        .min(i64::from(canvas.height()));
    if left >= right || top >= bottom {
        return;
    }

    for cy in top..bottom {
        for cx in left..right {
            let src = *panel.get_pixel((cx - x) as u32, (cy - y) as u32);
            let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
            *dst = over(*dst, src);
        }
    }
}

/// Load, size and composite one item onto `canvas`.
///
/// The decoded panel is dropped before this returns.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for an unsupported
/// extension, and propagates load and fit errors.
pub fn place<S: ImageSource + ?Sized>(
    canvas: &mut RgbaImage,
    item: &PlacementItem,
    defaults: &Defaults,
    source: &S,
) -> Result<(), PipelineError> {
    check_extension(&item.file)?;
    let decoded = source.load(&item.file)?;
    let panel = match item.sizing(defaults) {
        Sizing::Native => decoded,
        Sizing::Fitted { target, fit } => fit::apply(decoded, fit, target.width, target.height)?,
    };
    tracing::debug!(
        file = %item.file.display(),
        x = item.x,
        y = item.y,
        width = panel.width(),
        height = panel.height(),
        "placing panel"
    );
    blend_at(canvas, &panel, item.x, item.y);
    Ok(())
}

/// Compose a full layout into a finished canvas.
///
/// The layout is validated before any image is loaded, so a bad
/// extension or canvas size fails without decoding anything. Items are
/// drawn in the order given; later items cover earlier ones.
///
/// # Errors
///
/// Returns the first error from validation, background synthesis or any
/// placement. No partial canvas is returned.
pub fn compose<S: ImageSource + ?Sized>(
    layout: &Layout,
    source: &S,
) -> Result<RgbaImage, PipelineError> {
    layout.validate()?;

    let mut canvas = background::synthesize(&layout.background, layout.canvas, source)?;
    for item in &layout.items {
        place(&mut canvas, item, &layout.defaults, source)?;
    }

    tracing::debug!(
        canvas = %layout.canvas,
        items = layout.items.len(),
        "composition finished"
    );
    Ok(canvas)
}
