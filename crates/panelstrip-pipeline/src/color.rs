//! Color parsing for solid backgrounds.
//!
//! Accepts anything CSS accepts: named colors (`white`, `rebeccapurple`),
//! hex with optional alpha (`#fff`, `#ffff`, `#ffffff`, `#ffffff80`) and
//! functional notation (`rgb(...)`, `hsl(...)`).

use image::Rgba;

use crate::types::PipelineError;

/// Background color used when a solid background names no color.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Parse a color string into straight (non-premultiplied) RGBA8.
///
/// Colors without an alpha component are fully opaque.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the string is not a
/// recognizable color.
pub fn parse_color(spec: &str) -> Result<Rgba<u8>, PipelineError> {
    let color = csscolorparser::parse(spec.trim())
        .map_err(|e| PipelineError::invalid_config(format!("invalid color '{spec}': {e}")))?;
    Ok(Rgba(color.to_rgba8()))
}
