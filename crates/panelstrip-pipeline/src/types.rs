//! Shared types for the panelstrip compositing pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hold canvases and
/// panels without depending on `image` directly.
pub use image::RgbaImage;

/// Re-export `Rgba` for solid colors.
pub use image::Rgba;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions without validation.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Create dimensions, rejecting a zero width or height.
    ///
    /// `what` names the thing being sized and appears in the error.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if either axis is zero.
    pub fn non_zero(width: u32, height: u32, what: &str) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::invalid_config(format!(
                "{what} dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self::new(width, height))
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors that can occur while composing or slicing.
///
/// Every error aborts the current run. The variants map onto three
/// kinds an operator cares about: the configuration is wrong
/// ([`InvalidConfig`](Self::InvalidConfig)), a referenced file is
/// missing ([`NotFound`](Self::NotFound)), or a file exists but is not
/// a usable image ([`ImageDecode`](Self::ImageDecode),
/// [`EmptyInput`](Self::EmptyInput)).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Layout or slicing configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A referenced image or layout file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A referenced file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid or supported image.
    #[error("failed to decode image {}: {source}", path.display())]
    ImageDecode {
        /// The offending file.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The image data was empty.
    #[error("image data is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    /// Encoding an output image failed.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),
}

impl PipelineError {
    /// Shorthand for [`PipelineError::InvalidConfig`].
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
