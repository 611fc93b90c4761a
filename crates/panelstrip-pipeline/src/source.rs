//! Where decoded images come from.
//!
//! The pipeline never touches the filesystem itself. Every image a
//! layout references is requested through an [`ImageSource`], so the
//! same compositing code runs against disk (`panelstrip-io`) or against
//! images already held in memory ([`MemorySource`]).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::{PipelineError, RgbaImage};

/// Resolves a layout path to a freshly decoded RGBA image.
///
/// Each call returns an owned image; callers drop it as soon as it has
/// been composited. Implementations must not cache across calls on the
/// caller's behalf.
pub trait ImageSource {
    /// Load and decode the image at `path`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::NotFound`] if nothing exists at `path`,
    /// [`PipelineError::ImageDecode`] or [`PipelineError::EmptyInput`]
    /// if it is not a usable image.
    fn load(&self, path: &Path) -> Result<RgbaImage, PipelineError>;
}

impl<S: ImageSource + ?Sized> ImageSource for &S {
    fn load(&self, path: &Path) -> Result<RgbaImage, PipelineError> {
        (**self).load(path)
    }
}

/// An [`ImageSource`] over images already decoded in memory.
///
/// Each [`load`](ImageSource::load) hands out a copy.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    images: HashMap<PathBuf, RgbaImage>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<PathBuf>, image: RgbaImage) {
        self.images.insert(path.into(), image);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, image: RgbaImage) -> Self {
        self.insert(path, image);
        self
    }
}

impl ImageSource for MemorySource {
    fn load(&self, path: &Path) -> Result<RgbaImage, PipelineError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound(path.to_path_buf()))
    }
}
