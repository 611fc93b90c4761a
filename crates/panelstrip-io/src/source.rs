//! Disk-backed [`ImageSource`].

use std::path::Path;

use panelstrip_pipeline::{ImageSource, PipelineError, RgbaImage, decode_rgba};

use crate::error::read_file;

/// Reads and decodes images straight from the filesystem.
///
/// Paths are used as given; resolve relative layout paths first with
/// [`Layout::resolve_paths`](panelstrip_pipeline::Layout::resolve_paths).
/// Nothing is cached, so each panel's bytes and pixels are freed as soon
/// as the caller is done with them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ImageSource for FsSource {
    fn load(&self, path: &Path) -> Result<RgbaImage, PipelineError> {
        let bytes = read_file(path)?;
        let image = decode_rgba(&bytes, path)?;
        tracing::debug!(
            file = %path.display(),
            bytes = bytes.len(),
            width = image.width(),
            height = image.height(),
            "decoded image"
        );
        Ok(image)
    }
}
