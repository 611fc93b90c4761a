//! Errors raised by the filesystem layer.

use std::path::{Path, PathBuf};

use panelstrip_pipeline::PipelineError;

/// Errors that can occur while reading layouts and images or writing
/// outputs.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Configuration, missing-file or decode failure from the pipeline.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A filesystem operation on an output path failed.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// What was being attempted (`"write"`, `"remove"`, ...).
        action: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a whole file, reporting a missing file as
/// [`PipelineError::NotFound`].
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, PipelineError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            PipelineError::NotFound(path.to_path_buf())
        } else {
            PipelineError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
