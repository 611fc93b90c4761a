//! Loading a layout file and writing the finished canvas.

use std::path::{Path, PathBuf};

use panelstrip_pipeline::{
    Dimensions, ImageSource, Layout, OutputFormat, PipelineError, compose, encode,
};

use crate::error::{IoError, read_file};
use crate::source::FsSource;

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Where the canvas was written.
    pub output: PathBuf,
    /// Size of the written canvas.
    pub dimensions: Dimensions,
    /// Number of panels placed.
    pub panels: usize,
}

/// Read and parse a layout document.
///
/// Paths inside the layout are left as written; call
/// [`Layout::resolve_paths`] to anchor them.
///
/// # Errors
///
/// [`PipelineError::NotFound`] if the file is missing, or
/// [`PipelineError::InvalidConfig`] (prefixed with the file name) if it
/// is not a valid layout.
pub fn load_layout(path: &Path) -> Result<Layout, IoError> {
    let bytes = read_file(path)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        PipelineError::invalid_config(format!("{}: not UTF-8: {e}", path.display()))
    })?;
    let layout = Layout::from_json(&text).map_err(|e| match e {
        PipelineError::InvalidConfig(msg) => {
            PipelineError::InvalidConfig(format!("{}: {msg}", path.display()))
        }
        other => other,
    })?;
    tracing::debug!(
        file = %path.display(),
        canvas = %layout.canvas,
        items = layout.items.len(),
        "loaded layout"
    );
    Ok(layout)
}

/// Compose `layout` with panels from `source` and write it to `output`.
///
/// The output format follows the file extension. Missing parent
/// directories are created.
///
/// # Errors
///
/// Any pipeline error from composing or encoding, or [`IoError::Io`] if
/// the output cannot be written.
pub fn build(
    layout: &Layout,
    source: &impl ImageSource,
    output: &Path,
) -> Result<BuildReport, IoError> {
    let format = OutputFormat::from_path(output)?;
    let canvas = compose(layout, source)?;
    let dimensions = Dimensions::of(&canvas);
    let bytes = encode(&canvas, format)?;
    drop(canvas);

    write_creating_parents(output, &bytes)?;
    tracing::info!("Saved: {} ({dimensions})", output.display());

    Ok(BuildReport {
        output: output.to_path_buf(),
        dimensions,
        panels: layout.items.len(),
    })
}

/// Load `layout_path`, resolve its paths against `root` and build it from
/// disk.
///
/// `output` overrides the layout's export file when given; it is used
/// as-is rather than resolved against `root`.
///
/// # Errors
///
/// Everything [`load_layout`] and [`build`] can return.
pub fn build_layout_file(
    layout_path: &Path,
    root: &Path,
    output: Option<&Path>,
) -> Result<BuildReport, IoError> {
    let layout = load_layout(layout_path)?.resolve_paths(root);
    let output = output.map_or_else(|| layout.export_file.clone(), Path::to_path_buf);
    build(&layout, &FsSource, &output)
}

pub(crate) fn write_creating_parents(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IoError::io("create directory", parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| IoError::io("write", path, e))
}
