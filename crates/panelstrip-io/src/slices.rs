//! Cutting an image file into numbered slice files.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use panelstrip_pipeline::{
    Dimensions, OutputFormat, RgbaImage, SliceParams, band_file_name, bands, crop_band,
    decode_rgba, encode, slice_count,
};

use crate::error::{IoError, read_file};

/// Slices are always written as PNG.
pub const SLICE_FORMAT: OutputFormat = OutputFormat::Png;

/// Name of the directory slices go to by default, next to the input.
pub const DEFAULT_SLICE_DIR: &str = "slices";

/// Outcome of a successful slicing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceReport {
    /// Size of the sliced image.
    pub source: Dimensions,
    /// Files written, in band order.
    pub written: Vec<PathBuf>,
    /// Height of the final band, or `None` if nothing was written.
    pub last_height: Option<u32>,
}

/// `<input dir>/slices`.
#[must_use]
pub fn default_slice_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(DEFAULT_SLICE_DIR)
}

/// Remove regular files in `dir` whose extension matches `extension`
/// (case-insensitively). Subdirectories and other files are left alone.
///
/// Returns the number of files removed.
///
/// # Errors
///
/// [`IoError::Io`] if the directory cannot be listed or a file cannot be
/// removed.
pub fn clean_slices(dir: &Path, extension: &str) -> Result<usize, IoError> {
    let entries = std::fs::read_dir(dir).map_err(|e| IoError::io("list", dir, e))?;
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| IoError::io("list", dir, e))?;
        let path = entry.path();
        let is_file = entry
            .file_type()
            .map_err(|e| IoError::io("inspect", &path, e))?
            .is_file();
        let matches = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if is_file && matches {
            std::fs::remove_file(&path).map_err(|e| IoError::io("remove", &path, e))?;
            tracing::debug!(file = %path.display(), "removed old slice");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write the bands of `image` into `out_dir` as `001.png`, `002.png`, ...
///
/// `out_dir` must already exist.
///
/// # Errors
///
/// Encoding failures or [`IoError::Io`] if a slice cannot be written.
pub fn write_slices(
    image: &RgbaImage,
    out_dir: &Path,
    params: SliceParams,
) -> Result<SliceReport, IoError> {
    let source = Dimensions::of(image);
    let total = slice_count(source.height, params);
    tracing::info!(
        "Input size: {source}, slice height: {}, overlap: {}, step: {}",
        params.slice_height(),
        params.overlap(),
        params.step()
    );
    tracing::info!("Planned slices: {total} -> {}", out_dir.display());

    let mut written = Vec::with_capacity(total);
    let mut last_height = None;
    for band in bands(source.height, params) {
        let bytes = encode(&crop_band(image, band), SLICE_FORMAT)?;
        let path = out_dir.join(band_file_name(band.index, total, SLICE_FORMAT.extension()));
        std::fs::write(&path, bytes).map_err(|e| IoError::io("write", &path, e))?;
        tracing::debug!(
            file = %path.display(),
            top = band.top,
            height = band.height(),
            "wrote slice"
        );
        written.push(path);
        last_height = Some(band.height());
    }

    match last_height {
        Some(h) => tracing::info!(
            "Done. Wrote {} slice(s). Last slice height = {h}px",
            written.len()
        ),
        None => tracing::info!("Done. Wrote 0 slices."),
    }

    Ok(SliceReport {
        source,
        written,
        last_height,
    })
}

/// Decode `input` and write its slices into `out_dir`, creating the
/// directory if needed.
///
/// With `clean`, existing slice files in `out_dir` are removed first. The
/// input is read and decoded before anything is removed.
///
/// # Errors
///
/// [`PipelineError::NotFound`](panelstrip_pipeline::PipelineError::NotFound)
/// if `input` is missing, decode errors, or any error from
/// [`clean_slices`] and [`write_slices`].
pub fn slice_file(
    input: &Path,
    out_dir: &Path,
    params: SliceParams,
    clean: bool,
) -> Result<SliceReport, IoError> {
    let image = decode_rgba(&read_file(input)?, input)?;
    tracing::info!("Input: {}", input.display());

    std::fs::create_dir_all(out_dir).map_err(|e| IoError::io("create directory", out_dir, e))?;
    if clean {
        let removed = clean_slices(out_dir, SLICE_FORMAT.extension())?;
        tracing::info!("Removed {removed} old slice(s) from {}", out_dir.display());
    }

    write_slices(&image, out_dir, params)
}
