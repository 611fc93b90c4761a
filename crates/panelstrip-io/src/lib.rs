//! panelstrip-io: Filesystem layer for the panelstrip pipeline.
//!
//! Reads layout documents and panel images from disk, writes the
//! composed canvas, and writes slice files. All pixel work is delegated
//! to `panelstrip-pipeline`.

pub mod error;
pub mod export;
pub mod slices;
pub mod source;

pub use error::IoError;
pub use export::{BuildReport, build, build_layout_file, load_layout};
pub use slices::{
    DEFAULT_SLICE_DIR, SLICE_FORMAT, SliceReport, clean_slices, default_slice_dir, slice_file,
    write_slices,
};
pub use source::FsSource;
