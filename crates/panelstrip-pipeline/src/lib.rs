//! panelstrip-pipeline: Pure compositing and slicing core (sans-IO).
//!
//! Builds a tall webcomic canvas from a [`Layout`]:
//! background -> panels (each optionally fitted) -> finished canvas,
//! and plans the horizontal [`Band`]s a finished strip is cut into.
//!
//! This crate has **no I/O dependencies** -- images arrive through an
//! [`ImageSource`] and leave as in-memory buffers or encoded bytes. All
//! filesystem interaction lives in `panelstrip-io`.

pub mod background;
pub mod codec;
pub mod color;
pub mod compose;
pub mod fit;
pub mod layout;
pub mod slice;
pub mod source;
pub mod types;

pub use background::{BackgroundMode, BackgroundSpec};
pub use codec::{OutputFormat, decode_rgba, encode};
pub use compose::{SUPPORTED_EXTENSIONS, compose};
pub use fit::Fit;
pub use layout::{Defaults, Layout, LayoutFile, PlacementItem, Sizing};
pub use slice::{Band, SliceParams, band_file_name, bands, crop_band, slice_count};
pub use source::{ImageSource, MemorySource};
pub use types::{Dimensions, PipelineError, Rgba, RgbaImage};
