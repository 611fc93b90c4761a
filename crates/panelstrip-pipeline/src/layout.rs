//! The layout description: canvas, background, panel placements, export.
//!
//! A layout arrives as JSON and is deserialized into a raw
//! [`LayoutFile`] that mirrors the document, then converted once into a
//! validated [`Layout`] with every default resolved. Nothing downstream
//! re-reads optional keys.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::background::{BackgroundMode, BackgroundSpec};
use crate::color::{DEFAULT_BACKGROUND_COLOR, parse_color};
use crate::compose::check_extension;
use crate::fit::Fit;
use crate::types::{Dimensions, PipelineError};

// ---------------------------------------------------------------------------
// Raw document
// ---------------------------------------------------------------------------

/// The layout document as written on disk.
///
/// Unknown keys are ignored. Missing sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutFile {
    /// Output canvas size.
    pub canvas: CanvasSection,
    /// Base layer; solid white when absent.
    pub background: Option<BackgroundSection>,
    /// Fallback size and fit for items.
    pub defaults: DefaultsSection,
    /// Panels, drawn in order.
    pub items: Vec<ItemSection>,
    /// Where the finished canvas is written.
    pub export: ExportSection,
}

/// `canvas` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSection {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl Default for CanvasSection {
    fn default() -> Self {
        Self {
            width: Layout::DEFAULT_CANVAS.width,
            height: Layout::DEFAULT_CANVAS.height,
        }
    }
}

/// `background` section, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackgroundSection {
    /// `{"type": "solid", "color": "#ffffff"}`
    Solid {
        /// Any CSS color string.
        #[serde(default = "default_color")]
        color: String,
    },
    /// `{"type": "image", "file": "...", "mode": "cover"}`
    Image {
        /// Background image path.
        file: PathBuf,
        /// Sizing policy.
        #[serde(default)]
        mode: BackgroundMode,
    },
    /// `{"type": "pattern", "file": "...", "scale": 1.0}`
    Pattern {
        /// Tile image path.
        file: PathBuf,
        /// Tile pre-scale factor.
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_owned()
}

const fn default_scale() -> f64 {
    BackgroundSpec::DEFAULT_PATTERN_SCALE
}

/// `defaults` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    /// Default box width; `0` counts as absent.
    pub w: Option<u32>,
    /// Default box height; `0` counts as absent.
    pub h: Option<u32>,
    /// Default fit policy.
    pub fit: Fit,
}

/// One entry of `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSection {
    /// Panel image path. Required.
    pub file: PathBuf,
    /// Left edge on the canvas; may be negative.
    #[serde(default)]
    pub x: i64,
    /// Top edge on the canvas; may be negative.
    #[serde(default)]
    pub y: i64,
    /// Box width, overriding `defaults.w`. An explicit `null` counts as
    /// absent and falls back to the default.
    #[serde(default)]
    pub w: Option<u32>,
    /// Box height, overriding `defaults.h`. `null` falls back too.
    #[serde(default)]
    pub h: Option<u32>,
    /// Fit policy, overriding `defaults.fit`.
    #[serde(default)]
    pub fit: Option<Fit>,
}

/// `export` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Output image path; the extension selects the format.
    pub file: PathBuf,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from(Layout::DEFAULT_EXPORT_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated layout
// ---------------------------------------------------------------------------

/// Build-wide fallback size and fit for placement items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Defaults {
    /// Default box width. Never `Some(0)`.
    pub width: Option<u32>,
    /// Default box height. Never `Some(0)`.
    pub height: Option<u32>,
    /// Default fit policy.
    pub fit: Fit,
}

/// A panel to composite onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementItem {
    /// Panel image path.
    pub file: PathBuf,
    /// Left edge on the canvas.
    pub x: i64,
    /// Top edge on the canvas.
    pub y: i64,
    /// Per-item box width, if given.
    pub width: Option<u32>,
    /// Per-item box height, if given.
    pub height: Option<u32>,
    /// Per-item fit, if given.
    pub fit: Option<Fit>,
}

/// How an item will actually be sized once defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Place the decoded image unchanged.
    Native,
    /// Resize into the box with the given policy.
    Fitted {
        /// Box size, both axes non-zero.
        target: Dimensions,
        /// `Contain` or `Cover`.
        fit: Fit,
    },
}

impl PlacementItem {
    /// Create an item at `(x, y)` that takes every size from the defaults.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, x: i64, y: i64) -> Self {
        Self {
            file: file.into(),
            x,
            y,
            width: None,
            height: None,
            fit: None,
        }
    }

    /// Resolve the effective sizing against build-wide `defaults`.
    ///
    /// Per-item values win over defaults. If either resolved dimension
    /// is absent or zero, or the fit is [`Fit::None`], the item is placed
    /// at native size.
    #[must_use]
    pub fn sizing(&self, defaults: &Defaults) -> Sizing {
        let width = self.width.or(defaults.width).filter(|&w| w > 0);
        let height = self.height.or(defaults.height).filter(|&h| h > 0);
        let fit = self.fit.unwrap_or(defaults.fit);
        match (width, height, fit) {
            (Some(w), Some(h), Fit::Contain | Fit::Cover) => Sizing::Fitted {
                target: Dimensions::new(w, h),
                fit,
            },
            _ => Sizing::Native,
        }
    }
}

/// A validated layout with every default resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Canvas size, both axes non-zero.
    pub canvas: Dimensions,
    /// Base layer.
    pub background: BackgroundSpec,
    /// Fallbacks for items.
    pub defaults: Defaults,
    /// Panels in drawing order.
    pub items: Vec<PlacementItem>,
    /// Output image path.
    pub export_file: PathBuf,
}

impl Layout {
    /// Canvas size when the layout names none.
    pub const DEFAULT_CANVAS: Dimensions = Dimensions::new(800, 1200);

    /// Output path when the layout names none.
    pub const DEFAULT_EXPORT_FILE: &'static str = "output/webcomic.png";

    /// Layout file read when none is given on the command line.
    pub const DEFAULT_LAYOUT_FILE: &'static str = "layout.json";

    /// Parse and validate a JSON layout document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for malformed JSON,
    /// missing required keys (`file` on items and image/pattern
    /// backgrounds, `type` on backgrounds), unknown enumerated values,
    /// and anything [`validate`](Self::validate) rejects.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let raw: LayoutFile = serde_json::from_str(json)
            .map_err(|e| PipelineError::invalid_config(format!("layout: {e}")))?;
        Self::try_from(raw)
    }

    /// Check every invariant that does not need pixels.
    ///
    /// Run before any decoding so a bad layout fails before any work.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for a zero canvas, a bad
    /// pattern scale, or an item with an unsupported file extension.
    pub fn validate(&self) -> Result<(), PipelineError> {
        Dimensions::non_zero(self.canvas.width, self.canvas.height, "canvas")?;
        self.background.validate()?;
        for item in &self.items {
            check_extension(&item.file)?;
        }
        Ok(())
    }

    /// Resolve every relative path in the layout against `root`.
    ///
    /// Absolute paths are left alone.
    #[must_use]
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        match &mut self.background {
            BackgroundSpec::Image { file, .. } | BackgroundSpec::Pattern { file, .. } => {
                resolve(file);
            }
            BackgroundSpec::Solid { .. } => {}
        }
        for item in &mut self.items {
            resolve(&mut item.file);
        }
        resolve(&mut self.export_file);
        self
    }
}

impl TryFrom<LayoutFile> for Layout {
    type Error = PipelineError;

    fn try_from(raw: LayoutFile) -> Result<Self, Self::Error> {
        let background = match raw.background {
            None => BackgroundSpec::DEFAULT,
            Some(BackgroundSection::Solid { color }) => BackgroundSpec::Solid {
                color: parse_color(&color)?,
            },
            Some(BackgroundSection::Image { file, mode }) => BackgroundSpec::Image { file, mode },
            Some(BackgroundSection::Pattern { file, scale }) => {
                BackgroundSpec::Pattern { file, scale }
            }
        };

        let defaults = Defaults {
            width: raw.defaults.w.filter(|&w| w > 0),
            height: raw.defaults.h.filter(|&h| h > 0),
            fit: raw.defaults.fit,
        };

        let items = raw
            .items
            .into_iter()
            .map(|it| PlacementItem {
                file: it.file,
                x: it.x,
                y: it.y,
                width: it.w,
                height: it.h,
                fit: it.fit,
            })
            .collect();

        let layout = Self {
            canvas: Dimensions::new(raw.canvas.width, raw.canvas.height),
            background,
            defaults,
            items,
            export_file: raw.export.file,
        };
        layout.validate()?;
        Ok(layout)
    }
}
