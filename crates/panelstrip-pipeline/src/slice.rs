//! Slicing a tall image into numbered horizontal bands.
//!
//! Bands start at `0, step, 2 * step, ...` while the start is inside the
//! image, where `step = slice_height - overlap`. Each band is
//! `slice_height` rows tall unless it would run past the image bottom,
//! where it is cut short. With a large overlap several trailing bands can
//! be cut this way. The last band always ends exactly at the image
//! height and the union of bands covers every row.

use image::imageops;

use crate::types::{PipelineError, RgbaImage};

/// Validated slicing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceParams {
    slice_height: u32,
    overlap: u32,
}

impl SliceParams {
    /// Band height when none is configured.
    pub const DEFAULT_SLICE_HEIGHT: u32 = 1200;

    /// Overlap when none is configured.
    pub const DEFAULT_OVERLAP: u32 = 0;

    /// Validate and build slicing parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `slice_height` is zero
    /// or `overlap >= slice_height` (the step would not advance).
    pub fn new(slice_height: u32, overlap: u32) -> Result<Self, PipelineError> {
        if slice_height == 0 {
            return Err(PipelineError::invalid_config(
                "slice height must be greater than 0",
            ));
        }
        if overlap >= slice_height {
            return Err(PipelineError::invalid_config(format!(
                "overlap ({overlap}) must be less than slice height ({slice_height})"
            )));
        }
        Ok(Self {
            slice_height,
            overlap,
        })
    }

    /// Height of every band but the last.
    #[must_use]
    pub const fn slice_height(self) -> u32 {
        self.slice_height
    }

    /// Rows shared by consecutive bands.
    #[must_use]
    pub const fn overlap(self) -> u32 {
        self.overlap
    }

    /// Distance between consecutive band starts. Always positive.
    #[must_use]
    pub const fn step(self) -> u32 {
        self.slice_height - self.overlap
    }
}

impl Default for SliceParams {
    fn default() -> Self {
        Self {
            slice_height: Self::DEFAULT_SLICE_HEIGHT,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

/// One horizontal band: rows `top..bottom`, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// 1-based position in the sequence.
    pub index: usize,
    /// First row, inclusive.
    pub top: u32,
    /// Last row, exclusive.
    pub bottom: u32,
}

impl Band {
    /// Number of rows in the band.
    #[must_use]
    pub const fn height(self) -> u32 {
        self.bottom - self.top
    }
}

/// Iterator over the bands of an image of a given height.
///
/// Created by [`bands`].
#[derive(Debug, Clone)]
pub struct Bands {
    height: u32,
    params: SliceParams,
    next_top: Option<u32>,
    index: usize,
}

impl Iterator for Bands {
    type Item = Band;

    fn next(&mut self) -> Option<Band> {
        let top = self.next_top.filter(|&top| top < self.height)?;
        let bottom = top
            .saturating_add(self.params.slice_height)
            .min(self.height);
        self.index += 1;
        self.next_top = top.checked_add(self.params.step());
        Some(Band {
            index: self.index,
            top,
            bottom,
        })
    }
}

/// Plan the bands for an image `height` rows tall.
///
/// A zero-height image has no bands.
#[must_use]
pub const fn bands(height: u32, params: SliceParams) -> Bands {
    Bands {
        height,
        params,
        next_top: Some(0),
        index: 0,
    }
}

/// Number of bands [`bands`] yields, computed with the same loop so the
/// figure reported before writing always matches what gets written.
#[must_use]
pub fn slice_count(height: u32, params: SliceParams) -> usize {
    bands(height, params).count()
}

/// Copy the rows of `band` out of `image` as a new full-width image.
#[must_use]
pub fn crop_band(image: &RgbaImage, band: Band) -> RgbaImage {
    imageops::crop_imm(image, 0, band.top, image.width(), band.height()).to_image()
}

/// File name for band `index` of `total`: zero-padded to three digits,
/// or wider when `total` needs more, so names sort in band order.
#[must_use]
pub fn band_file_name(index: usize, total: usize, extension: &str) -> String {
    let width = total.max(1).ilog10() as usize + 1;
    let width = width.max(3);
    format!("{index:0width$}.{extension}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    fn params(slice_height: u32, overlap: u32) -> SliceParams {
        SliceParams::new(slice_height, overlap).unwrap()
    }

    #[test]
    fn default_params() {
        let p = SliceParams::default();
        assert_eq!(p.slice_height(), 1200);
        assert_eq!(p.overlap(), 0);
        assert_eq!(p.step(), 1200);
    }

    #[test]
    fn zero_slice_height_is_rejected() {
        assert!(matches!(
            SliceParams::new(0, 0),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn overlap_at_or_above_height_is_rejected() {
        assert!(matches!(
            SliceParams::new(100, 100),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            SliceParams::new(100, 250),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn tall_strip_with_overlap() {
        // 2500 rows, 1200 per band, 100 overlap -> step 1100.
        let p = params(1200, 100);
        assert_eq!(p.step(), 1100);
        let planned: Vec<Band> = bands(2500, p).collect();
        assert_eq!(
            planned,
            vec![
                Band {
                    index: 1,
                    top: 0,
                    bottom: 1200
                },
                Band {
                    index: 2,
                    top: 1100,
                    bottom: 2300
                },
                Band {
                    index: 3,
                    top: 2200,
                    bottom: 2500
                },
            ]
        );
        let heights: Vec<u32> = planned.iter().map(|b| b.height()).collect();
        assert_eq!(heights, vec![1200, 1200, 300]);
        assert_eq!(slice_count(2500, p), 3);
    }

    #[test]
    fn exact_multiple_has_no_sliver() {
        let planned: Vec<Band> = bands(2400, params(1200, 0)).collect();
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[1].bottom, 2400);
        assert_eq!(planned[1].height(), 1200);
    }

    #[test]
    fn short_image_is_one_short_band() {
        let planned: Vec<Band> = bands(300, params(1200, 100)).collect();
        assert_eq!(
            planned,
            vec![Band {
                index: 1,
                top: 0,
                bottom: 300
            }]
        );
    }

    #[test]
    fn zero_height_has_no_bands() {
        assert_eq!(slice_count(0, SliceParams::default()), 0);
    }

    #[test]
    fn overlap_can_produce_trailing_contained_bands() {
        // step 1: every row starts a band; trailing bands shrink to 1 row.
        let planned: Vec<Band> = bands(5, params(3, 2)).collect();
        let ranges: Vec<(u32, u32)> = planned.iter().map(|b| (b.top, b.bottom)).collect();
        assert_eq!(ranges, vec![(0, 3), (1, 4), (2, 5), (3, 5), (4, 5)]);
    }

    #[test]
    fn coverage_and_count_properties() {
        for height in [0, 1, 2, 7, 99, 100, 101, 1199, 1200, 1201, 2500, 4817] {
            for (slice_height, overlap) in [(1, 0), (7, 3), (100, 0), (100, 99), (1200, 100)] {
                let p = params(slice_height, overlap);
                let planned: Vec<Band> = bands(height, p).collect();

                // Count matches the plain loop.
                let mut loops = 0;
                let mut y = 0;
                while y < height {
                    loops += 1;
                    y += p.step();
                }
                assert_eq!(planned.len(), loops);
                assert_eq!(slice_count(height, p), loops);

                if height == 0 {
                    assert!(planned.is_empty());
                    continue;
                }

                // Gap-free, 1-based, contiguous numbering.
                assert_eq!(planned[0].top, 0);
                for (i, pair) in planned.windows(2).enumerate() {
                    assert!(pair[1].top <= pair[0].bottom, "gap after band {}", i + 1);
                    assert_eq!(pair[1].index, pair[0].index + 1);
                }
                for (i, band) in planned.iter().enumerate() {
                    assert_eq!(band.index, i + 1);
                }

                // Each band is cut at the image bottom; only the ones that
                // would run past it are short.
                for band in &planned {
                    assert_eq!(band.bottom, (band.top + slice_height).min(height));
                    if band.top + slice_height <= height {
                        assert_eq!(band.height(), slice_height);
                    }
                }
                assert_eq!(planned.last().unwrap().bottom, height);
            }
        }
    }

    #[test]
    fn large_overlap_leaves_short_trailing_bands() {
        // step 1 over 101 rows: every row starts a band.
        let planned: Vec<Band> = bands(101, params(100, 99)).collect();
        assert_eq!(planned.len(), 101);
        assert_eq!(slice_count(101, params(100, 99)), 101);
        assert_eq!((planned[0].top, planned[0].bottom), (0, 100));
        assert_eq!((planned[1].top, planned[1].bottom), (1, 101));
        assert_eq!((planned[2].top, planned[2].bottom), (2, 101));
        assert_eq!(planned[2].height(), 99);
        assert_eq!(planned[100].height(), 1);
        assert!(planned.iter().all(|b| b.bottom <= 101));
    }

    #[test]
    fn does_not_overflow_near_u32_max() {
        let p = params(u32::MAX, 0);
        let planned: Vec<Band> = bands(u32::MAX, p).collect();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].bottom, u32::MAX);
    }

    #[test]
    fn crop_band_copies_rows() {
        let img = RgbaImage::from_fn(3, 10, |_, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgba([y as u8, 0, 0, 255])
        });
        let band = Band {
            index: 2,
            top: 4,
            bottom: 7,
        };
        let out = crop_band(&img, band);
        assert_eq!(out.dimensions(), (3, 3));
        assert_eq!(out.get_pixel(0, 0).0[0], 4);
        assert_eq!(out.get_pixel(2, 2).0[0], 6);
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(band_file_name(1, 3, "png"), "001.png");
        assert_eq!(band_file_name(42, 999, "png"), "042.png");
        assert_eq!(band_file_name(7, 1000, "png"), "0007.png");
        assert_eq!(band_file_name(1234, 1234, "png"), "1234.png");
        assert_eq!(band_file_name(1, 0, "png"), "001.png");
    }
}
