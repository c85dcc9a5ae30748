// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Canny-style edge detection on gray images.
//!
//! The filter runs four stages, each in its own module:
//!
//! 1. [`smooth`]: 5x5 binomial blur to suppress sensor noise.
//! 2. [`gradient`]: Sobel gradients, L1 magnitude and a 4-bin direction.
//! 3. [`nms`]: non-maximum suppression along the gradient direction.
//! 4. [`hysteresis`]: double thresholding with 8-connected edge tracking.
//!
//! Every stage reads neighbors through clamped or zero-padded accessors, so
//! no stage reads outside the image, and all arithmetic is integer so the
//! output is bit-exact across runs and platforms.

pub mod gradient;
pub mod hysteresis;
pub mod nms;
pub mod smooth;

use crate::{
    error::{FrameError, Result},
    image::{Gray, Image, ImageView},
};
use tracing::{debug, instrument};

pub use gradient::{Direction, Gradients, MagnitudeMap};
pub use hysteresis::EDGE;

pub const DEFAULT_LOW_THRESHOLD: u8 = 50;
pub const DEFAULT_HIGH_THRESHOLD: u8 = 150;

/// Validated hysteresis thresholds, `0 <= low <= high <= 255`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Thresholds {
    low: u8,
    high: u8,
}

impl Thresholds {
    pub fn new(low: i32, high: i32) -> Result<Self> {
        let invalid = FrameError::InvalidThresholds { low, high };
        let low_u8 = u8::try_from(low).map_err(|_| invalid.clone())?;
        let high_u8 = u8::try_from(high).map_err(|_| invalid.clone())?;
        if low_u8 > high_u8 {
            return Err(invalid);
        }
        Ok(Self {
            low: low_u8,
            high: high_u8,
        })
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD,
            high: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

/// Detects edges in `src` and returns a mask of `0` and [`EDGE`].
///
/// # Errors
///
/// Returns [`FrameError::InvalidThresholds`] before touching any pixel when
/// the thresholds are out of range or `low > high`.
pub fn detect_edges(src: ImageView<'_, Gray>, low: i32, high: i32) -> Result<Image<Gray>> {
    let thresholds = Thresholds::new(low, high)?;
    Ok(canny(src, thresholds))
}

/// Runs the full filter chain with already validated thresholds.
#[instrument(level = "debug", skip_all, fields(width = src.width(), height = src.height()))]
pub fn canny(src: ImageView<'_, Gray>, thresholds: Thresholds) -> Image<Gray> {
    let blurred = smooth::gaussian_blur(src);
    let grad = gradient::sobel(blurred.view());
    let thin = nms::non_maximum_suppression(&grad);
    let mask = hysteresis::hysteresis(&thin, thresholds);
    debug!(
        edge_pixels = count_edges(mask.view()),
        low = thresholds.low(),
        high = thresholds.high(),
        "edges detected"
    );
    mask
}

/// Number of edge pixels in a mask.
pub fn count_edges(mask: ImageView<'_, Gray>) -> usize {
    mask.as_slice().iter().filter(|&&v| v == EDGE).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Geometry;

    fn step(w: i32, h: i32, boundary: usize) -> Image<Gray> {
        let geometry = Geometry::new(w, h).unwrap();
        let mut img = Image::<Gray>::new(geometry).unwrap();
        for y in 0..h as usize {
            for x in boundary..w as usize {
                img.put(x, y, 255);
            }
        }
        img
    }

    #[test]
    fn threshold_validation() {
        assert!(Thresholds::new(0, 0).is_ok());
        assert!(Thresholds::new(255, 255).is_ok());
        assert_eq!(
            Thresholds::new(200, 50),
            Err(FrameError::InvalidThresholds {
                low: 200,
                high: 50
            })
        );
        assert!(Thresholds::new(-1, 50).is_err());
        assert!(Thresholds::new(50, 256).is_err());
        assert_eq!(
            Thresholds::default(),
            Thresholds::new(50, 150).unwrap()
        );
    }

    #[test]
    fn black_image_has_no_edges() {
        for (w, h) in [(1, 1), (4, 4), (31, 17)] {
            let img = Image::<Gray>::new(Geometry::new(w, h).unwrap()).unwrap();
            let edges = detect_edges(img.view(), 50, 150).unwrap();
            assert!(edges.as_slice().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn vertical_step_gives_one_line() {
        let img = step(20, 12, 10);
        let edges = detect_edges(img.view(), 50, 150).unwrap();
        let view = edges.view();
        for y in 0..12 {
            for x in 0..20 {
                let expected = if x == 9 { EDGE } else { 0 };
                assert_eq!(view.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn horizontal_step_gives_one_line() {
        let geometry = Geometry::new(9, 16).unwrap();
        let mut img = Image::<Gray>::new(geometry).unwrap();
        for y in 8..16 {
            for x in 0..9 {
                img.put(x, y, 255);
            }
        }
        let edges = detect_edges(img.view(), 50, 150).unwrap();
        let rows: Vec<usize> = (0..16)
            .filter(|&y| edges.view().get(4, y) == EDGE)
            .collect();
        assert_eq!(rows, vec![7]);
        assert_eq!(count_edges(edges.view()), 9);
    }

    #[test]
    fn detection_is_deterministic() {
        let geometry = Geometry::new(23, 19).unwrap();
        let pixels: Vec<u8> = (0..23 * 19).map(|i| ((i * 37) % 251) as u8).collect();
        let img = Image::<Gray>::from_vec(pixels, geometry).unwrap();
        let a = detect_edges(img.view(), 20, 90).unwrap();
        let b = detect_edges(img.view(), 20, 90).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn inverted_thresholds_fail() {
        let img = step(8, 8, 4);
        assert_eq!(
            detect_edges(img.view(), 200, 50),
            Err(FrameError::InvalidThresholds {
                low: 200,
                high: 50
            })
        );
    }
}
