// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Double-threshold edge tracking.

use super::{gradient::MagnitudeMap, Thresholds};
use crate::image::{Gray, Image};
use std::collections::VecDeque;

pub const EDGE: u8 = 255;

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Classifies thinned magnitudes into a binary edge mask.
///
/// Pixels at or above `high` seed the mask. Pixels at or above `low` join it
/// when they are 8-connected to a seed, directly or through other joined
/// pixels. Zero magnitude never counts as an edge.
pub fn hysteresis(mag: &MagnitudeMap, thresholds: Thresholds) -> Image<Gray> {
    let geometry = mag.geometry();
    let (w, h) = (geometry.width() as isize, geometry.height() as isize);
    let low = i32::from(thresholds.low()).max(1);
    let high = i32::from(thresholds.high()).max(1);

    let mut out = Image::<Gray>::from_parts(vec![0; geometry.pixels()], geometry);
    let mut queue = VecDeque::new();

    for y in 0..geometry.height() {
        for x in 0..geometry.width() {
            if mag.get(x, y) < high || out.view().get(x, y) == EDGE {
                continue;
            }
            out.put(x, y, EDGE);
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                for (dx, dy) in NEIGHBORS {
                    let (nx, ny) = (cx as isize + dx, cy as isize + dy);
                    if nx < 0 || ny < 0 || nx >= w || ny >= h {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if mag.get(nx, ny) >= low && out.view().get(nx, ny) != EDGE {
                        out.put(nx, ny, EDGE);
                        queue.push_back((nx, ny));
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Geometry;

    fn map(w: i32, h: i32, data: Vec<i32>) -> MagnitudeMap {
        MagnitudeMap::from_vec(Geometry::new(w, h).unwrap(), data).unwrap()
    }

    fn thresholds(low: i32, high: i32) -> Thresholds {
        Thresholds::new(low, high).unwrap()
    }

    #[test]
    fn weak_pixels_follow_strong_ones() {
        #[rustfmt::skip]
        let mag = map(5, 3, vec![
            200, 60, 0, 0, 0,
            0,   0, 70, 0, 60,
            0,   0, 0,  0, 0,
        ]);
        let out = hysteresis(&mag, thresholds(50, 150));
        #[rustfmt::skip]
        assert_eq!(out.as_slice(), &[
            255, 255, 0,   0, 0,
            0,   0,   255, 0, 0,
            0,   0,   0,   0, 0,
        ]);
    }

    #[test]
    fn weak_only_region_is_dropped() {
        let mag = map(3, 1, vec![100, 120, 100]);
        let out = hysteresis(&mag, thresholds(50, 150));
        assert!(out.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn below_low_breaks_the_chain() {
        let mag = map(4, 1, vec![150, 49, 100, 100]);
        let out = hysteresis(&mag, thresholds(50, 150));
        assert_eq!(out.as_slice(), &[255, 0, 0, 0]);
    }

    #[test]
    fn zero_thresholds_ignore_flat_pixels() {
        let mag = map(3, 1, vec![0, 1, 0]);
        let out = hysteresis(&mag, thresholds(0, 0));
        assert_eq!(out.as_slice(), &[0, 255, 0]);
    }
}
