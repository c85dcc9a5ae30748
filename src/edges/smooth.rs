// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! 5x5 binomial smoothing, applied as two separable passes.

use crate::image::{Gray, Image, ImageView};

const KERNEL: [u32; 5] = [1, 4, 6, 4, 1];
const RADIUS: isize = 2;
// Two passes of a kernel summing to 16.
const NORM_SHIFT: u32 = 8;
const NORM_ROUND: u32 = 1 << (NORM_SHIFT - 1);

/// Blurs `src` with a 5x5 binomial approximation of a Gaussian
/// (sigma close to 1). Borders are replicated.
pub fn gaussian_blur(src: ImageView<'_, Gray>) -> Image<Gray> {
    let geometry = src.geometry();
    let (w, h) = (geometry.width(), geometry.height());

    // Horizontal pass, unnormalized. At most 255 * 16 per sample.
    let mut tmp = vec![0u16; w * h];
    for (y, out) in tmp.chunks_exact_mut(w).enumerate() {
        let row = src.gray_row(y);
        for (x, acc) in out.iter_mut().enumerate() {
            let mut sum = 0;
            for (k, weight) in KERNEL.iter().enumerate() {
                let xx = (x as isize + k as isize - RADIUS).clamp(0, w as isize - 1) as usize;
                sum += weight * u32::from(row[xx]);
            }
            *acc = sum as u16;
        }
    }

    // Vertical pass and normalization.
    let mut dst = vec![0u8; w * h];
    for (y, out) in dst.chunks_exact_mut(w).enumerate() {
        for (x, px) in out.iter_mut().enumerate() {
            let mut sum = 0;
            for (k, weight) in KERNEL.iter().enumerate() {
                let yy = (y as isize + k as isize - RADIUS).clamp(0, h as isize - 1) as usize;
                sum += weight * u32::from(tmp[yy * w + x]);
            }
            *px = ((sum + NORM_ROUND) >> NORM_SHIFT) as u8;
        }
    }

    Image::from_parts(dst, geometry)
}
