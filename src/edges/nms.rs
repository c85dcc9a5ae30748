// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Non-maximum suppression along the quantized gradient direction.

use super::gradient::{Gradients, MagnitudeMap};

/// Thins ridges of gradient magnitude to single-pixel lines.
///
/// A pixel survives when its magnitude is strictly greater than the neighbor
/// before it and at least the neighbor after it along the gradient. The
/// asymmetry breaks ties between two equal pixels on a symmetric ramp, so a
/// step edge yields one line instead of two. Neighbors outside the image
/// count as zero.
pub fn non_maximum_suppression(grad: &Gradients) -> MagnitudeMap {
    let geometry = grad.geometry();
    let mag = grad.magnitude();
    let mut out = MagnitudeMap::new(geometry);

    for y in 0..geometry.height() {
        for x in 0..geometry.width() {
            let m = mag.get(x, y);
            if m == 0 {
                continue;
            }
            let [(bx, by), (ax, ay)] = grad.direction(x, y).neighbors();
            let (xi, yi) = (x as isize, y as isize);
            let before = mag.get_or_zero(xi + bx, yi + by);
            let after = mag.get_or_zero(xi + ax, yi + ay);
            if m > before && m >= after {
                out.set(x, y, m);
            }
        }
    }

    out
}
