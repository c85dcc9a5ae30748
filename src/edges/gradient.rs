// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Sobel gradients with L1 magnitude and 4-bin direction quantization.
//!
//! Border pixels read their neighbors with clamped (replicated) indices, so a
//! flat border produces zero gradient.

use crate::image::{Geometry, Gray, ImageView};

// tan(22.5°) and tan(67.5°) in 16.16 fixed point.
const TAN_22_5: i64 = 27146;
const TAN_67_5: i64 = 158218;
const FIXED_ONE: i64 = 1 << 16;

/// Gradient direction folded onto four bins.
///
/// Each variant names the axis the gradient points along, which is normal to
/// the edge itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// 0°: compare with the left and right neighbors.
    Horizontal,
    /// 45° (x and y grow together): compare along the main diagonal.
    Diagonal,
    /// 90°: compare with the neighbors above and below.
    Vertical,
    /// 135°: compare along the anti-diagonal.
    AntiDiagonal,
}

impl Direction {
    /// Quantizes the gradient `(gx, gy)`; y grows downwards.
    pub fn quantize(gx: i32, gy: i32) -> Self {
        let ax = i64::from(gx).abs();
        let ay = i64::from(gy).abs();
        if ay * FIXED_ONE <= ax * TAN_22_5 {
            Direction::Horizontal
        } else if ay * FIXED_ONE >= ax * TAN_67_5 {
            Direction::Vertical
        } else if (gx > 0) == (gy > 0) {
            Direction::Diagonal
        } else {
            Direction::AntiDiagonal
        }
    }

    /// Offsets of the two neighbors lying along the gradient, "before" first.
    pub fn neighbors(self) -> [(isize, isize); 2] {
        match self {
            Direction::Horizontal => [(-1, 0), (1, 0)],
            Direction::Diagonal => [(-1, -1), (1, 1)],
            Direction::Vertical => [(0, -1), (0, 1)],
            Direction::AntiDiagonal => [(1, -1), (-1, 1)],
        }
    }
}

/// Per-pixel edge strength.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MagnitudeMap {
    geometry: Geometry,
    data: Vec<i32>,
}

impl MagnitudeMap {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            data: vec![0; geometry.pixels()],
        }
    }

    pub fn from_vec(geometry: Geometry, data: Vec<i32>) -> Option<Self> {
        (data.len() == geometry.pixels()).then_some(Self { geometry, data })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.geometry.width() + x]
    }

    /// Reads with everything outside the image treated as zero strength.
    pub fn get_or_zero(&self, x: isize, y: isize) -> i32 {
        let (w, h) = (self.geometry.width(), self.geometry.height());
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            return 0;
        }
        self.get(x as usize, y as usize)
    }

    pub fn set(&mut self, x: usize, y: usize, value: i32) {
        let w = self.geometry.width();
        self.data[y * w + x] = value;
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

/// Sobel responses of one image.
#[derive(Clone, Debug)]
pub struct Gradients {
    gx: Vec<i16>,
    gy: Vec<i16>,
    magnitude: MagnitudeMap,
}

impl Gradients {
    pub fn geometry(&self) -> Geometry {
        self.magnitude.geometry()
    }

    pub fn gx(&self, x: usize, y: usize) -> i32 {
        i32::from(self.gx[y * self.geometry().width() + x])
    }

    pub fn gy(&self, x: usize, y: usize) -> i32 {
        i32::from(self.gy[y * self.geometry().width() + x])
    }

    pub fn direction(&self, x: usize, y: usize) -> Direction {
        Direction::quantize(self.gx(x, y), self.gy(x, y))
    }

    pub fn magnitude(&self) -> &MagnitudeMap {
        &self.magnitude
    }
}

/// Computes 3x3 Sobel gradients and their L1 magnitude `|gx| + |gy|`.
///
/// Each response fits in `i16` (at most 4 * 255).
pub fn sobel(src: ImageView<'_, Gray>) -> Gradients {
    let geometry = src.geometry();
    let (w, h) = (geometry.width(), geometry.height());
    let mut gx = vec![0i16; w * h];
    let mut gy = vec![0i16; w * h];
    let mut magnitude = MagnitudeMap::new(geometry);

    for y in 0..h {
        let rows = [
            src.gray_row(y.saturating_sub(1)),
            src.gray_row(y),
            src.gray_row((y + 1).min(h - 1)),
        ];
        for x in 0..w {
            let xs = [x.saturating_sub(1), x, (x + 1).min(w - 1)];
            let p = |r: usize, c: usize| i32::from(rows[r][xs[c]]);

            let sx = (p(0, 2) + 2 * p(1, 2) + p(2, 2)) - (p(0, 0) + 2 * p(1, 0) + p(2, 0));
            let sy = (p(2, 0) + 2 * p(2, 1) + p(2, 2)) - (p(0, 0) + 2 * p(0, 1) + p(0, 2));

            gx[y * w + x] = sx as i16;
            gy[y * w + x] = sy as i16;
            magnitude.set(x, y, sx.abs() + sy.abs());
        }
    }

    Gradients { gx, gy, magnitude }
}
