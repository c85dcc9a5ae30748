// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Pixel encoding conversions.
//!
//! All conversions are pure integer arithmetic, so the same input always
//! produces the same bytes on every platform.

use crate::{
    error::{FrameError, Result},
    image::{Encoding, Geometry, Gray, Image, ImageView, Nv21, Rgba},
};

// Full-range BT.601 (JFIF) coefficients in 16.16 fixed point, the range
// Android cameras deliver.
const CVR: i32 = 91881; // 1.402
const CUG: i32 = -22554; // -0.344136
const CVG: i32 = -46802; // -0.714136
const CUB: i32 = 116130; // 1.772
const YUV_SHIFT: u32 = 16;
const YUV_ROUND: i32 = 1 << (YUV_SHIFT - 1);

// BT.601 luma weights in 2.14 fixed point; they sum to 1 << 14.
const GRAY_R: u32 = 4899;
const GRAY_G: u32 = 9617;
const GRAY_B: u32 = 1868;
const GRAY_SHIFT: u32 = 14;
const GRAY_ROUND: u32 = 1 << (GRAY_SHIFT - 1);

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Converts one YUV sample to RGBA with alpha 255.
#[inline]
pub fn yuv_to_rgba(y: u8, u: u8, v: u8) -> [u8; 4] {
    let y = i32::from(y);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    let r = y + ((CVR * v + YUV_ROUND) >> YUV_SHIFT);
    let g = y + ((CUG * u + CVG * v + YUV_ROUND) >> YUV_SHIFT);
    let b = y + ((CUB * u + YUV_ROUND) >> YUV_SHIFT);
    [clamp_u8(r), clamp_u8(g), clamp_u8(b), 255]
}

/// Weighted luma of one RGB sample, rounded to nearest.
#[inline]
pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = u32::from(r) * GRAY_R + u32::from(g) * GRAY_G + u32::from(b) * GRAY_B;
    ((sum + GRAY_ROUND) >> GRAY_SHIFT) as u8
}

/// Decodes an NV21 frame into RGBA.
///
/// Each V,U pair covers a 2x2 block of luma samples.
pub fn nv21_to_rgba(src: ImageView<'_, Nv21>) -> Result<Image<Rgba>> {
    let geometry = src.geometry();
    let mut dst = Image::<Rgba>::new(geometry)?;
    let stride = Rgba::KIND.row_stride(geometry.width());

    for (y, out) in dst.as_slice_mut().chunks_exact_mut(stride).enumerate() {
        let luma = src.luma_row(y);
        let chroma = src.chroma_row(y);
        for (x, px) in out.chunks_exact_mut(4).enumerate() {
            let vu = (x / 2) * 2;
            px.copy_from_slice(&yuv_to_rgba(luma[x], chroma[vu + 1], chroma[vu]));
        }
    }

    Ok(dst)
}

/// Reduces RGBA to a single luma channel, ignoring alpha.
pub fn rgba_to_gray(src: ImageView<'_, Rgba>) -> Result<Image<Gray>> {
    let geometry = src.geometry();
    let mut dst = Image::<Gray>::new(geometry)?;

    for (px, out) in src
        .as_slice()
        .chunks_exact(4)
        .zip(dst.as_slice_mut().iter_mut())
    {
        *out = rgb_to_luma(px[0], px[1], px[2]);
    }

    Ok(dst)
}

/// Expands a gray image to RGBA with R = G = B = gray and alpha 255.
pub fn gray_to_rgba(src: ImageView<'_, Gray>) -> Result<Image<Rgba>> {
    let geometry = src.geometry();
    let mut dst = Image::<Rgba>::new(geometry)?;

    for (&v, out) in src
        .as_slice()
        .iter()
        .zip(dst.as_slice_mut().chunks_exact_mut(4))
    {
        out.copy_from_slice(&[v, v, v, 255]);
    }

    Ok(dst)
}

/// One plane of a strided YUV 4:2:0 camera image.
#[derive(Copy, Clone, Debug)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    /// Bytes between the starts of two consecutive rows.
    pub row_stride: usize,
    /// Bytes between two consecutive samples of one row.
    pub pixel_stride: usize,
}

impl Plane<'_> {
    /// Offset of sample (x, y), checked against the plane length. Strides
    /// whose offset does not fit in `usize` report `expected: usize::MAX`.
    fn offset(&self, x: usize, y: usize) -> Result<usize> {
        let actual = self.data.len();
        let offset = y
            .checked_mul(self.row_stride)
            .and_then(|row| x.checked_mul(self.pixel_stride)?.checked_add(row))
            .ok_or(FrameError::SizeMismatch {
                expected: usize::MAX,
                actual,
            })?;
        if offset >= actual {
            return Err(FrameError::SizeMismatch {
                expected: offset.saturating_add(1),
                actual,
            });
        }
        Ok(offset)
    }
}

/// The three planes of a YUV 4:2:0 image as delivered by camera APIs with
/// independent row and pixel strides.
#[derive(Copy, Clone, Debug)]
pub struct Yuv420Planes<'a> {
    pub y: Plane<'a>,
    pub u: Plane<'a>,
    pub v: Plane<'a>,
}

/// Repacks strided YUV 4:2:0 planes into a tightly packed NV21 image.
///
/// # Errors
///
/// - [`FrameError::InvalidGeometry`] if `geometry` is not valid for NV21
/// - [`FrameError::SizeMismatch`] if any plane is too short for its strides
pub fn yuv420_to_nv21(planes: &Yuv420Planes<'_>, geometry: Geometry) -> Result<Image<Nv21>> {
    let mut dst = Image::<Nv21>::new(geometry)?;
    let (width, height) = (geometry.width(), geometry.height());
    let (luma, chroma) = dst.as_slice_mut().split_at_mut(width * height);

    for (y, row) in luma.chunks_exact_mut(width).enumerate() {
        if planes.y.pixel_stride == 1 {
            let start = planes.y.offset(0, y)?;
            let end = planes.y.offset(width - 1, y)? + 1;
            row.copy_from_slice(&planes.y.data[start..end]);
        } else {
            for (x, out) in row.iter_mut().enumerate() {
                *out = planes.y.data[planes.y.offset(x, y)?];
            }
        }
    }

    for (y, row) in chroma.chunks_exact_mut(width).enumerate() {
        for (x, pair) in row.chunks_exact_mut(2).enumerate() {
            pair[0] = planes.v.data[planes.v.offset(x, y)?];
            pair[1] = planes.u.data[planes.u.offset(x, y)?];
        }
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nv21(geometry: Geometry, y: u8, u: u8, v: u8) -> Image<Nv21> {
        let mut img = Image::<Nv21>::new(geometry).unwrap();
        let luma = geometry.pixels();
        let (ys, vus) = img.as_slice_mut().split_at_mut(luma);
        ys.fill(y);
        for pair in vus.chunks_exact_mut(2) {
            pair[0] = v;
            pair[1] = u;
        }
        img
    }

    #[test]
    fn neutral_chroma_is_gray() {
        assert_eq!(yuv_to_rgba(128, 128, 128), [128, 128, 128, 255]);
        assert_eq!(yuv_to_rgba(0, 128, 128), [0, 0, 0, 255]);
        assert_eq!(yuv_to_rgba(255, 128, 128), [255, 255, 255, 255]);
    }

    #[test]
    fn extreme_chroma_clamps() {
        // Strong V pushes red up and green down.
        let px = yuv_to_rgba(255, 128, 255);
        assert_eq!(px[0], 255);
        assert!(px[1] < 255);
        let px = yuv_to_rgba(0, 0, 0);
        assert_eq!(px[0], 0);
        assert_eq!(px[2], 0);
        assert!(px[1] > 0);
    }

    #[test]
    fn luma_weights() {
        assert_eq!(rgb_to_luma(0, 0, 0), 0);
        assert_eq!(rgb_to_luma(255, 255, 255), 255);
        assert_eq!(rgb_to_luma(77, 77, 77), 77);
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(rgb_to_luma(255, 0, 0), 76);
        assert_eq!(rgb_to_luma(0, 255, 0), 150);
        assert_eq!(rgb_to_luma(0, 0, 255), 29);
    }

    #[test]
    fn nv21_chroma_is_shared_per_block() {
        let geometry = Geometry::new(4, 2).unwrap();
        let mut img = nv21(geometry, 100, 128, 128);
        // Make the right-hand block red-tinted.
        let luma = geometry.pixels();
        img.as_slice_mut()[luma + 2] = 200;
        let rgba = nv21_to_rgba(img.view()).unwrap();
        let view = rgba.view();
        assert_eq!(view.pixel(0, 0), view.pixel(1, 1));
        assert_eq!(view.pixel(2, 0), view.pixel(3, 1));
        assert!(view.pixel(2, 0)[0] > view.pixel(0, 0)[0]);
        assert_eq!(view.pixel(3, 1)[3], 255);
    }

    #[test]
    fn uniform_round_trip_stays_uniform() {
        for (w, h) in [(2, 2), (6, 4), (17 * 2, 9 * 2)] {
            let geometry = Geometry::new(w, h).unwrap();
            let rgba = nv21_to_rgba(nv21(geometry, 128, 128, 128).view()).unwrap();
            let gray = rgba_to_gray(rgba.view()).unwrap();
            let back = gray_to_rgba(gray.view()).unwrap();
            let expected = rgb_to_luma(128, 128, 128);
            for px in back.as_slice().chunks_exact(4) {
                assert_eq!(px, [expected, expected, expected, 255]);
            }
        }
    }

    #[test]
    fn gray_alpha_is_opaque() {
        let geometry = Geometry::new(3, 1).unwrap();
        let gray = Image::<Gray>::from_vec(vec![0, 10, 255], geometry).unwrap();
        let rgba = gray_to_rgba(gray.view()).unwrap();
        assert_eq!(
            rgba.as_slice(),
            &[0, 0, 0, 255, 10, 10, 10, 255, 255, 255, 255, 255]
        );
    }

    #[test]
    fn strided_planes_repack() {
        let geometry = Geometry::new(4, 2).unwrap();
        // Y rows padded to 6 bytes.
        let y: Vec<u8> = vec![1, 2, 3, 4, 0, 0, 5, 6, 7, 8, 0, 0];
        // Interleaved chroma as exposed by many devices: pixel stride 2.
        let u = [10u8, 0, 11];
        let v = [20u8, 0, 21];
        let planes = Yuv420Planes {
            y: Plane {
                data: &y,
                row_stride: 6,
                pixel_stride: 1,
            },
            u: Plane {
                data: &u,
                row_stride: 4,
                pixel_stride: 2,
            },
            v: Plane {
                data: &v,
                row_stride: 4,
                pixel_stride: 2,
            },
        };
        let img = yuv420_to_nv21(&planes, geometry).unwrap();
        assert_eq!(img.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 20, 10, 21, 11]);
    }

    #[test]
    fn short_plane_is_rejected() {
        let geometry = Geometry::new(2, 2).unwrap();
        let y = [0u8; 3];
        let uv = [0u8; 1];
        let plane = |data| Plane {
            data,
            row_stride: 2,
            pixel_stride: 1,
        };
        let planes = Yuv420Planes {
            y: plane(&y),
            u: plane(&uv),
            v: plane(&uv),
        };
        assert!(matches!(
            yuv420_to_nv21(&planes, geometry),
            Err(FrameError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn overflowing_stride_is_rejected() {
        let geometry = Geometry::new(2, 2).unwrap();
        let y = [0u8; 4];
        let uv = [128u8; 2];
        let packed = |data| Plane {
            data,
            row_stride: 2,
            pixel_stride: 1,
        };
        let planes = Yuv420Planes {
            y: Plane {
                data: &y,
                row_stride: usize::MAX,
                pixel_stride: 1,
            },
            u: packed(&uv),
            v: packed(&uv),
        };
        assert_eq!(
            yuv420_to_nv21(&planes, geometry).err(),
            Some(FrameError::SizeMismatch {
                expected: usize::MAX,
                actual: 4
            })
        );

        let wide = Plane {
            data: &y,
            row_stride: 1,
            pixel_stride: usize::MAX,
        };
        assert_eq!(
            wide.offset(2, 1).err(),
            Some(FrameError::SizeMismatch {
                expected: usize::MAX,
                actual: 4
            })
        );
    }
}
