// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{FrameError, Result};
use core::fmt;
use std::marker::PhantomData;

/// Pixel encodings understood by the pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    /// YUV 4:2:0 semi-planar: full resolution Y plane followed by one
    /// interleaved V,U plane at half resolution in both directions.
    Nv21,
    /// Interleaved 8-bit R, G, B, A.
    Rgba,
    /// Single 8-bit luma channel.
    Gray,
}

impl PixelEncoding {
    /// Bytes of one row of the first plane.
    pub const fn row_stride(self, width: usize) -> usize {
        match self {
            PixelEncoding::Nv21 => width,
            PixelEncoding::Rgba => 4 * width,
            PixelEncoding::Gray => width,
        }
    }

    /// Total number of bytes for an image of this encoding.
    pub const fn image_size(self, geometry: Geometry) -> usize {
        let plane = self.row_stride(geometry.width) * geometry.height;
        match self {
            PixelEncoding::Nv21 => plane + geometry.width * (geometry.height / 2),
            _ => plane,
        }
    }
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PixelEncoding::Nv21 => "NV21",
            PixelEncoding::Rgba => "RGBA",
            PixelEncoding::Gray => "GRAY",
        };
        f.write_str(name)
    }
}

/// Image dimensions for one pipeline invocation.
///
/// A `Geometry` can only be built from positive dimensions whose largest
/// image (RGBA) fits in memory addressing, so size computations on it never
/// overflow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Geometry {
    width: usize,
    height: usize,
}

impl Geometry {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 {
            return Err(FrameError::geometry(width, height, "width must be positive"));
        }
        if height <= 0 {
            return Err(FrameError::geometry(width, height, "height must be positive"));
        }
        let (w, h) = (width as usize, height as usize);
        if w.checked_mul(h).and_then(|n| n.checked_mul(4)).is_none() {
            return Err(FrameError::geometry(width, height, "image too large"));
        }
        Ok(Self {
            width: w,
            height: h,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> usize {
        self.width * self.height
    }

    /// Checks the geometry against the subsampling needs of `encoding`.
    ///
    /// NV21 carries one chroma pair per 2x2 luma block, so the height must
    /// be even. The width must be even too: each chroma row is `width` bytes
    /// of interleaved V,U pairs, and an odd width would split the last pair.
    pub fn check(&self, encoding: PixelEncoding) -> Result<()> {
        if encoding == PixelEncoding::Nv21 {
            if self.height % 2 != 0 {
                return Err(self.invalid("NV21 requires an even height"));
            }
            if self.width % 2 != 0 {
                return Err(
                    self.invalid("NV21 requires an even width (V,U pairs per row)")
                );
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: &'static str) -> FrameError {
        FrameError::InvalidGeometry {
            width: self.width as i64,
            height: self.height as i64,
            reason,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Type-level tag for the encoding of an [`Image`] or [`ImageView`].
pub trait Encoding: Copy + fmt::Debug + 'static {
    const KIND: PixelEncoding;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Nv21;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgba;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Gray;

impl Encoding for Nv21 {
    const KIND: PixelEncoding = PixelEncoding::Nv21;
}

impl Encoding for Rgba {
    const KIND: PixelEncoding = PixelEncoding::Rgba;
}

impl Encoding for Gray {
    const KIND: PixelEncoding = PixelEncoding::Gray;
}

fn check_len<E: Encoding>(len: usize, geometry: Geometry) -> Result<()> {
    geometry.check(E::KIND)?;
    let expected = E::KIND.image_size(geometry);
    if len != expected {
        return Err(FrameError::SizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Owned image in a fixed encoding.
///
/// Each pipeline stage produces an `Image` and hands it to the next stage by
/// value.
#[derive(Clone, PartialEq, Eq)]
pub struct Image<E: Encoding> {
    data: Vec<u8>,
    geometry: Geometry,
    encoding: PhantomData<E>,
}

impl<E: Encoding> Image<E> {
    /// Allocates a zero-filled image.
    pub fn new(geometry: Geometry) -> Result<Self> {
        geometry.check(E::KIND)?;
        Ok(Self {
            data: vec![0; E::KIND.image_size(geometry)],
            geometry,
            encoding: PhantomData,
        })
    }

    /// Wraps existing pixel bytes, which must match the geometry exactly.
    pub fn from_vec(data: Vec<u8>, geometry: Geometry) -> Result<Self> {
        check_len::<E>(data.len(), geometry)?;
        Ok(Self {
            data,
            geometry,
            encoding: PhantomData,
        })
    }

    /// Builds an image from bytes already known to fit `geometry`.
    pub(crate) fn from_parts(data: Vec<u8>, geometry: Geometry) -> Self {
        debug_assert_eq!(data.len(), E::KIND.image_size(geometry));
        Self {
            data,
            geometry,
            encoding: PhantomData,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn encoding(&self) -> PixelEncoding {
        E::KIND
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn view(&self) -> ImageView<'_, E> {
        ImageView {
            data: &self.data,
            geometry: self.geometry,
            encoding: PhantomData,
        }
    }
}

impl<E: Encoding> fmt::Debug for Image<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Image")
            .field("geometry", &self.geometry)
            .field("encoding", &E::KIND)
            .field("size", &self.data.len())
            .finish()
    }
}

impl<E: Encoding> fmt::Display for Image<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} bytes", self.geometry, E::KIND, self.data.len())
    }
}

impl Image<Gray> {
    pub fn put(&mut self, x: usize, y: usize, value: u8) {
        let stride = self.geometry.width;
        self.data[y * stride + x] = value;
    }
}

/// Borrowed, read-only image over a flat byte slice.
///
/// All pixel accessors go through this type so the plane layout of each
/// encoding lives in one place.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, E: Encoding> {
    data: &'a [u8],
    geometry: Geometry,
    encoding: PhantomData<E>,
}

impl<'a, E: Encoding> ImageView<'a, E> {
    pub fn new(data: &'a [u8], geometry: Geometry) -> Result<Self> {
        check_len::<E>(data.len(), geometry)?;
        Ok(Self {
            data,
            geometry,
            encoding: PhantomData,
        })
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Copies the viewed bytes into an owned image.
    pub fn to_image(&self) -> Image<E> {
        Image {
            data: self.data.to_vec(),
            geometry: self.geometry,
            encoding: PhantomData,
        }
    }

    fn row(&self, y: usize) -> &'a [u8] {
        let stride = E::KIND.row_stride(self.geometry.width);
        &self.data[y * stride..(y + 1) * stride]
    }
}

impl<'a> ImageView<'a, Nv21> {
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.geometry.width + x]
    }

    /// Chroma pair `(v, u)` shared by the 2x2 luma block containing (x, y).
    pub fn chroma(&self, x: usize, y: usize) -> (u8, u8) {
        let width = self.geometry.width;
        let offset = width * self.geometry.height + (y / 2) * width + (x / 2) * 2;
        (self.data[offset], self.data[offset + 1])
    }

    pub fn luma_row(&self, y: usize) -> &'a [u8] {
        self.row(y)
    }

    /// Interleaved V,U bytes covering luma rows `2 * (y / 2)` and the one
    /// after it.
    pub fn chroma_row(&self, y: usize) -> &'a [u8] {
        let width = self.geometry.width;
        let start = width * self.geometry.height + (y / 2) * width;
        &self.data[start..start + width]
    }
}

impl<'a> ImageView<'a, Rgba> {
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * self.geometry.width + x) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[offset..offset + 4]);
        px
    }

    pub fn pixel_row(&self, y: usize) -> &'a [u8] {
        self.row(y)
    }
}

impl<'a> ImageView<'a, Gray> {
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.geometry.width + x]
    }

    /// Reads with the border replicated, so any coordinate is valid.
    pub fn get_clamped(&self, x: isize, y: isize) -> u8 {
        let x = x.clamp(0, self.geometry.width as isize - 1) as usize;
        let y = y.clamp(0, self.geometry.height as isize - 1) as usize;
        self.get(x, y)
    }

    pub fn gray_row(&self, y: usize) -> &'a [u8] {
        self.row(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        let geometry = Geometry::new(1920, 1080).unwrap();
        assert_eq!(PixelEncoding::Nv21.image_size(geometry), 3110400);
        assert_eq!(PixelEncoding::Rgba.image_size(geometry), 8294400);
        assert_eq!(PixelEncoding::Gray.image_size(geometry), 2073600);
    }

    #[test]
    fn geometry_rejects_non_positive() {
        assert!(matches!(
            Geometry::new(0, 4),
            Err(FrameError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            Geometry::new(4, -2),
            Err(FrameError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn nv21_needs_even_dimensions() {
        let odd = Geometry::new(4, 3).unwrap();
        assert!(matches!(
            Image::<Nv21>::new(odd),
            Err(FrameError::InvalidGeometry { .. })
        ));
        let odd_width = Geometry::new(3, 4).unwrap();
        assert_eq!(
            odd_width.check(PixelEncoding::Nv21),
            Err(FrameError::InvalidGeometry {
                width: 3,
                height: 4,
                reason: "NV21 requires an even width (V,U pairs per row)"
            })
        );
        assert!(Image::<Rgba>::new(odd).is_ok());
        assert!(Image::<Gray>::new(odd).is_ok());
    }

    #[test]
    fn view_length_is_checked() {
        let geometry = Geometry::new(2, 2).unwrap();
        let bytes = [0u8; 15];
        assert_eq!(
            ImageView::<Rgba>::new(&bytes, geometry).unwrap_err(),
            FrameError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn nv21_accessors() {
        let geometry = Geometry::new(4, 2).unwrap();
        // Y plane 0..8, then V,U pairs for the two 2x2 blocks.
        let bytes: Vec<u8> = (0..8).chain([100, 101, 102, 103]).collect();
        let view = ImageView::<Nv21>::new(&bytes, geometry).unwrap();
        assert_eq!(view.luma(3, 1), 7);
        assert_eq!(view.chroma(0, 0), (100, 101));
        assert_eq!(view.chroma(1, 1), (100, 101));
        assert_eq!(view.chroma(2, 0), (102, 103));
        assert_eq!(view.chroma(3, 1), (102, 103));
    }

    #[test]
    fn clamped_reads_replicate_border() {
        let geometry = Geometry::new(2, 2).unwrap();
        let bytes = [1, 2, 3, 4];
        let view = ImageView::<Gray>::new(&bytes, geometry).unwrap();
        assert_eq!(view.get_clamped(-5, -5), 1);
        assert_eq!(view.get_clamped(9, 0), 2);
        assert_eq!(view.get_clamped(0, 9), 3);
        assert_eq!(view.get_clamped(9, 9), 4);
    }
}
