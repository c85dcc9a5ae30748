// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Copying processed frames into caller-visible buffers.
//!
//! Where the output memory comes from is up to a [`BufferProvider`]: Rust
//! callers get a `Vec<u8>`, C hosts get memory from `malloc` which they hand
//! back through `edgeview_buffer_free`.

use crate::{
    error::{FrameError, Result},
    image::{Geometry, Image, ImageView, Rgba},
};
use std::{
    ops::{Deref, DerefMut},
    ptr::NonNull,
    slice::{from_raw_parts, from_raw_parts_mut},
};
use tracing::{debug, error};

/// Source of output buffers.
pub trait BufferProvider {
    type Buffer: AsRef<[u8]> + AsMut<[u8]>;

    /// Returns a buffer of exactly `len` bytes, contents unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::AllocationFailed`] when no such buffer can be
    /// obtained.
    fn allocate(&self, len: usize) -> Result<Self::Buffer>;
}

/// Allocates output buffers on the Rust heap, reporting exhaustion instead of
/// aborting.
#[derive(Copy, Clone, Debug, Default)]
pub struct VecProvider;

impl BufferProvider for VecProvider {
    type Buffer = Vec<u8>;

    fn allocate(&self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| FrameError::AllocationFailed { len })?;
        buf.resize(len, 0);
        Ok(buf)
    }
}

/// Allocates output buffers with the C allocator so a C host can own them.
#[derive(Copy, Clone, Debug, Default)]
pub struct MallocProvider;

impl BufferProvider for MallocProvider {
    type Buffer = MallocBuffer;

    fn allocate(&self, len: usize) -> Result<MallocBuffer> {
        // SAFETY: plain allocation, the result is checked for null below.
        let ptr = unsafe { libc::malloc(len.max(1)) }.cast::<u8>();
        let Some(ptr) = NonNull::new(ptr) else {
            return Err(FrameError::AllocationFailed { len });
        };
        debug!(len, "output buffer allocated");
        Ok(MallocBuffer { ptr, len })
    }
}

/// A `malloc`ed byte buffer, freed on drop unless handed over with
/// [`MallocBuffer::into_raw`].
#[derive(Debug)]
pub struct MallocBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl MallocBuffer {
    /// Gives up ownership; the memory must later be passed to `libc::free`,
    /// directly or through [`MallocBuffer::from_raw`].
    pub fn into_raw(self) -> (*mut u8, usize) {
        let raw = (self.ptr.as_ptr(), self.len);
        std::mem::forget(self);
        raw
    }

    /// Takes back ownership of a buffer released with
    /// [`MallocBuffer::into_raw`]. Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` and `len` must come from one `into_raw` call, and the buffer
    /// must not have been freed or reclaimed already.
    pub unsafe fn from_raw(ptr: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, len })
    }
}

impl Deref for MallocBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: `ptr` owns at least `len` bytes for the lifetime of self.
        unsafe { from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for MallocBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl AsRef<[u8]> for MallocBuffer {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl AsMut<[u8]> for MallocBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl Drop for MallocBuffer {
    fn drop(&mut self) {
        // SAFETY: allocated by `libc::malloc` and owned by self.
        unsafe { libc::free(self.ptr.as_ptr().cast()) };
        debug!(len = self.len, "output buffer freed");
    }
}

/// Copies an RGBA image, row-major and byte for byte, into a new buffer from
/// `provider`.
///
/// # Errors
///
/// Returns [`FrameError::AllocationFailed`] if the provider cannot supply a
/// buffer of exactly `width * height * 4` bytes. Nothing has been written
/// anywhere in that case.
pub fn package<P: BufferProvider>(image: Image<Rgba>, provider: &P) -> Result<P::Buffer> {
    let len = image.size();
    let mut buffer = provider.allocate(len)?;
    let out = buffer.as_mut();
    if out.len() != len {
        error!(requested = len, got = out.len(), "provider returned a wrong-sized buffer");
        return Err(FrameError::AllocationFailed { len });
    }
    out.copy_from_slice(image.as_slice());
    Ok(buffer)
}

/// Reads a packaged RGBA buffer back into an owned image.
pub fn unpackage(bytes: &[u8], geometry: Geometry) -> Result<Image<Rgba>> {
    Ok(ImageView::<Rgba>::new(bytes, geometry)?.to_image())
}
