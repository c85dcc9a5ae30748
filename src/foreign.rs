// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Borrowing of caller-owned frame buffers.
//!
//! The host keeps ownership of its frame memory. The pipeline pins it with
//! [`HostBuffer::acquire`], reads it through an [`ImageView`], and unpins it
//! with exactly one [`HostBuffer::release`] when the [`BorrowedFrame`] guard
//! goes out of scope, whichever way the invocation ends.

use crate::{
    error::{FrameError, Result},
    image::{Encoding, Geometry, ImageView},
};
use std::{marker::PhantomData, slice::from_raw_parts};
use tracing::{debug, warn};

/// A byte array owned by the host application.
///
/// Implementations must not keep any global bookkeeping: two invocations on
/// different threads each see only their own buffer.
pub trait HostBuffer {
    /// Length in bytes, available without pinning the array.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pins the array and exposes its contents, or `None` when the host
    /// denies access. A successful call is always paired with one
    /// [`HostBuffer::release`].
    fn acquire(&self) -> Option<&[u8]>;

    /// Unpins the array. Nothing is ever copied back to the host.
    fn release(&self);
}

impl HostBuffer for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn acquire(&self) -> Option<&[u8]> {
        Some(self)
    }

    fn release(&self) {}
}

impl HostBuffer for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn acquire(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }

    fn release(&self) {}
}

/// Host memory handed over as a raw pointer and length.
#[derive(Debug)]
pub struct ForeignSlice<'a> {
    ptr: *const u8,
    len: usize,
    lifetime: PhantomData<&'a [u8]>,
}

impl ForeignSlice<'_> {
    /// Wraps host memory. A null `ptr` is accepted and reported as an
    /// acquisition failure on first access.
    ///
    /// # Safety
    ///
    /// If `ptr` is non-null the caller must ensure that:
    /// - `ptr` points to `len` initialized bytes
    /// - the bytes are not mutated or freed while the `ForeignSlice` is alive
    pub unsafe fn new(ptr: *const u8, len: usize) -> Self {
        Self {
            ptr,
            len,
            lifetime: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }
}

impl HostBuffer for ForeignSlice<'_> {
    fn len(&self) -> usize {
        self.len
    }

    fn acquire(&self) -> Option<&[u8]> {
        if self.ptr.is_null() {
            return None;
        }
        // SAFETY: guaranteed by the contract of `ForeignSlice::new`.
        Some(unsafe { from_raw_parts(self.ptr, self.len) })
    }

    fn release(&self) {}
}

/// Scoped borrow of a host buffer interpreted as an image of encoding `E`.
///
/// Dropping the guard releases the host buffer. The guard only hands out
/// shared views, so the host memory is never written.
pub struct BorrowedFrame<'a, H: HostBuffer + ?Sized, E: Encoding> {
    host: &'a H,
    view: ImageView<'a, E>,
}

impl<'a, H: HostBuffer + ?Sized, E: Encoding> BorrowedFrame<'a, H, E> {
    pub fn view(&self) -> ImageView<'a, E> {
        self.view
    }

    pub fn geometry(&self) -> Geometry {
        self.view.geometry()
    }
}

impl<H: HostBuffer + ?Sized, E: Encoding> Drop for BorrowedFrame<'_, H, E> {
    fn drop(&mut self) {
        self.host.release();
        debug!("host buffer released");
    }
}

/// Borrows `host` as an image of encoding `E` and size `geometry`.
///
/// The declared length is checked before the host array is pinned, so a
/// mismatch costs nothing and needs no release.
///
/// # Errors
///
/// - [`FrameError::InvalidGeometry`] if `geometry` cannot hold `E`
/// - [`FrameError::SizeMismatch`] if the buffer length disagrees with the
///   geometry
/// - [`FrameError::AcquisitionFailed`] if the host denies access
pub fn borrow<'a, H, E>(host: &'a H, geometry: Geometry) -> Result<BorrowedFrame<'a, H, E>>
where
    H: HostBuffer + ?Sized,
    E: Encoding,
{
    geometry.check(E::KIND)?;
    let expected = E::KIND.image_size(geometry);
    let actual = host.len();
    if actual != expected {
        warn!(expected, actual, "host buffer size mismatch");
        return Err(FrameError::SizeMismatch { expected, actual });
    }

    let Some(data) = host.acquire() else {
        warn!("host denied access to buffer");
        return Err(FrameError::AcquisitionFailed);
    };
    debug!(len = data.len(), encoding = %E::KIND, "host buffer acquired");

    match ImageView::new(data, geometry) {
        Ok(view) => Ok(BorrowedFrame { host, view }),
        Err(err) => {
            host.release();
            Err(err)
        }
    }
}
