// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! C ABI for hosts loading the library as a shared object.
//!
//! Every entry point reports a status code (see [`crate::error`]) and fills
//! an [`EdgeviewBuffer`] descriptor. Panics never cross the boundary.

use crate::{
    edges::{Thresholds, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD},
    error::{
        FrameError, EDGEVIEW_ERR_NULL_OUTPUT, EDGEVIEW_ERR_PANIC, EDGEVIEW_OK,
        EDGEVIEW_PASSTHROUGH,
    },
    foreign::ForeignSlice,
    image::PixelEncoding,
    package::{MallocBuffer, MallocProvider},
    pipeline::{self, FrameOutcome, PipelineConfig},
};
use std::{
    os::raw::c_int,
    panic::{self, AssertUnwindSafe},
    ptr::null_mut,
};
use tracing::error;

/// Byte buffer descriptor exchanged with the host.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct EdgeviewBuffer {
    pub data: *mut u8,
    pub len: usize,
}

impl EdgeviewBuffer {
    pub const fn empty() -> Self {
        Self {
            data: null_mut(),
            len: 0,
        }
    }

    fn from_malloc(buffer: MallocBuffer) -> Self {
        let (data, len) = buffer.into_raw();
        Self { data, len }
    }
}

fn report(err: &FrameError) -> c_int {
    error!("{}", err);
    err.status()
}

/// Runs `f` with `out` cleared first, catching panics.
unsafe fn guarded<F>(out: *mut EdgeviewBuffer, f: F) -> c_int
where
    F: FnOnce(&mut EdgeviewBuffer) -> c_int,
{
    if out.is_null() {
        error!("null output descriptor");
        return EDGEVIEW_ERR_NULL_OUTPUT;
    }
    *out = EdgeviewBuffer::empty();
    let slot = &mut *out;
    match panic::catch_unwind(AssertUnwindSafe(|| f(slot))) {
        Ok(status) => status,
        Err(_) => {
            error!("panic caught at the library boundary");
            *out = EdgeviewBuffer::empty();
            EDGEVIEW_ERR_PANIC
        }
    }
}

/// Runs the edge filter on an RGBA frame with thresholds 50 and 150.
///
/// On `EDGEVIEW_OK`, `out` holds a new `width * height * 4` byte RGBA buffer
/// that must be released with [`edgeview_buffer_free`].
///
/// On `EDGEVIEW_PASSTHROUGH` the input length did not match
/// `width * height * 4`; `out` points back at `input` with `input_len`, and
/// must not be freed.
///
/// On any negative status `out` is empty. A null `input` is reported as
/// `EDGEVIEW_ERR_ACQUISITION_FAILED` whatever `input_len` says.
///
/// # Safety
///
/// - `input` must be null or point to `input_len` readable bytes that stay
///   valid and unmodified for the duration of the call.
/// - `out` must be null or point to writable memory for one
///   `EdgeviewBuffer`.
#[no_mangle]
pub unsafe extern "C" fn edgeview_process_frame(
    input: *const u8,
    input_len: usize,
    width: i32,
    height: i32,
    out: *mut EdgeviewBuffer,
) -> c_int {
    edgeview_process_frame_with_thresholds(
        input,
        input_len,
        width,
        height,
        c_int::from(DEFAULT_LOW_THRESHOLD),
        c_int::from(DEFAULT_HIGH_THRESHOLD),
        out,
    )
}

/// Same as [`edgeview_process_frame`] with caller-chosen thresholds,
/// `0 <= low <= high <= 255`.
///
/// # Safety
///
/// See [`edgeview_process_frame`].
#[no_mangle]
pub unsafe extern "C" fn edgeview_process_frame_with_thresholds(
    input: *const u8,
    input_len: usize,
    width: i32,
    height: i32,
    low: c_int,
    high: c_int,
    out: *mut EdgeviewBuffer,
) -> c_int {
    guarded(out, |out| {
        if input.is_null() {
            return report(&FrameError::AcquisitionFailed);
        }
        let thresholds = match Thresholds::new(low, high) {
            Ok(t) => t,
            Err(err) => return report(&err),
        };
        let config = PipelineConfig {
            input: PixelEncoding::Rgba,
            thresholds,
        };
        // SAFETY: forwarded from the caller contract.
        let host = unsafe { ForeignSlice::new(input, input_len) };
        match pipeline::process_frame_with(&host, width, height, &config, &MallocProvider) {
            Ok(FrameOutcome::Processed { buffer, .. }) => {
                *out = EdgeviewBuffer::from_malloc(buffer);
                EDGEVIEW_OK
            }
            Ok(FrameOutcome::Passthrough { .. }) => {
                *out = EdgeviewBuffer {
                    data: input.cast_mut(),
                    len: input_len,
                };
                EDGEVIEW_PASSTHROUGH
            }
            Err(err) => report(&err),
        }
    })
}

/// Converts an NV21 frame to a new RGBA buffer without filtering.
///
/// On `EDGEVIEW_OK`, `out` holds `width * height * 4` bytes to be released
/// with [`edgeview_buffer_free`]. A length mismatch is reported as
/// `EDGEVIEW_ERR_SIZE_MISMATCH`, a null `input` as
/// `EDGEVIEW_ERR_ACQUISITION_FAILED`.
///
/// # Safety
///
/// See [`edgeview_process_frame`].
#[no_mangle]
pub unsafe extern "C" fn edgeview_nv21_to_rgba(
    input: *const u8,
    input_len: usize,
    width: i32,
    height: i32,
    out: *mut EdgeviewBuffer,
) -> c_int {
    guarded(out, |out| {
        if input.is_null() {
            return report(&FrameError::AcquisitionFailed);
        }
        // SAFETY: forwarded from the caller contract.
        let host = unsafe { ForeignSlice::new(input, input_len) };
        match pipeline::nv21_frame_to_rgba(&host, width, height, &MallocProvider) {
            Ok(buffer) => {
                *out = EdgeviewBuffer::from_malloc(buffer);
                EDGEVIEW_OK
            }
            Err(err) => report(&err),
        }
    })
}

/// Releases a buffer returned with `EDGEVIEW_OK`. Null data is ignored.
///
/// # Safety
///
/// `buffer` must be exactly as returned by this library with `EDGEVIEW_OK`
/// and not freed before. Passthrough buffers belong to the host and must not
/// be passed here.
#[no_mangle]
pub unsafe extern "C" fn edgeview_buffer_free(buffer: EdgeviewBuffer) {
    drop(MallocBuffer::from_raw(buffer.data, buffer.len));
}

/// Sends the library's log output to stderr. Later calls, or calls after the
/// host installed its own subscriber, have no effect.
#[no_mangle]
pub extern "C" fn edgeview_init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
