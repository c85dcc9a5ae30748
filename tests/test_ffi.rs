// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgeview::{
    error::{
        EDGEVIEW_ERR_ACQUISITION_FAILED, EDGEVIEW_ERR_INVALID_GEOMETRY,
        EDGEVIEW_ERR_SIZE_MISMATCH, EDGEVIEW_OK, EDGEVIEW_PASSTHROUGH,
    },
    ffi::{
        edgeview_buffer_free, edgeview_init_logging, edgeview_nv21_to_rgba,
        edgeview_process_frame, edgeview_process_frame_with_thresholds, EdgeviewBuffer,
    },
};
use std::{ptr::null, slice::from_raw_parts};

#[test]
fn test_process_frame_ok() {
    edgeview_init_logging();
    let input = vec![0u8; 4 * 4 * 4];
    let mut out = EdgeviewBuffer::empty();
    let status = unsafe { edgeview_process_frame(input.as_ptr(), input.len(), 4, 4, &mut out) };
    assert_eq!(status, EDGEVIEW_OK);
    assert!(!out.data.is_null());
    assert_ne!(out.data.cast_const(), input.as_ptr());
    assert_eq!(out.len, 64);

    let bytes = unsafe { from_raw_parts(out.data, out.len) };
    assert!(bytes.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    unsafe { edgeview_buffer_free(out) };
}

#[test]
fn test_process_frame_passthrough() {
    let input = vec![3u8; 50];
    let mut out = EdgeviewBuffer::empty();
    let status = unsafe { edgeview_process_frame(input.as_ptr(), input.len(), 4, 4, &mut out) };
    assert_eq!(status, EDGEVIEW_PASSTHROUGH);
    assert_eq!(out.data.cast_const(), input.as_ptr());
    assert_eq!(out.len, 50);
    assert!(input.iter().all(|&b| b == 3));
}

#[test]
fn test_process_frame_invalid_geometry() {
    let input = vec![0u8; 16];
    let mut out = EdgeviewBuffer::empty();
    let status = unsafe {
        edgeview_process_frame_with_thresholds(input.as_ptr(), input.len(), -4, 1, 10, 20, &mut out)
    };
    assert_eq!(status, EDGEVIEW_ERR_INVALID_GEOMETRY);
    assert!(out.data.is_null());
}

#[test]
fn test_nv21_to_rgba() {
    let mut input = vec![90u8; 4 * 2];
    input.extend_from_slice(&[128; 4]);
    let mut out = EdgeviewBuffer::empty();
    let status = unsafe { edgeview_nv21_to_rgba(input.as_ptr(), input.len(), 4, 2, &mut out) };
    assert_eq!(status, EDGEVIEW_OK);
    assert_eq!(out.len, 32);
    let bytes = unsafe { from_raw_parts(out.data, out.len) };
    assert!(bytes.chunks_exact(4).all(|px| px == [90, 90, 90, 255]));
    unsafe { edgeview_buffer_free(out) };

    let status = unsafe { edgeview_nv21_to_rgba(input.as_ptr(), 11, 4, 2, &mut out) };
    assert_eq!(status, EDGEVIEW_ERR_SIZE_MISMATCH);
    assert!(out.data.is_null());
}

#[test]
fn test_null_input_never_passes_through() {
    for len in [0, 5, 16] {
        let mut out = EdgeviewBuffer::empty();
        let status = unsafe { edgeview_process_frame(null(), len, 2, 2, &mut out) };
        assert_eq!(status, EDGEVIEW_ERR_ACQUISITION_FAILED, "input_len {len}");
        assert!(out.data.is_null());
        assert_eq!(out.len, 0);

        let status = unsafe { edgeview_nv21_to_rgba(null(), len, 2, 2, &mut out) };
        assert_eq!(status, EDGEVIEW_ERR_ACQUISITION_FAILED, "input_len {len}");
        assert!(out.data.is_null());
        assert_eq!(out.len, 0);
    }
}

#[test]
fn test_free_empty_buffer() {
    unsafe { edgeview_buffer_free(EdgeviewBuffer::empty()) };
}
