// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::os::raw::c_int;
use thiserror::Error;

/// Frame produced and returned to the host.
pub const EDGEVIEW_OK: c_int = 0;
/// Input length disagreed with the declared geometry; the host keeps its own
/// input buffer as the result.
pub const EDGEVIEW_PASSTHROUGH: c_int = 1;
pub const EDGEVIEW_ERR_SIZE_MISMATCH: c_int = -1;
pub const EDGEVIEW_ERR_ACQUISITION_FAILED: c_int = -2;
pub const EDGEVIEW_ERR_INVALID_GEOMETRY: c_int = -3;
pub const EDGEVIEW_ERR_INVALID_THRESHOLDS: c_int = -4;
pub const EDGEVIEW_ERR_ALLOCATION_FAILED: c_int = -5;
/// A panic was caught at the boundary.
pub const EDGEVIEW_ERR_PANIC: c_int = -6;
/// The output descriptor pointer was null.
pub const EDGEVIEW_ERR_NULL_OUTPUT: c_int = -7;

pub type Result<T, E = FrameError> = std::result::Result<T, E>;

/// Terminal failures of a single pipeline invocation.
///
/// None of these are retried internally. Each one maps to a distinct status
/// code at the C boundary, see [`FrameError::status`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("host buffer could not be acquired")]
    AcquisitionFailed,

    #[error("invalid geometry {width}x{height}: {reason}")]
    InvalidGeometry {
        width: i64,
        height: i64,
        reason: &'static str,
    },

    #[error("invalid thresholds: low {low}, high {high} (need 0 <= low <= high <= 255)")]
    InvalidThresholds { low: i32, high: i32 },

    #[error("could not allocate an output buffer of {len} bytes")]
    AllocationFailed { len: usize },
}

impl FrameError {
    pub(crate) fn geometry(width: impl Into<i64>, height: impl Into<i64>, reason: &'static str) -> Self {
        FrameError::InvalidGeometry {
            width: width.into(),
            height: height.into(),
            reason,
        }
    }

    /// Status code reported across the C boundary for this error.
    pub fn status(&self) -> c_int {
        match self {
            FrameError::SizeMismatch { .. } => EDGEVIEW_ERR_SIZE_MISMATCH,
            FrameError::AcquisitionFailed => EDGEVIEW_ERR_ACQUISITION_FAILED,
            FrameError::InvalidGeometry { .. } => EDGEVIEW_ERR_INVALID_GEOMETRY,
            FrameError::InvalidThresholds { .. } => EDGEVIEW_ERR_INVALID_THRESHOLDS,
            FrameError::AllocationFailed { .. } => EDGEVIEW_ERR_ALLOCATION_FAILED,
        }
    }
}
