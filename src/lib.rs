// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # EdgeView Frame Pipeline
//!
//! This library runs an edge detection filter on one camera frame handed over
//! by a host application and returns the result as a new RGBA buffer. It is
//! built both as a Rust library and as a shared object exposing a C ABI.
//!
//! ## Pipeline
//!
//! - **Foreign buffers**: the host frame is borrowed without copying and
//!   released exactly once on every path ([`foreign`]).
//! - **Color conversion**: NV21 → RGBA, RGBA → gray and gray → RGBA with
//!   fixed-point integer arithmetic ([`convert`]).
//! - **Edge detection**: blur, Sobel gradients, non-maximum suppression and
//!   hysteresis thresholding ([`edges`]).
//! - **Packaging**: the RGBA mask is copied into a buffer obtained from a
//!   pluggable [`package::BufferProvider`].
//!
//! ## Example
//!
//! ```
//! use edgeview::{package::VecProvider, pipeline::{process_frame, FrameOutcome}};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = vec![0u8; 4 * 4 * 4];
//! match process_frame(&frame, 4, 4, &VecProvider)? {
//!     FrameOutcome::Processed { buffer, stats } => {
//!         assert_eq!(buffer.len(), 64);
//!         assert_eq!(stats.edge_pixels, 0);
//!     }
//!     FrameOutcome::Passthrough { .. } => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! Raw host memory is only touched in [`foreign::ForeignSlice`],
//! [`package::MallocBuffer`] and the [`ffi`] entry points. Everything else
//! works on bounds-checked slices.

pub mod convert;
pub mod edges;
pub mod error;
pub mod ffi;
pub mod foreign;
pub mod image;
pub mod package;
pub mod pipeline;

pub use error::{FrameError, Result};
pub use image::{Geometry, Image, ImageView, PixelEncoding};
pub use pipeline::{process_frame, process_frame_with, FrameOutcome, PipelineConfig};
