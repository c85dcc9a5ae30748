// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    convert,
    edges::{self, Thresholds},
    error::{FrameError, Result},
    foreign::{self, HostBuffer},
    image::{Geometry, Gray, Image, Nv21, PixelEncoding, Rgba},
    package::{self, BufferProvider},
};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Per-call pipeline settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Encoding of the host input buffer. The output is always RGBA.
    pub input: PixelEncoding,
    pub thresholds: Thresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PixelEncoding::Rgba,
            thresholds: Thresholds::default(),
        }
    }
}

/// Measurements of one processed frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameStats {
    /// Time spent converting and filtering, excluding packaging.
    pub elapsed: Duration,
    pub edge_pixels: usize,
}

/// Successful result of [`process_frame`].
#[derive(Debug)]
pub enum FrameOutcome<B> {
    /// A new buffer holding the RGBA edge mask.
    Processed { buffer: B, stats: FrameStats },
    /// The input length did not match the declared geometry. The caller's
    /// own input buffer stands as the result, untouched; no new buffer was
    /// allocated.
    Passthrough { expected: usize, actual: usize },
}

impl<B> FrameOutcome<B> {
    pub fn is_passthrough(&self) -> bool {
        matches!(self, FrameOutcome::Passthrough { .. })
    }

    pub fn into_buffer(self) -> Option<B> {
        match self {
            FrameOutcome::Processed { buffer, .. } => Some(buffer),
            FrameOutcome::Passthrough { .. } => None,
        }
    }
}

/// Runs the edge filter on an RGBA host frame with the default thresholds.
///
/// See [`process_frame_with`].
pub fn process_frame<H, P>(
    input: &H,
    width: i32,
    height: i32,
    provider: &P,
) -> Result<FrameOutcome<P::Buffer>>
where
    H: HostBuffer + ?Sized,
    P: BufferProvider,
{
    process_frame_with(input, width, height, &PipelineConfig::default(), provider)
}

/// Borrows the host frame, decodes it to gray, detects edges, encodes the
/// mask as RGBA and copies it into a buffer from `provider`.
///
/// A length mismatch between `input` and the declared geometry is not an
/// error: it yields [`FrameOutcome::Passthrough`] and the caller keeps using
/// its own input. Every other failure is returned as an error and no output
/// buffer exists.
///
/// The mask is expanded with alpha 255: edge pixels are `[255, 255, 255, 255]`
/// and everything else, including a fully black frame, is `[0, 0, 0, 255]`.
/// Only the colour channels of a non-edge pixel are zero.
#[instrument(level = "debug", skip(input, provider), fields(len = input.len()))]
pub fn process_frame_with<H, P>(
    input: &H,
    width: i32,
    height: i32,
    config: &PipelineConfig,
    provider: &P,
) -> Result<FrameOutcome<P::Buffer>>
where
    H: HostBuffer + ?Sized,
    P: BufferProvider,
{
    let geometry = Geometry::new(width, height)?;
    let start = Instant::now();

    let mask = match decode_edges(input, geometry, config) {
        Err(FrameError::SizeMismatch { expected, actual }) => {
            warn!(expected, actual, "input size mismatch, returning input unchanged");
            return Ok(FrameOutcome::Passthrough { expected, actual });
        }
        other => other?,
    };
    let edge_pixels = edges::count_edges(mask.view());
    let rgba = convert::gray_to_rgba(mask.view())?;
    drop(mask);

    let elapsed = start.elapsed();
    info!("process ms: {}", elapsed.as_millis());

    let buffer = package::package(rgba, provider)?;
    Ok(FrameOutcome::Processed {
        buffer,
        stats: FrameStats {
            elapsed,
            edge_pixels,
        },
    })
}

/// Borrows the input, releases it as soon as the gray image exists, and runs
/// the edge filter.
fn decode_edges<H>(input: &H, geometry: Geometry, config: &PipelineConfig) -> Result<Image<Gray>>
where
    H: HostBuffer + ?Sized,
{
    let gray = match config.input {
        PixelEncoding::Rgba => {
            let frame = foreign::borrow::<_, Rgba>(input, geometry)?;
            convert::rgba_to_gray(frame.view())?
        }
        PixelEncoding::Nv21 => {
            let frame = foreign::borrow::<_, Nv21>(input, geometry)?;
            let rgba = convert::nv21_to_rgba(frame.view())?;
            drop(frame);
            convert::rgba_to_gray(rgba.view())?
        }
        PixelEncoding::Gray => {
            let frame = foreign::borrow::<_, Gray>(input, geometry)?;
            return Ok(edges::canny(frame.view(), config.thresholds));
        }
    };
    Ok(edges::canny(gray.view(), config.thresholds))
}

/// Decodes an NV21 host frame into a new RGBA buffer, without filtering.
///
/// Unlike [`process_frame`], a length mismatch is an ordinary
/// [`FrameError::SizeMismatch`] error.
pub fn nv21_frame_to_rgba<H, P>(input: &H, width: i32, height: i32, provider: &P) -> Result<P::Buffer>
where
    H: HostBuffer + ?Sized,
    P: BufferProvider,
{
    let geometry = Geometry::new(width, height)?;
    let frame = foreign::borrow::<_, Nv21>(input, geometry)?;
    let rgba = convert::nv21_to_rgba(frame.view())?;
    drop(frame);
    package::package(rgba, provider)
}
