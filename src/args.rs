// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use edgeview::{edges::Thresholds, FrameError, PipelineConfig, PixelEncoding};
use std::path::PathBuf;

/// Pixel layout of the raw input file.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum InputFormat {
    /// Interleaved 8-bit RGBA, 4 bytes per pixel
    Rgba,
    /// YUV 4:2:0 semi-planar with V before U, 1.5 bytes per pixel
    Nv21,
    /// 8-bit grayscale, 1 byte per pixel
    Gray,
}

impl From<InputFormat> for PixelEncoding {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Rgba => PixelEncoding::Rgba,
            InputFormat::Nv21 => PixelEncoding::Nv21,
            InputFormat::Gray => PixelEncoding::Gray,
        }
    }
}

/// Command-line arguments for the EdgeView frame tool.
///
/// Runs the edge pipeline once on a raw frame dump and writes the RGBA
/// result. Arguments can be given on the command line or through
/// environment variables.
///
/// # Example
///
/// ```bash
/// edgeview --input frame.nv21 --format nv21 --size 1280 720 --output edges.rgba
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Raw input frame
    #[arg(short, long, env = "EDGEVIEW_INPUT")]
    pub input: PathBuf,

    /// Destination for the RGBA output
    #[arg(short, long, env = "EDGEVIEW_OUTPUT", default_value = "edges.rgba")]
    pub output: PathBuf,

    /// Frame resolution in pixels (width height)
    #[arg(
        short,
        long,
        env = "EDGEVIEW_SIZE",
        default_value = "640 480",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub size: Vec<i32>,

    /// Pixel format of the input frame
    #[arg(short, long, env = "EDGEVIEW_FORMAT", default_value = "rgba", value_enum)]
    pub format: InputFormat,

    /// Hysteresis low threshold (0-255)
    #[arg(long, env = "EDGEVIEW_LOW", default_value = "50")]
    pub low: i32,

    /// Hysteresis high threshold (0-255)
    #[arg(long, env = "EDGEVIEW_HIGH", default_value = "150")]
    pub high: i32,

    /// Print a JSON summary of the run to stdout
    #[arg(long)]
    pub report: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also send logs to the systemd journal
    #[arg(long, env = "JOURNALD")]
    pub journald: bool,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

impl Args {
    pub fn width(&self) -> i32 {
        self.size[0]
    }

    pub fn height(&self) -> i32 {
        self.size[1]
    }
}

impl TryFrom<&Args> for PipelineConfig {
    type Error = FrameError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        Ok(PipelineConfig {
            input: args.format.into(),
            thresholds: Thresholds::new(args.low, args.high)?,
        })
    }
}
