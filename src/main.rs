// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use clap::Parser;
use edgeview::{package::VecProvider, process_frame_with, FrameOutcome, PipelineConfig};
use serde_json::json;
use std::{error::Error, fs};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;

fn init_tracing(args: &Args) -> Result<(), Box<dyn Error>> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let journald = if args.journald {
        Some(tracing_journald::layer()?)
    } else {
        None
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(journald);

    #[cfg(feature = "tracy")]
    let registry = registry.with(if args.tracy {
        tracy_client::Client::start();
        Some(tracing_tracy::TracyLayer::default())
    } else {
        None
    });

    registry.try_init()?;

    #[cfg(not(feature = "tracy"))]
    if args.tracy {
        warn!("built without the tracy feature, --tracy is ignored");
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    let config = PipelineConfig::try_from(&args)?;
    let input = fs::read(&args.input)?;
    info!(
        "loaded {} ({} bytes) as {}x{} {}",
        args.input.display(),
        input.len(),
        args.width(),
        args.height(),
        config.input
    );

    let outcome = process_frame_with(&input, args.width(), args.height(), &config, &VecProvider)?;

    let summary = match &outcome {
        FrameOutcome::Processed { buffer, stats } => {
            fs::write(&args.output, buffer)?;
            info!(
                "wrote {} ({} edge pixels)",
                args.output.display(),
                stats.edge_pixels
            );
            json!({
                "outcome": "processed",
                "elapsed_ms": stats.elapsed.as_secs_f64() * 1000.0,
                "edge_pixels": stats.edge_pixels,
                "output_bytes": buffer.len(),
            })
        }
        FrameOutcome::Passthrough { expected, actual } => {
            warn!(
                "expected {} bytes but {} has {}, copying input unchanged",
                expected,
                args.input.display(),
                actual
            );
            fs::write(&args.output, &input)?;
            json!({
                "outcome": "passthrough",
                "expected_bytes": expected,
                "output_bytes": actual,
            })
        }
    };

    if args.report {
        let report = json!({
            "input": args.input.display().to_string(),
            "output": args.output.display().to_string(),
            "width": args.width(),
            "height": args.height(),
            "format": config.input.to_string(),
            "low": config.thresholds.low(),
            "high": config.thresholds.high(),
            "result": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
