//! Check tether snapshots for angle, length and clearance violations.
//!
//! Thresholds come from `TETHER_*` environment variables, overridden by
//! the command line flags.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether_cli::{load_input, render_json, render_text, Config};
use tether_core::check_frames;

/// Tether safety checker
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file with a tether array or a frame array
    input: PathBuf,

    /// Maximum angle from vertical in degrees
    #[arg(long)]
    max_angle: Option<f64>,

    /// Maximum tether length in meters
    #[arg(long)]
    max_length: Option<f64>,

    /// Minimum distance between tethers in meters
    #[arg(long)]
    min_distance: Option<f64>,

    /// Decimal places in the report
    #[arg(long)]
    ndigits: Option<u32>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Exit with an error when any violation is found
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tether_check=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = Config::from_env().with_overrides(
        args.max_angle,
        args.max_length,
        args.min_distance,
        args.ndigits,
    );
    let params = config.params()?;
    tracing::debug!("Using thresholds {:?}", params.to_view(config.ndigits));

    let frames = load_input(&args.input)?.into_frames();
    tracing::info!(
        "Checking {} frame(s) from {}",
        frames.len(),
        args.input.display()
    );

    let report = check_frames(&frames, &params)?;

    if args.json {
        println!("{}", render_json(&report, &params, config.ndigits)?);
    } else {
        print!("{}", render_text(&report, &params, config.ndigits));
    }

    if report.summary.has_violations() {
        tracing::warn!("Tether safety violations found");
        if args.strict {
            bail!("tether safety violations found");
        }
    }

    Ok(())
}
