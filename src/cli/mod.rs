//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod compare;
mod palette;
mod scan;
mod sheet;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, ScanConfig};
use crate::geometry::{Bounds, Point};
use crate::offsets::MarkerSelection;
use crate::output::write_report;
use crate::sheet::FrameGrid;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Spritescan - coverage boxes, marker anchors and frame dedup for sprite sheets
#[derive(Parser)]
#[command(name = "spritescan")]
#[command(about = "Spritescan - coverage boxes, marker anchors and frame dedup for sprite sheets")]
#[command(version)]
pub struct Cli {
    /// Path to spritescan.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tight box around non-transparent pixels of an image
    Bounds {
        /// Input PNG file
        input: PathBuf,

        /// Limit the search to a region: x,y,width,height
        #[arg(long, value_parser = parse_region)]
        region: Option<Bounds>,

        /// Make the box symmetric around this point: x,y
        #[arg(long, value_parser = parse_point)]
        center: Option<Point>,

        /// Round the box up to a multiple of 8 in both dimensions
        #[arg(long)]
        round: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract marker-pixel anchors (center, head, hands) from an image
    Offsets {
        /// Input PNG file
        input: PathBuf,

        /// Region to scan: x,y,width,height (default: whole image)
        #[arg(long, value_parser = parse_region)]
        region: Option<Bounds>,

        /// Marker colors to detect: letters from k (black), r, g, b, w (white), or all/none
        #[arg(long)]
        markers: Option<MarkerSelection>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect the opaque colors used across images
    Palette {
        /// PNG files, directories or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write the palette to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare two frames (exit code 0 when equal, 1 when different)
    Compare {
        /// First image
        a: PathBuf,

        /// Second image
        b: PathBuf,

        /// Compare against the horizontally mirrored second image
        #[arg(long)]
        flip: bool,

        /// Compare line art (opaque black pixels) only
        #[arg(long)]
        lineart: bool,

        /// Also require the marker anchors to match
        #[arg(long)]
        offsets: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze every frame of a sprite sheet
    Sheet {
        /// Input PNG sprite sheet
        input: PathBuf,

        /// Frame size, e.g. 32x32 (default: [sheet] in spritescan.toml)
        #[arg(long)]
        frame: Option<FrameGrid>,

        /// Marker colors to detect: letters from k (black), r, g, b, w (white), or all/none
        #[arg(long)]
        markers: Option<MarkerSelection>,

        /// Do not match frames against mirrored frames
        #[arg(long)]
        no_flip: bool,

        /// Deduplicate on line art only
        #[arg(long)]
        lineart: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse a region argument `x,y,width,height`.
pub fn parse_region(s: &str) -> Result<Bounds, String> {
    let parts = parse_ints(s, 4)?;
    if parts[2] < 0 || parts[3] < 0 {
        return Err(format!("region size must not be negative: '{}'", s));
    }
    Ok(Bounds::from_origin_size(parts[0], parts[1], parts[2], parts[3]))
}

/// Parse a point argument `x,y`.
pub fn parse_point(s: &str) -> Result<Point, String> {
    let parts = parse_ints(s, 2)?;
    Ok(Point::new(parts[0], parts[1]))
}

fn parse_ints(s: &str, count: usize) -> Result<Vec<i32>, String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>().map_err(|_| format!("invalid integer '{}' in '{}'", p, s)))
        .collect::<Result<_, _>>()?;
    if parts.len() != count {
        return Err(format!("expected {} comma-separated integers, got '{}'", count, s));
    }
    Ok(parts)
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy(),
        )
        .try_init();
}

/// Load the config file and apply CLI overrides, reporting errors.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<ScanConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            Ok(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
    }
}

/// Serialize `value` as pretty JSON and write it out.
pub(crate) fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> ExitCode {
    let text = match serde_json::to_string_pretty(value) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    emit_text(&text, output)
}

/// Write plain text output.
pub(crate) fn emit_text(text: &str, output: Option<&Path>) -> ExitCode {
    match write_report(text, output) {
        Ok(()) => {
            if let Some(path) = output {
                eprintln!("Wrote: {}", path.display());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Bounds { input, region, center, round, json } => {
            scan::run_bounds(&input, region, center, round, json)
        }
        Commands::Offsets { input, region, markers, json } => {
            scan::run_offsets(&input, region, markers, config, json)
        }
        Commands::Palette { inputs, json, output } => {
            palette::run_palette(&inputs, json, output.as_deref())
        }
        Commands::Compare { a, b, flip, lineart, offsets, json } => {
            compare::run_compare(&a, &b, flip, lineart, offsets, json)
        }
        Commands::Sheet { input, frame, markers, no_flip, lineart, json, output } => {
            let overrides = CliOverrides {
                markers,
                grid: frame,
                flip: no_flip.then_some(false),
                lineart: lineart.then_some(true),
            };
            sheet::run_sheet(&input, config, &overrides, json, output.as_deref())
        }
    }
}
