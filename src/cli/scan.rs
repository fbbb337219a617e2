//! CLI dispatch for the `bounds` and `offsets` commands.

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use crate::config::CliOverrides;
use crate::coverage::covered_bounds;
use crate::geometry::{center_bounds, round_up_box, Bounds, Point};
use crate::offsets::{offsets_from_rgb, MarkerOffsets, MarkerSelection, OffsetBundle};
use crate::output::load_rgba;

use super::{emit_json, emit_text, resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS};

#[derive(Serialize)]
struct BoundsOutput {
    empty: bool,
    covered: Bounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    centered: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rounded: Option<Bounds>,
}

#[derive(Serialize)]
struct OffsetsOutput {
    #[serde(flatten)]
    anchors: OffsetBundle,
    white: Option<Point>,
}

impl From<MarkerOffsets> for OffsetsOutput {
    fn from(offsets: MarkerOffsets) -> Self {
        Self { white: offsets.white, anchors: offsets.into() }
    }
}

fn load_or_exit(input: &Path) -> Result<image::RgbaImage, ExitCode> {
    load_rgba(input).map_err(|e| {
        eprintln!("Error: Cannot load '{}': {}", input.display(), e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

fn format_point(p: Option<Point>) -> String {
    p.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Execute the bounds command.
pub fn run_bounds(
    input: &Path,
    region: Option<Bounds>,
    center: Option<Point>,
    round: bool,
    json: bool,
) -> ExitCode {
    let image = match load_or_exit(input) {
        Ok(img) => img,
        Err(code) => return code,
    };

    let covered = covered_bounds(&image, region);
    let empty = covered.is_degenerate();
    let centered = match center {
        Some(c) if !empty => Some(center_bounds(covered, c).to_bounds()),
        _ => None,
    };
    let rounded = if round && !empty { Some(round_up_box(centered.unwrap_or(covered))) } else { None };

    if json {
        return emit_json(&BoundsOutput { empty, covered, centered, rounded }, None);
    }

    let mut lines = Vec::new();
    if empty {
        lines.push("covered: empty".to_string());
    } else {
        lines.push(format!("covered: {}", covered));
        if let Some(b) = centered {
            lines.push(format!("centered: {}", b));
        }
        if let Some(b) = rounded {
            lines.push(format!("rounded: {} ({}x{})", b, b.width(), b.height()));
        }
    }
    emit_text(&lines.join("\n"), None)
}

/// Execute the offsets command.
pub fn run_offsets(
    input: &Path,
    region: Option<Bounds>,
    markers: Option<MarkerSelection>,
    config_path: Option<&Path>,
    json: bool,
) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides { markers, ..Default::default() }) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let image = match load_or_exit(input) {
        Ok(img) => img,
        Err(code) => return code,
    };

    let bounds = region.unwrap_or_else(|| Bounds::of_size(image.width(), image.height()));
    let offsets = match offsets_from_rgb(&image, bounds, config.markers) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        return emit_json(&OffsetsOutput::from(offsets), None);
    }

    let bundle = OffsetBundle::from(offsets);
    let text = [
        format!("center: {}", format_point(bundle.center)),
        format!("head: {}", format_point(bundle.head)),
        format!("lhand: {}", format_point(bundle.lhand)),
        format!("rhand: {}", format_point(bundle.rhand)),
        format!("white: {}", format_point(offsets.white)),
    ]
    .join("\n");
    emit_text(&text, None)
}
