//! CLI dispatch for the `sheet` command.

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::geometry::{Bounds, Point};
use crate::output::load_rgba;
use crate::sheet::{analyze_sheet, FrameReport, SheetOptions, SheetReport};

use super::{emit_json, emit_text, resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS};

fn describe_box(b: Option<Bounds>) -> String {
    b.map(|b| b.to_string()).unwrap_or_else(|| "empty".to_string())
}

fn describe_point(p: Option<Point>) -> String {
    p.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

fn describe_frame(frame: &FrameReport) -> String {
    let mut line = format!(
        "frame {} [{},{}]: covered {} safe {} center {} head {} lhand {} rhand {}",
        frame.index,
        frame.column,
        frame.row,
        describe_box(frame.covered),
        describe_box(frame.safe_box),
        describe_point(frame.offsets.center),
        describe_point(frame.offsets.head),
        describe_point(frame.offsets.lhand),
        describe_point(frame.offsets.rhand),
    );
    if let Some(dup) = frame.duplicate_of {
        let kind = if dup.flipped { "mirrored duplicate" } else { "duplicate" };
        line.push_str(&format!(" ({} of frame {})", kind, dup.index));
    }
    line
}

fn describe_report(report: &SheetReport) -> String {
    let mut lines: Vec<String> = report.frames.iter().map(describe_frame).collect();
    lines.push(format!(
        "{} frames of {}x{}, {} unique, union {}",
        report.frames.len(),
        report.frame_width,
        report.frame_height,
        report.unique_count(),
        describe_box(report.union_extent()),
    ));
    lines.join("\n")
}

/// Execute the sheet command.
pub fn run_sheet(
    input: &Path,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    json: bool,
    output: Option<&Path>,
) -> ExitCode {
    let config = match resolve_config(config_path, overrides) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let Some(grid) = config.sheet.grid() else {
        eprintln!("Error: frame size is required (use --frame WxH or [sheet] in spritescan.toml)");
        return ExitCode::from(EXIT_INVALID_ARGS);
    };

    let sheet = match load_rgba(input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("Error: Cannot load '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let options = SheetOptions {
        grid,
        markers: config.markers,
        flip: config.dedup.flip,
        lineart: config.dedup.lineart,
    };
    let report = match analyze_sheet(&sheet, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        emit_json(&report, output)
    } else {
        emit_text(&describe_report(&report), output)
    }
}
