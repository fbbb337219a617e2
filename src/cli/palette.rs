//! CLI dispatch for the `palette` command.

use std::path::Path;
use std::process::ExitCode;

use rayon::prelude::*;

use crate::output::{expand_inputs, load_rgba, OutputError};
use crate::palette::{add_to_palette, Palette};

use super::{emit_json, emit_text, EXIT_ERROR, EXIT_INVALID_ARGS};

/// Execute the palette command.
///
/// Files are decoded and scanned in parallel, one palette per file, then
/// merged.
pub fn run_palette(inputs: &[String], json: bool, output: Option<&Path>) -> ExitCode {
    let files = match expand_inputs(inputs) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    if files.is_empty() {
        eprintln!("Error: No images matched {}", inputs.join(" "));
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let results: Vec<(&Path, Result<Palette, OutputError>)> = files
        .par_iter()
        .map(|path| {
            let palette = load_rgba(path).map(|image| {
                let mut local = Palette::new();
                add_to_palette(&mut local, &image);
                local
            });
            (path.as_path(), palette)
        })
        .collect();

    let mut palette = Palette::new();
    for (path, result) in results {
        match result {
            Ok(local) => {
                tracing::debug!(file = %path.display(), colors = local.len(), "collected palette");
                palette.merge(local);
            }
            Err(e) => {
                eprintln!("Error: Cannot load '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    if json {
        let report = serde_json::json!({
            "files": files.len(),
            "count": palette.len(),
            "colors": palette,
        });
        return emit_json(&report, output);
    }

    emit_text(&palette.to_hex().join("\n"), output)
}
