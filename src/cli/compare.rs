//! CLI dispatch for the `compare` command.

use std::path::Path;
use std::process::ExitCode;

use crate::compare::{images_equal, lineart_equal, offsets_equal};
use crate::geometry::Bounds;
use crate::offsets::anchors_from_rgb;
use crate::output::load_rgba;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the compare command.
pub fn run_compare(a: &Path, b: &Path, flip: bool, lineart: bool, offsets: bool, json: bool) -> ExitCode {
    let mut images = Vec::with_capacity(2);
    for path in [a, b] {
        match load_rgba(path) {
            Ok(img) => images.push(img),
            Err(e) => {
                eprintln!("Error: Cannot load '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }
    let (img_a, img_b) = (&images[0], &images[1]);

    let pixels_equal =
        if lineart { lineart_equal(img_a, img_b, flip) } else { images_equal(img_a, img_b, flip) };

    let anchors_equal = if offsets && pixels_equal {
        let bundle = |img: &image::RgbaImage, path: &Path| {
            anchors_from_rgb(img, Bounds::of_size(img.width(), img.height())).map_err(|e| {
                eprintln!("Error: {}: {}", path.display(), e);
            })
        };
        match (bundle(img_a, a), bundle(img_b, b)) {
            (Ok(oa), Ok(ob)) => Some(offsets_equal(&oa, &ob, img_a.width() as i32, flip)),
            _ => return ExitCode::from(EXIT_ERROR),
        }
    } else {
        None
    };

    let equal = pixels_equal && anchors_equal.unwrap_or(true);
    if json {
        let report = serde_json::json!({
            "equal": equal,
            "flip": flip,
            "lineart": lineart,
            "pixels_equal": pixels_equal,
            "offsets_equal": anchors_equal,
        });
        println!("{}", report);
    } else {
        println!("{}", if equal { "equal" } else { "different" });
    }

    ExitCode::from(if equal { EXIT_SUCCESS } else { EXIT_ERROR })
}
