//! Image loading, input discovery and report output

use std::io;
use std::path::{Path, PathBuf};

use glob::glob;
use image::RgbaImage;
use thiserror::Error;

/// Error type for reading images and writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed glob pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Decode an image file into an RGBA buffer.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, OutputError> {
    let image = image::open(path)?;
    Ok(image.to_rgba8())
}

/// Check if a path has a PNG file extension.
pub fn is_png_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Expand input arguments into image paths.
///
/// Each argument may be a file, a directory (searched recursively for
/// `.png` files) or a glob pattern. The result is sorted and deduplicated.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>, OutputError> {
    let mut files = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            let pattern = format!("{}/**/*.png", path.display());
            files.extend(glob_paths(&pattern)?.into_iter().filter(|p| is_png_file(p)));
        } else if path.exists() {
            files.push(path.to_path_buf());
        } else {
            files.extend(glob_paths(input)?);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>, OutputError> {
    let paths = glob(pattern).map_err(|e| OutputError::Pattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;
    Ok(paths.filter_map(Result::ok).collect())
}

/// Write report text to `path`, or to stdout when `path` is `None`.
pub fn write_report(text: &str, path: Option<&Path>) -> Result<(), OutputError> {
    match path {
        Some(path) => {
            // Create parent directories if they don't exist
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, text)?;
        }
        None => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_load_rgba_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("frame.png");
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 1, Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let loaded = load_rgba(&path).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(*loaded.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_rgba(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, OutputError::Image(_) | OutputError::Io(_)));
    }

    #[test]
    fn test_is_png_file() {
        assert!(is_png_file(Path::new("a/b.png")));
        assert!(is_png_file(Path::new("B.PNG")));
        assert!(!is_png_file(Path::new("b.jpg")));
        assert!(!is_png_file(Path::new("png")));
    }

    #[test]
    fn test_expand_inputs_directory_and_glob() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sheets");
        std::fs::create_dir_all(&sub).unwrap();
        for name in ["a.png", "b.png", "notes.txt"] {
            std::fs::write(sub.join(name), b"x").unwrap();
        }

        let from_dir = expand_inputs(&[temp.path().display().to_string()]).unwrap();
        assert_eq!(from_dir.len(), 2);

        let pattern = format!("{}/*.png", sub.display());
        let from_glob = expand_inputs(&[pattern.clone(), pattern]).unwrap();
        assert_eq!(from_glob, from_dir);
    }

    #[test]
    fn test_write_report_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/nested/report.json");
        write_report("{}", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }
}
