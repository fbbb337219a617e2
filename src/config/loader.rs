//! Configuration loading and discovery for `spritescan.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ScanConfig;
use crate::offsets::MarkerSelection;
use crate::sheet::FrameGrid;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for.
pub const CONFIG_FILE: &str = "spritescan.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse spritescan.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override marker selection
    pub markers: Option<MarkerSelection>,
    /// Override frame grid
    pub grid: Option<FrameGrid>,
    /// Override mirrored deduplication
    pub flip: Option<bool>,
    /// Override line-art comparison
    pub lineart: Option<bool>,
}

/// Find spritescan.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for spritescan.toml
/// 2. Check XDG_CONFIG_HOME/spritescan/spritescan.toml (or ~/.config/spritescan/spritescan.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find spritescan.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("spritescan").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find spritescan.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a spritescan.toml file.
///
/// If a path is provided, loads from that file (which must exist). Otherwise
/// uses [`find_config`], falling back to defaults when nothing is found.
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(ScanConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ScanConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ScanConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ScanConfig, overrides: &CliOverrides) {
    if let Some(markers) = overrides.markers {
        config.markers = markers;
    }

    if let Some(grid) = overrides.grid {
        config.sheet.frame_width = Some(grid.frame_width);
        config.sheet.frame_height = Some(grid.frame_height);
    }

    if let Some(flip) = overrides.flip {
        config.dedup.flip = flip;
    }

    if let Some(lineart) = overrides.lineart {
        config.dedup.lineart = lineart;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[dedup]\nflip = false")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path).expect("should create config file");

        let subdir = temp.path().join("sheets").join("hero");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(
            &config_path,
            r#"
[markers]
white = true

[sheet]
frame_width = 32
frame_height = 32

[dedup]
lineart = true
"#,
        )
        .expect("should write config content");

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert!(config.markers.white);
        assert_eq!(config.sheet.grid(), Some(FrameGrid::new(32, 32)));
        assert!(config.dedup.flip);
        assert!(config.dedup.lineart);
    }

    #[test]
    fn test_load_config_explicit_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[sheet\nframe_width = ").unwrap();
        assert!(matches!(load_config(Some(&config_path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_failure() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[sheet]\nframe_width = 0\nframe_height = 8\n").unwrap();
        let err = load_config(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("sheet.frame_width"), "{}", err);
    }

    #[test]
    #[serial]
    fn test_load_config_discovers_from_cwd() {
        let temp = TempDir::new().expect("should create temp dir");
        fs::write(temp.path().join(CONFIG_FILE), "[markers]\nred = false\n").unwrap();
        let subdir = temp.path().join("art");
        fs::create_dir_all(&subdir).unwrap();

        let original_dir = env::current_dir().unwrap();
        env::set_current_dir(&subdir).unwrap();
        let result = load_config(None);
        env::set_current_dir(original_dir).unwrap();

        assert!(!result.expect("should load discovered config").markers.red);
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = ScanConfig::default();
        let overrides = CliOverrides {
            markers: Some(MarkerSelection::ALL),
            grid: Some(FrameGrid::new(16, 24)),
            flip: Some(false),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.markers, MarkerSelection::ALL);
        assert_eq!(config.sheet.grid(), Some(FrameGrid::new(16, 24)));
        assert!(!config.dedup.flip);
        assert!(!config.dedup.lineart);
    }
}
