//! Configuration schema types for `spritescan.toml`
//!
//! Defines the structure and validation rules for scan settings.

use serde::{Deserialize, Serialize};

use crate::offsets::MarkerSelection;
use crate::sheet::FrameGrid;

/// Sheet layout section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Width of one frame cell in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<u32>,
    /// Height of one frame cell in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<u32>,
}

impl SheetConfig {
    /// Frame grid, when both dimensions are configured.
    pub fn grid(&self) -> Option<FrameGrid> {
        match (self.frame_width, self.frame_height) {
            (Some(w), Some(h)) => Some(FrameGrid::new(w, h)),
            _ => None,
        }
    }
}

/// Frame deduplication section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Match frames against mirrored earlier frames
    #[serde(default = "default_flip")]
    pub flip: bool,
    /// Compare line art only
    #[serde(default)]
    pub lineart: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { flip: default_flip(), lineart: false }
    }
}

fn default_flip() -> bool {
    true
}

/// Root configuration structure for `spritescan.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Marker colors to look for
    #[serde(default)]
    pub markers: MarkerSelection,
    /// Sheet layout
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Deduplication settings
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Validation error for configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "sheet.frame_width")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spritescan.toml: '{}' {}", self.field, self.message)
    }
}

impl ScanConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        for (field, value) in
            [("sheet.frame_width", self.sheet.frame_width), ("sheet.frame_height", self.sheet.frame_height)]
        {
            if value == Some(0) {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "must be a positive integer".to_string(),
                });
            }
        }

        if self.sheet.frame_width.is_some() != self.sheet.frame_height.is_some() {
            errors.push(ConfigValidationError {
                field: "sheet".to_string(),
                message: "frame_width and frame_height must be set together".to_string(),
            });
        }

        errors
    }
}
