//! Configuration module for spritescan
//!
//! Provides types and parsing for `spritescan.toml` scan settings.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, merge_cli_overrides, CliOverrides, ConfigError,
    CONFIG_FILE,
};
pub use schema::*;
