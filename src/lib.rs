//! Spritescan - geometric metadata for sprite-sheet animation frames
//!
//! This library provides functionality to:
//! - Find the tight box around non-transparent pixels and align it to frame sizes
//! - Read anchor points (center, head, hands) encoded as marker-colored pixels
//! - Compare frames exactly, on line art only, and mirrored, for deduplication
//! - Collect the opaque palette of a set of images
//!
//! Pixel data comes in as [`image::RgbaImage`]; decoding is left to the `image`
//! crate.

pub mod cli;
pub mod compare;
pub mod config;
pub mod coverage;
pub mod geometry;
pub mod offsets;
pub mod output;
pub mod palette;
pub mod sheet;

pub use geometry::{Bounds, CenteredBounds, Point};
pub use offsets::{MarkerOffsets, MarkerSelection, MultipleOffsetError, OffsetBundle};
pub use palette::Palette;
