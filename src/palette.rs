//! Palette collection: the set of fully opaque colors used by sprite images
//!
//! A [`Palette`] is an accumulator owned by the caller. Collection across
//! several images in parallel builds one palette per worker and merges them
//! with [`Palette::merge`]; a single palette is never shared between threads.

use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Serialize, Serializer};

/// A set of unique opaque colors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: HashSet<Rgba<u8>>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct colors collected so far.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: Rgba<u8>) -> bool {
        self.colors.contains(&color)
    }

    /// Insert a single color. Non-opaque colors are still inserted; the
    /// opacity filter belongs to [`add_to_palette`].
    pub fn insert(&mut self, color: Rgba<u8>) -> bool {
        self.colors.insert(color)
    }

    /// Fold every color of `other` into this palette.
    pub fn merge(&mut self, other: Palette) {
        self.colors.extend(other.colors);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgba<u8>> {
        self.colors.iter()
    }

    /// Colors in a stable order (by channel values).
    pub fn sorted(&self) -> Vec<Rgba<u8>> {
        let mut colors: Vec<Rgba<u8>> = self.colors.iter().copied().collect();
        colors.sort_by_key(|c| c.0);
        colors
    }

    /// Colors formatted as `#RRGGBB`, sorted.
    pub fn to_hex(&self) -> Vec<String> {
        self.sorted().into_iter().map(|c| format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2])).collect()
    }
}

impl Serialize for Palette {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_hex())
    }
}

impl FromIterator<Rgba<u8>> for Palette {
    fn from_iter<I: IntoIterator<Item = Rgba<u8>>>(iter: I) -> Self {
        Self { colors: iter.into_iter().collect() }
    }
}

/// Add every fully opaque pixel (`alpha == 255`) of `image` to `palette`.
pub fn add_to_palette(palette: &mut Palette, image: &RgbaImage) {
    for pixel in image.pixels() {
        if pixel[3] == 255 {
            palette.insert(*pixel);
        }
    }
}

/// Collect the opaque colors of many images in parallel.
///
/// Each image gets its own palette; the per-image palettes are merged at the
/// end.
pub fn collect_palette(images: &[RgbaImage]) -> Palette {
    images
        .par_iter()
        .map(|image| {
            let mut local = Palette::new();
            add_to_palette(&mut local, image);
            local
        })
        .reduce(Palette::new, |mut acc, local| {
            acc.merge(local);
            acc
        })
}
