//! Marker offset extraction
//!
//! Content authors bake anchor points into frame artwork as single fully
//! opaque pixels of reserved colors:
//!
//! | Color | Slot | Anchor |
//! |---|---|---|
//! | `(0, 0, 0)` | center (may seed red/green/blue) | body center |
//! | `R == 255` | red | head |
//! | `G == 255` | green | left hand |
//! | `B == 255` | blue | right hand |
//! | `(255, 255, 255)` | white (seeds like black when white is off) | free-standing marker |
//!
//! Red, green and blue are tested one channel at a time, so `(255, 255, 0)`
//! is both a red and a green marker. A white pixel is never a channel
//! marker.
//!
//! Rules enforced while scanning:
//!
//! - A black pixel sets the center. When no red/green/blue slot is filled yet
//!   it also seeds all three with the same position ("all anchors coincide").
//!   When some color slot was already placed on its own, only the center is
//!   set. A black pixel arriving while center, red, green and blue still all
//!   hold one position re-seeds the four of them; any other second black
//!   pixel is an error.
//! - A red/green/blue marker fills an empty slot. An occupied slot, seeded or
//!   not, is an error.
//! - With white detection on, white is its own slot and a second white pixel
//!   is an error. With it off, a white pixel seeds the center (if empty) and
//!   all three color slots, the way a black pixel does.
//! - Either way, a white pixel is an error once a red/green/blue slot is
//!   independently occupied, and a color marker is an error once a white
//!   marker is recorded.
//!
//! A slot counts as independently occupied unless center, red, green and
//! blue all hold the same position. That equality test is a heuristic, not
//! tracked provenance: independently placed markers that happen to land on
//! the seeded position are read as seeded.

use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Bounds, Point};

/// Which marker colors a scan should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSelection {
    pub black: bool,
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub white: bool,
}

impl MarkerSelection {
    /// Every marker color enabled.
    pub const ALL: Self = Self { black: true, red: true, green: true, blue: true, white: true };

    /// No marker color enabled.
    pub const NONE: Self = Self { black: false, red: false, green: false, blue: false, white: false };

    /// Body anchors only: black, red, green and blue.
    pub const ANCHORS: Self = Self { black: true, red: true, green: true, blue: true, white: false };
}

impl Default for MarkerSelection {
    fn default() -> Self {
        Self::ANCHORS
    }
}

impl FromStr for MarkerSelection {
    type Err = String;

    /// Parse a marker list such as `"krgb"`: `k` black, `r` red, `g` green,
    /// `b` blue, `w` white. Also accepts `all` and `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => return Ok(Self::ALL),
            "none" => return Ok(Self::NONE),
            _ => {}
        }

        let mut selection = Self::NONE;
        for c in s.chars() {
            match c.to_ascii_lowercase() {
                'k' => selection.black = true,
                'r' => selection.red = true,
                'g' => selection.green = true,
                'b' => selection.blue = true,
                'w' => selection.white = true,
                other => {
                    return Err(format!(
                        "unknown marker '{}' (expected letters from k, r, g, b, w)",
                        other
                    ))
                }
            }
        }
        Ok(selection)
    }
}

/// A color channel that carries a single-channel marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Raw marker positions found by a scan, relative to the scanned region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkerOffsets {
    pub center: Option<Point>,
    pub red: Option<Point>,
    pub green: Option<Point>,
    pub blue: Option<Point>,
    pub white: Option<Point>,
}

impl MarkerOffsets {
    pub fn channel(&self, channel: Channel) -> Option<Point> {
        match channel {
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut Option<Point> {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        }
    }

    /// True when center, red, green and blue are set and all equal.
    fn all_coincide(&self) -> bool {
        self.center.is_some()
            && self.center == self.red
            && self.red == self.green
            && self.green == self.blue
    }

    /// True when some red/green/blue marker was placed on its own rather than
    /// seeded by the black pixel.
    fn has_independent_color(&self) -> bool {
        let any_color = self.red.is_some() || self.green.is_some() || self.blue.is_some();
        any_color && !self.all_coincide()
    }
}

/// Named animation anchors for one frame.
///
/// Built from [`MarkerOffsets`] with the usual channel mapping: red is the
/// head, green the left hand, blue the right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OffsetBundle {
    pub center: Option<Point>,
    pub head: Option<Point>,
    pub lhand: Option<Point>,
    pub rhand: Option<Point>,
}

impl OffsetBundle {
    /// Mirror every anchor horizontally inside a frame `width` pixels wide.
    pub fn mirrored(&self, width: i32) -> Self {
        let flip = |p: Option<Point>| p.map(|p| p.mirror_x(width));
        Self {
            center: flip(self.center),
            head: flip(self.head),
            lhand: flip(self.lhand),
            rhand: flip(self.rhand),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_none() && self.head.is_none() && self.lhand.is_none() && self.rhand.is_none()
    }
}

impl From<MarkerOffsets> for OffsetBundle {
    fn from(offsets: MarkerOffsets) -> Self {
        Self { center: offsets.center, head: offsets.red, lhand: offsets.green, rhand: offsets.blue }
    }
}

/// Conflicting marker pixels. Coordinates are absolute image coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipleOffsetError {
    /// Two white markers
    #[error("Second white pixel found at {found} when already found at {first} when searching for offsets")]
    DuplicateWhite { found: Point, first: Point },
    /// A white marker together with independently placed red/green/blue markers
    #[error("White pixel found at {found} when r/g/b pixel already found at {} when searching for offsets", join_points(.existing))]
    WhiteWithColor { found: Point, existing: Vec<Point> },
    /// Two black markers
    #[error("Multiple black pixels found at {first} and {found} when searching for offsets")]
    DuplicateBlack { found: Point, first: Point },
    /// Two markers on the same color channel
    #[error("Multiple {channel} pixels found at {first} and {found} when searching for offsets")]
    DuplicateChannel { channel: Channel, found: Point, first: Point },
}

impl MultipleOffsetError {
    /// Absolute position of the pixel that triggered the conflict.
    pub fn found(&self) -> Point {
        match self {
            Self::DuplicateWhite { found, .. }
            | Self::WhiteWithColor { found, .. }
            | Self::DuplicateBlack { found, .. }
            | Self::DuplicateChannel { found, .. } => *found,
        }
    }
}

fn join_points(points: &[Point]) -> String {
    points.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

/// In-progress scan of one region.
struct MarkerScan {
    origin: Point,
    selection: MarkerSelection,
    offsets: MarkerOffsets,
}

impl MarkerScan {
    fn absolute(&self, p: Point) -> Point {
        p.translate(self.origin, false)
    }

    fn existing_colors(&self) -> Vec<Point> {
        [self.offsets.center, self.offsets.red, self.offsets.green, self.offsets.blue]
            .into_iter()
            .flatten()
            .map(|p| self.absolute(p))
            .collect()
    }

    fn seed_colors(&mut self, pos: Point) {
        for channel in Channel::ALL {
            *self.offsets.channel_mut(channel) = Some(pos);
        }
    }

    fn visit_white(&mut self, pos: Point) -> Result<(), MultipleOffsetError> {
        if self.offsets.has_independent_color() {
            let existing = self.existing_colors();
            return Err(MultipleOffsetError::WhiteWithColor { found: self.absolute(pos), existing });
        }

        if !self.selection.white {
            if self.offsets.center.is_none() {
                self.offsets.center = Some(pos);
            }
            self.seed_colors(pos);
            return Ok(());
        }

        match self.offsets.white {
            Some(first) => Err(MultipleOffsetError::DuplicateWhite {
                found: self.absolute(pos),
                first: self.absolute(first),
            }),
            None => {
                self.offsets.white = Some(pos);
                Ok(())
            }
        }
    }

    fn visit_black(&mut self, pos: Point) -> Result<(), MultipleOffsetError> {
        let any_color =
            self.offsets.red.is_some() || self.offsets.green.is_some() || self.offsets.blue.is_some();

        if !any_color || self.offsets.all_coincide() {
            self.offsets.center = Some(pos);
            self.seed_colors(pos);
            return Ok(());
        }

        match self.offsets.center {
            Some(first) => Err(MultipleOffsetError::DuplicateBlack {
                found: self.absolute(pos),
                first: self.absolute(first),
            }),
            None => {
                self.offsets.center = Some(pos);
                Ok(())
            }
        }
    }

    fn visit_channel(&mut self, channel: Channel, pos: Point) -> Result<(), MultipleOffsetError> {
        if let Some(white) = self.offsets.white {
            return Err(MultipleOffsetError::WhiteWithColor {
                found: self.absolute(pos),
                existing: vec![self.absolute(white)],
            });
        }
        match self.offsets.channel(channel) {
            Some(first) => Err(MultipleOffsetError::DuplicateChannel {
                channel,
                found: self.absolute(pos),
                first: self.absolute(first),
            }),
            None => {
                *self.offsets.channel_mut(channel) = Some(pos);
                Ok(())
            }
        }
    }

    fn enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Red => self.selection.red,
            Channel::Green => self.selection.green,
            Channel::Blue => self.selection.blue,
        }
    }
}

/// Scan `bounds` of `image` for marker pixels and resolve them into offsets.
///
/// Only fully opaque pixels (`alpha == 255`) are considered. Returned
/// positions are relative to the `bounds` origin. `bounds` is clipped to the
/// image. The scan visits columns left to right and each column top to
/// bottom, stopping at the first conflict.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use spritescan::geometry::{Bounds, Point};
/// use spritescan::offsets::{offsets_from_rgb, MarkerSelection};
///
/// let mut img = RgbaImage::new(16, 16);
/// img.put_pixel(9, 10, Rgba([0, 0, 0, 255]));
/// let offsets = offsets_from_rgb(&img, Bounds::new(8, 8, 16, 16), MarkerSelection::ANCHORS).unwrap();
/// assert_eq!(offsets.center, Some(Point::new(1, 2)));
/// assert_eq!(offsets.red, Some(Point::new(1, 2)));
/// ```
#[tracing::instrument(level = "trace", skip(image))]
pub fn offsets_from_rgb(
    image: &RgbaImage,
    bounds: Bounds,
    selection: MarkerSelection,
) -> Result<MarkerOffsets, MultipleOffsetError> {
    let (width, height) = image.dimensions();
    let region = bounds.clamp_to(width, height);
    let mut scan = MarkerScan { origin: bounds.origin(), selection, offsets: MarkerOffsets::default() };

    for x in region.min_x..region.max_x {
        for y in region.min_y..region.max_y {
            let pixel = image.get_pixel(x as u32, y as u32);
            if pixel[3] != 255 {
                continue;
            }
            let pos = Point::new(x, y).translate(scan.origin, true);
            let [r, g, b, _] = pixel.0;

            if r == 255 && g == 255 && b == 255 {
                scan.visit_white(pos)?;
                continue;
            }

            if selection.black && r == 0 && g == 0 && b == 0 {
                scan.visit_black(pos)?;
            }
            for channel in Channel::ALL {
                if scan.enabled(channel) && pixel.0[channel.index()] == 255 {
                    scan.visit_channel(channel, pos)?;
                }
            }
        }
    }

    tracing::trace!(offsets = ?scan.offsets, "marker scan finished");
    Ok(scan.offsets)
}

/// Scan for the body anchors (black, red, green, blue) and name them.
pub fn anchors_from_rgb(image: &RgbaImage, bounds: Bounds) -> Result<OffsetBundle, MultipleOffsetError> {
    offsets_from_rgb(image, bounds, MarkerSelection::ANCHORS).map(OffsetBundle::from)
}
