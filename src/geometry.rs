//! Integer box and point arithmetic for sprite frames
//!
//! Two box conventions are used by the scanners and they are kept apart by type:
//!
//! - [`Bounds`] is a half-open extent (`max` exclusive). Coverage boxes, rounded
//!   boxes and unions are all `Bounds`.
//! - [`CenteredBounds`] is a box that is point-symmetric around a chosen center.
//!   It is only produced by [`center_bounds`] and must be converted explicitly
//!   with [`CenteredBounds::to_bounds`] before it is mixed with extents.

use serde::{Deserialize, Serialize};

/// Frame boxes are always widened to a multiple of this many pixels.
pub const BOX_ALIGNMENT: i32 = 8;

/// A 2D integer coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Add `other` to this point, or subtract it when `subtract` is set.
    pub fn translate(self, other: Point, subtract: bool) -> Self {
        let sign = if subtract { -1 } else { 1 };
        Self { x: self.x + other.x * sign, y: self.y + other.y * sign }
    }

    /// Mirror the point horizontally inside an image `width` pixels wide.
    pub fn mirror_x(self, width: i32) -> Self {
        Self { x: width - self.x - 1, y: self.y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned half-open box: `min` inclusive, `max` exclusive.
///
/// Ordering (`min <= max`) is not enforced. The coverage scanner returns an
/// inverted box when nothing is covered; check [`Bounds::is_degenerate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Box covering a whole `width` x `height` image.
    pub fn of_size(width: u32, height: u32) -> Self {
        Self { min_x: 0, min_y: 0, max_x: width as i32, max_y: height as i32 }
    }

    /// Box from an origin and a size.
    pub fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { min_x: x, min_y: y, max_x: x + width, max_y: y + height }
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// True when the box is empty or inverted on either axis.
    pub fn is_degenerate(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Shift both corners by `delta`, or by `-delta` when `subtract` is set.
    pub fn translate(self, delta: Point, subtract: bool) -> Self {
        let min = Point::new(self.min_x, self.min_y).translate(delta, subtract);
        let max = Point::new(self.max_x, self.max_y).translate(delta, subtract);
        Self { min_x: min.x, min_y: min.y, max_x: max.x, max_y: max.y }
    }

    /// Clip the box to a `width` x `height` image.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self {
            min_x: self.min_x.clamp(0, w),
            min_y: self.min_y.clamp(0, h),
            max_x: self.max_x.clamp(0, w),
            max_y: self.max_y.clamp(0, h),
        }
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// A box expressed as the symmetric reach around a center point.
///
/// Covers `center.x - reach_x ..= center.x + reach_x` horizontally and the
/// same vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenteredBounds {
    pub center: Point,
    pub reach_x: i32,
    pub reach_y: i32,
}

impl CenteredBounds {
    /// Convert to extents: `(center - reach, center + reach)` on each axis.
    pub fn to_bounds(self) -> Bounds {
        Bounds::new(-self.reach_x, -self.reach_y, self.reach_x, self.reach_y)
            .translate(self.center, false)
    }
}

/// Smallest box symmetric about `center` that still contains `bounds`.
///
/// Each axis is handled independently: the reach is the larger of the two
/// distances from the center to the box edges on that axis.
pub fn center_bounds(bounds: Bounds, center: Point) -> CenteredBounds {
    let reach_x = (center.x - bounds.min_x).max(bounds.max_x - center.x);
    let reach_y = (center.y - bounds.min_y).max(bounds.max_y - center.y);
    CenteredBounds { center, reach_x, reach_y }
}

/// Smallest multiple of `mult` that is `>= n`.
///
/// Callers must pass `n >= 1` and `mult >= 1`; other inputs are outside the
/// contract and the result is unspecified.
pub fn round_up_to_mult(n: i32, mult: i32) -> i32 {
    ((n - 1).div_euclid(mult) + 1) * mult
}

/// Widen a box so both dimensions are multiples of [`BOX_ALIGNMENT`].
///
/// The padding is split with floor division, so when it is odd the extra
/// unit lands on the min side. Never shrinks.
pub fn round_up_box(bounds: Bounds) -> Bounds {
    let width = bounds.width();
    let height = bounds.height();
    let new_width = round_up_to_mult(width, BOX_ALIGNMENT);
    let new_height = round_up_to_mult(height, BOX_ALIGNMENT);
    let start_x = bounds.min_x + (width - new_width).div_euclid(2);
    let start_y = bounds.min_y + (height - new_height).div_euclid(2);
    Bounds::new(start_x, start_y, start_x + new_width, start_y + new_height)
}

/// Union of two extents.
pub fn combine_extents(a: Bounds, b: Bounds) -> Bounds {
    Bounds {
        min_x: a.min_x.min(b.min_x),
        min_y: a.min_y.min(b.min_y),
        max_x: a.max_x.max(b.max_x),
        max_y: a.max_y.max(b.max_y),
    }
}
