//! Frame equality checks used for deduplication
//!
//! All comparisons can mirror the second operand horizontally, so a frame and
//! its left/right flipped twin compare equal with `flip = true`.

use image::{Rgba, RgbaImage};

use crate::offsets::OffsetBundle;

const LINEART: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Compare every pixel of `a` against the matching pixel of `b`.
///
/// With `flip`, pixel `(x, y)` of `a` is compared to `(width - 1 - x, y)` of
/// `b`. Returns false as soon as one pixel pair fails `same`.
fn pixels_match<F>(a: &RgbaImage, b: &RgbaImage, flip: bool, same: F) -> bool
where
    F: Fn(&Rgba<u8>, &Rgba<u8>) -> bool,
{
    if a.dimensions() != b.dimensions() {
        return false;
    }
    let (width, height) = a.dimensions();
    for x in 0..width {
        let bx = if flip { width - 1 - x } else { x };
        for y in 0..height {
            if !same(a.get_pixel(x, y), b.get_pixel(bx, y)) {
                return false;
            }
        }
    }
    true
}

/// Exact RGBA equality, optionally against the mirrored `b`.
pub fn images_equal(a: &RgbaImage, b: &RgbaImage, flip: bool) -> bool {
    pixels_match(a, b, flip, |pa, pb| pa == pb)
}

/// Equality of the line art only: pixels are compared on whether they are
/// exactly opaque black, ignoring fill colors.
pub fn lineart_equal(a: &RgbaImage, b: &RgbaImage, flip: bool) -> bool {
    pixels_match(a, b, flip, |pa, pb| (*pa == LINEART) == (*pb == LINEART))
}

/// Compare the four named anchors of two bundles.
///
/// With `flip`, every anchor of `b` is mirrored as `(image_width - x - 1, y)`
/// first. A missing anchor only matches another missing anchor.
pub fn offsets_equal(a: &OffsetBundle, b: &OffsetBundle, image_width: i32, flip: bool) -> bool {
    let b = if flip { b.mirrored(image_width) } else { *b };
    a.center == b.center && a.head == b.head && a.lhand == b.lhand && a.rhand == b.rhand
}
