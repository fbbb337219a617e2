//! Coverage scanning: the tight box around non-transparent pixels

use image::RgbaImage;

use crate::geometry::Bounds;

/// Find the tightest box containing every pixel with non-zero alpha.
///
/// `region` limits the search (default: the whole image) and is clipped to the
/// image. The result is a half-open box in absolute image coordinates, not
/// relative to the region origin; subtract `region.origin()` with
/// [`Bounds::translate`] for region-relative values.
///
/// When nothing in the region is covered the result is the inverted box
/// `(width, height, 0, 0)`. It is returned as a value, not an error; callers
/// detect it with [`Bounds::is_degenerate`].
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use spritescan::coverage::covered_bounds;
/// use spritescan::geometry::Bounds;
///
/// let mut img = RgbaImage::new(8, 8);
/// img.put_pixel(2, 3, Rgba([10, 20, 30, 255]));
/// assert_eq!(covered_bounds(&img, None), Bounds::new(2, 3, 3, 4));
/// ```
pub fn covered_bounds(image: &RgbaImage, region: Option<Bounds>) -> Bounds {
    let (width, height) = image.dimensions();
    let region = region.unwrap_or_else(|| Bounds::of_size(width, height)).clamp_to(width, height);

    let mut min_x = width as i32;
    let mut min_y = height as i32;
    let mut max_x = -1;
    let mut max_y = -1;

    for x in region.min_x..region.max_x {
        for y in region.min_y..region.max_y {
            if image.get_pixel(x as u32, y as u32)[3] != 0 {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }

    Bounds::new(min_x, min_y, max_x + 1, max_y + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const OPAQUE: Rgba<u8> = Rgba([200, 100, 50, 255]);

    #[test]
    fn test_transparent_image_is_degenerate() {
        let img = RgbaImage::new(6, 4);
        let b = covered_bounds(&img, None);
        assert_eq!(b, Bounds::new(6, 4, 0, 0));
        assert!(b.is_degenerate());
    }

    #[test]
    fn test_single_pixel() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(7, 2, OPAQUE);
        assert_eq!(covered_bounds(&img, None), Bounds::new(7, 2, 8, 3));
    }

    #[test]
    fn test_partial_alpha_counts_as_covered() {
        let mut img = RgbaImage::new(10, 10);
        img.put_pixel(1, 1, Rgba([0, 0, 0, 1]));
        img.put_pixel(5, 8, Rgba([255, 255, 255, 128]));
        assert_eq!(covered_bounds(&img, None), Bounds::new(1, 1, 6, 9));
    }

    #[test]
    fn test_region_limits_search() {
        let mut img = RgbaImage::new(16, 16);
        img.put_pixel(1, 1, OPAQUE);
        img.put_pixel(10, 12, OPAQUE);
        img.put_pixel(13, 9, OPAQUE);

        let region = Bounds::new(8, 8, 16, 16);
        // Absolute coordinates, pixel (1, 1) is outside the region
        assert_eq!(covered_bounds(&img, Some(region)), Bounds::new(10, 9, 14, 13));
    }

    #[test]
    fn test_region_relative_by_translation() {
        let mut img = RgbaImage::new(16, 16);
        img.put_pixel(10, 12, OPAQUE);
        let region = Bounds::new(8, 8, 16, 16);
        let relative = covered_bounds(&img, Some(region)).translate(region.origin(), true);
        assert_eq!(relative, Bounds::new(2, 4, 3, 5));
    }

    #[test]
    fn test_empty_region_is_degenerate() {
        let mut img = RgbaImage::new(16, 16);
        img.put_pixel(1, 1, OPAQUE);
        let b = covered_bounds(&img, Some(Bounds::new(8, 8, 16, 16)));
        assert!(b.is_degenerate());
        assert_eq!(b, Bounds::new(16, 16, 0, 0));
    }

    #[test]
    fn test_region_clipped_to_image() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(3, 3, OPAQUE);
        assert_eq!(covered_bounds(&img, Some(Bounds::new(-5, -5, 50, 50))), Bounds::new(3, 3, 4, 4));
    }
}
