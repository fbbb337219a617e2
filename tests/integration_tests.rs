//! Integration tests for the spritescan library
//!
//! Drives the public API the way an import pipeline does: build a frame,
//! find its coverage, round it, read its anchors and deduplicate it against
//! other frames.

use image::{imageops, Rgba, RgbaImage};
use spritescan::compare::{images_equal, lineart_equal, offsets_equal};
use spritescan::coverage::covered_bounds;
use spritescan::geometry::{
    center_bounds, combine_extents, round_up_box, round_up_to_mult, Bounds, Point,
};
use spritescan::offsets::{
    anchors_from_rgb, offsets_from_rgb, MarkerSelection, MultipleOffsetError, OffsetBundle,
};
use spritescan::palette::{add_to_palette, Palette};
use spritescan::sheet::{analyze_sheet, DuplicateOf, FrameGrid, SheetError, SheetOptions};

const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SKIN: Rgba<u8> = Rgba([240, 190, 150, 255]);
const SHIRT: Rgba<u8> = Rgba([40, 90, 200, 255]);
const HEAD: Rgba<u8> = Rgba([255, 0, 0, 255]);
const LHAND: Rgba<u8> = Rgba([0, 255, 0, 255]);
const RHAND: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// A 24x24 character frame with a body, a black center marker and hand/head markers.
fn character_frame() -> RgbaImage {
    let mut img = RgbaImage::new(24, 24);
    for y in 6..20 {
        for x in 8..15 {
            img.put_pixel(x, y, if y < 10 { SKIN } else { SHIRT });
        }
    }
    img.put_pixel(11, 13, OUTLINE);
    img.put_pixel(11, 5, HEAD);
    img.put_pixel(7, 14, LHAND);
    img.put_pixel(15, 14, RHAND);
    img
}

fn whole(img: &RgbaImage) -> Bounds {
    Bounds::of_size(img.width(), img.height())
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_frame_pipeline() {
    let frame = character_frame();

    let covered = covered_bounds(&frame, None);
    assert_eq!(covered, Bounds::new(7, 5, 16, 20));

    let anchors = anchors_from_rgb(&frame, whole(&frame)).unwrap();
    assert_eq!(
        anchors,
        OffsetBundle {
            center: Some(Point::new(11, 13)),
            head: Some(Point::new(11, 5)),
            lhand: Some(Point::new(7, 14)),
            rhand: Some(Point::new(15, 14)),
        }
    );

    let center = anchors.center.unwrap();
    let centered = center_bounds(covered, center).to_bounds();
    // x reach max(11 - 7, 16 - 11) = 5, y reach max(13 - 5, 20 - 13) = 8
    assert_eq!(centered, Bounds::new(6, 5, 16, 21));

    let safe = round_up_box(centered);
    assert_eq!(safe.width() % 8, 0);
    assert_eq!(safe.height() % 8, 0);
    assert!(safe.min_x <= covered.min_x && safe.max_x >= covered.max_x);
    assert!(safe.min_y <= covered.min_y && safe.max_y >= covered.max_y);
}

#[test]
fn test_region_scan_matches_cropped_scan() {
    let frame = character_frame();
    let mut sheet = RgbaImage::new(48, 24);
    imageops::replace(&mut sheet, &frame, 24, 0);

    let region = Bounds::new(24, 0, 48, 24);
    let in_sheet = offsets_from_rgb(&sheet, region, MarkerSelection::ANCHORS).unwrap();
    let cropped = offsets_from_rgb(&frame, whole(&frame), MarkerSelection::ANCHORS).unwrap();
    assert_eq!(in_sheet, cropped);

    // Coverage stays in absolute sheet coordinates
    let covered = covered_bounds(&sheet, Some(region));
    assert_eq!(covered, covered_bounds(&frame, None).translate(Point::new(24, 0), false));
}

// ============================================================================
// Testable properties
// ============================================================================

#[test]
fn test_coverage_degenerate_and_single_pixel() {
    let empty = RgbaImage::new(12, 9);
    let b = covered_bounds(&empty, None);
    assert!(b.max_x <= b.min_x && b.max_y <= b.min_y);

    let mut one = RgbaImage::new(12, 9);
    one.put_pixel(4, 7, SKIN);
    assert_eq!(covered_bounds(&one, None), Bounds::new(4, 7, 5, 8));
}

#[test]
fn test_round_up_properties() {
    for n in 1..100 {
        for m in [1, 2, 3, 8, 16] {
            let r = round_up_to_mult(n, m);
            assert_eq!(r % m, 0);
            assert!(r >= n && r - m < n);
        }
    }
    for w in 1..20 {
        for h in 1..20 {
            let b = Bounds::from_origin_size(-3, 5, w, h);
            let r = round_up_box(b);
            assert_eq!(r.width() % 8, 0);
            assert_eq!(r.height() % 8, 0);
            assert!(r.width() >= w && r.height() >= h);
        }
    }
}

#[test]
fn test_combine_extents_and_translate() {
    let a = Bounds::new(0, 0, 4, 4);
    let b = Bounds::new(2, -1, 9, 3);
    let c = Bounds::new(-5, 2, 1, 10);
    assert_eq!(combine_extents(a, b), combine_extents(b, a));
    assert_eq!(combine_extents(combine_extents(a, b), c), combine_extents(a, combine_extents(b, c)));
    assert_eq!(combine_extents(b, b), b);

    let d = Point::new(-7, 13);
    assert_eq!(c.translate(d, false).translate(d, true), c);
}

#[test]
fn test_white_marker_alone() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(3, 4, Rgba([255, 255, 255, 255]));
    let offsets = offsets_from_rgb(&img, whole(&img), MarkerSelection::ALL).unwrap();
    assert_eq!(offsets.white, Some(Point::new(3, 4)));
    assert_eq!(offsets.center, None);
    assert_eq!(offsets.red, None);
    assert_eq!(offsets.green, None);
    assert_eq!(offsets.blue, None);
}

#[test]
fn test_two_white_markers() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(3, 4, Rgba([255, 255, 255, 255]));
    img.put_pixel(8, 1, Rgba([255, 255, 255, 255]));
    let err = offsets_from_rgb(&img, whole(&img), MarkerSelection::ALL).unwrap_err();
    assert!(matches!(err, MultipleOffsetError::DuplicateWhite { .. }));
}

#[test]
fn test_black_marker_alone_seeds_every_anchor() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(5, 6, OUTLINE);
    let offsets = offsets_from_rgb(&img, whole(&img), MarkerSelection::ANCHORS).unwrap();
    let p = Some(Point::new(5, 6));
    assert_eq!((offsets.center, offsets.red, offsets.green, offsets.blue), (p, p, p, p));
}

#[test]
fn test_black_after_independent_color_sets_only_center() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(0, 0, HEAD);
    img.put_pixel(1, 0, OUTLINE);
    let offsets = offsets_from_rgb(&img, whole(&img), MarkerSelection::ANCHORS).unwrap();
    assert_eq!(offsets.center, Some(Point::new(1, 0)));
    assert_eq!(offsets.red, Some(Point::new(0, 0)));
    assert_eq!(offsets.green, None);
    assert_eq!(offsets.blue, None);
}

#[test]
fn test_color_on_black_seeded_slot_is_an_error() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(0, 0, OUTLINE);
    img.put_pixel(1, 0, HEAD);
    let err = offsets_from_rgb(&img, whole(&img), MarkerSelection::ANCHORS).unwrap_err();
    assert!(err.to_string().starts_with("Multiple red pixels"), "{}", err);
}

#[test]
fn test_white_with_independent_color_errors_even_when_white_disabled() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(0, 0, HEAD);
    img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
    for selection in [MarkerSelection::ANCHORS, MarkerSelection::ALL] {
        let err = offsets_from_rgb(&img, whole(&img), selection).unwrap_err();
        assert_eq!(
            err,
            MultipleOffsetError::WhiteWithColor {
                found: Point::new(1, 0),
                existing: vec![Point::new(0, 0)],
            }
        );
    }
}

#[test]
fn test_disabled_white_seeds_every_anchor() {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
    let offsets = offsets_from_rgb(&img, whole(&img), MarkerSelection::ANCHORS).unwrap();
    let p = Some(Point::new(1, 1));
    assert_eq!((offsets.center, offsets.red, offsets.green, offsets.blue), (p, p, p, p));
    assert_eq!(offsets.white, None);
}

#[test]
fn test_coinciding_anchors_are_reseeded_by_black() {
    // Two black pixels with nothing else: the second re-seeds all four slots
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(2, 2, OUTLINE);
    img.put_pixel(6, 3, OUTLINE);
    let offsets = offsets_from_rgb(&img, whole(&img), MarkerSelection::ANCHORS).unwrap();
    let p = Some(Point::new(6, 3));
    assert_eq!((offsets.center, offsets.red, offsets.green, offsets.blue), (p, p, p, p));

    // Once a color is placed independently, a second black is a conflict
    img.put_pixel(0, 9, LHAND);
    let err = offsets_from_rgb(&img, whole(&img), MarkerSelection::ANCHORS).unwrap_err();
    assert!(matches!(err, MultipleOffsetError::DuplicateBlack { .. }));
}

#[test]
fn test_frame_equality_properties() {
    let frame = character_frame();
    let mirrored = imageops::flip_horizontal(&frame);
    assert!(images_equal(&frame, &frame, false));
    assert!(images_equal(&frame, &mirrored, true));
    assert!(lineart_equal(&frame, &mirrored, true));

    let anchors = anchors_from_rgb(&frame, whole(&frame)).unwrap();
    assert!(offsets_equal(&anchors, &anchors, 24, false));

    let mirrored_anchors = anchors_from_rgb(&mirrored, whole(&mirrored)).unwrap();
    assert!(offsets_equal(&anchors, &mirrored_anchors, 24, true));
    assert!(!offsets_equal(&anchors, &mirrored_anchors, 24, false));
}

#[test]
fn test_palette_accumulates_opaque_colors() {
    let mut palette = Palette::new();
    add_to_palette(&mut palette, &character_frame());
    // skin, shirt, outline, head, lhand, rhand
    assert_eq!(palette.len(), 6);
    assert!(palette.contains(SHIRT));
    add_to_palette(&mut palette, &imageops::flip_horizontal(&character_frame()));
    assert_eq!(palette.len(), 6);
}

// ============================================================================
// Sheets
// ============================================================================

#[test]
fn test_sheet_with_mirrored_walk_cycle() {
    let frame = character_frame();
    let mut sheet = RgbaImage::new(72, 24);
    imageops::replace(&mut sheet, &frame, 0, 0);
    imageops::replace(&mut sheet, &imageops::flip_horizontal(&frame), 24, 0);
    imageops::replace(&mut sheet, &frame, 48, 0);

    let report = analyze_sheet(&sheet, &SheetOptions::new(FrameGrid::new(24, 24))).unwrap();
    assert_eq!(report.frames[0].duplicate_of, None);
    assert_eq!(report.frames[1].duplicate_of, Some(DuplicateOf { index: 0, flipped: true }));
    assert_eq!(report.frames[2].duplicate_of, Some(DuplicateOf { index: 0, flipped: false }));
    assert_eq!(report.unique_count(), 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["frames"][1]["duplicate_of"]["flipped"], true);
    assert_eq!(json["frames"][0]["offsets"]["head"]["x"], 11);
    assert!(json["frames"][0].get("duplicate_of").is_none());
}

#[test]
fn test_sheet_reports_marker_conflict_with_frame_index() {
    let mut frame = character_frame();
    frame.put_pixel(12, 16, HEAD);
    let mut sheet = RgbaImage::new(48, 24);
    imageops::replace(&mut sheet, &character_frame(), 0, 0);
    imageops::replace(&mut sheet, &frame, 24, 0);

    let err = analyze_sheet(&sheet, &SheetOptions::new(FrameGrid::new(24, 24))).unwrap_err();
    match &err {
        SheetError::Markers { index, source } => {
            assert_eq!(*index, 1);
            assert_eq!(
                *source,
                MultipleOffsetError::DuplicateChannel {
                    channel: spritescan::offsets::Channel::Red,
                    found: Point::new(36, 16),
                    first: Point::new(35, 5),
                }
            );
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(err.to_string().starts_with("Frame 1: Multiple red pixels"));
}
