//! Sprite sheet analysis - splits a sheet into frames and runs every scanner
//!
//! For each frame cell of a sheet this computes the coverage box, the marker
//! anchors, a size-aligned safe box around the body center, and whether the
//! frame duplicates an earlier one (optionally mirrored).

use std::str::FromStr;

use image::{imageops, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compare::{images_equal, lineart_equal, offsets_equal};
use crate::coverage::covered_bounds;
use crate::geometry::{center_bounds, combine_extents, round_up_box, Bounds, Point};
use crate::offsets::{offsets_from_rgb, MarkerSelection, MultipleOffsetError, OffsetBundle};

/// Error while analyzing a sheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    /// Frame width or height is zero
    #[error("Frame size must be non-zero, got {width}x{height}")]
    ZeroFrameSize { width: u32, height: u32 },
    /// Sheet dimensions are not a whole number of frames
    #[error("Sheet size ({sheet_w}x{sheet_h}) is not divisible by frame size ({frame_w}x{frame_h})", sheet_w = sheet.0, sheet_h = sheet.1, frame_w = frame.0, frame_h = frame.1)]
    NotDivisible { sheet: (u32, u32), frame: (u32, u32) },
    /// Conflicting marker pixels inside one frame
    #[error("Frame {index}: {source}")]
    Markers { index: usize, source: MultipleOffsetError },
}

/// Size of one frame cell in a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGrid {
    pub frame_width: u32,
    pub frame_height: u32,
}

/// One frame cell, in sheet coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameCell {
    /// Row-major frame index
    pub index: usize,
    pub column: u32,
    pub row: u32,
    pub bounds: Bounds,
}

impl FrameGrid {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self { frame_width, frame_height }
    }

    /// Split a `sheet_width` x `sheet_height` sheet into frame cells, row by row.
    pub fn frames(&self, sheet_width: u32, sheet_height: u32) -> Result<Vec<FrameCell>, SheetError> {
        let (fw, fh) = (self.frame_width, self.frame_height);
        if fw == 0 || fh == 0 {
            return Err(SheetError::ZeroFrameSize { width: fw, height: fh });
        }
        if sheet_width % fw != 0 || sheet_height % fh != 0 {
            return Err(SheetError::NotDivisible {
                sheet: (sheet_width, sheet_height),
                frame: (fw, fh),
            });
        }

        let columns = sheet_width / fw;
        let rows = sheet_height / fh;
        let mut cells = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(FrameCell {
                    index: cells.len(),
                    column,
                    row,
                    bounds: Bounds::from_origin_size(
                        (column * fw) as i32,
                        (row * fh) as i32,
                        fw as i32,
                        fh as i32,
                    ),
                });
            }
        }
        Ok(cells)
    }
}

impl FromStr for FrameGrid {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `32x32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("invalid frame size '{}', expected WIDTHxHEIGHT", s))?;
        let width = w.trim().parse::<u32>().map_err(|_| format!("invalid frame width '{}'", w))?;
        let height = h.trim().parse::<u32>().map_err(|_| format!("invalid frame height '{}'", h))?;
        Ok(Self { frame_width: width, frame_height: height })
    }
}

/// Settings for [`analyze_sheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetOptions {
    pub grid: FrameGrid,
    pub markers: MarkerSelection,
    /// Also match frames against mirrored earlier frames
    pub flip: bool,
    /// Compare line art only instead of exact pixels
    pub lineart: bool,
}

impl SheetOptions {
    pub fn new(grid: FrameGrid) -> Self {
        Self { grid, markers: MarkerSelection::default(), flip: true, lineart: false }
    }
}

/// Reference from a duplicate frame to the first frame it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOf {
    pub index: usize,
    pub flipped: bool,
}

/// Analysis of a single frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub index: usize,
    pub column: u32,
    pub row: u32,
    /// Cell position in the sheet
    pub bounds: Bounds,
    /// Coverage box relative to the frame, `None` for a fully transparent frame
    pub covered: Option<Bounds>,
    pub offsets: OffsetBundle,
    /// Coverage box centered on the body center and rounded up to the
    /// alignment, relative to the frame
    pub safe_box: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<DuplicateOf>,
}

/// Analysis of a whole sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetReport {
    pub frame_width: u32,
    pub frame_height: u32,
    pub frames: Vec<FrameReport>,
}

impl SheetReport {
    /// Union of every frame's coverage box (frame relative), if any frame has
    /// content.
    pub fn union_extent(&self) -> Option<Bounds> {
        self.frames.iter().filter_map(|f| f.covered).reduce(combine_extents)
    }

    /// Number of frames that are not duplicates.
    pub fn unique_count(&self) -> usize {
        self.frames.iter().filter(|f| f.duplicate_of.is_none()).count()
    }
}

/// Safe box for a frame: symmetric around `center`, then aligned.
pub fn safe_box(covered: Bounds, center: Point) -> Bounds {
    round_up_box(center_bounds(covered, center).to_bounds())
}

struct ScannedFrame {
    image: RgbaImage,
    covered: Option<Bounds>,
    offsets: OffsetBundle,
}

fn scan_frame(
    sheet: &RgbaImage,
    cell: &FrameCell,
    markers: MarkerSelection,
) -> Result<ScannedFrame, SheetError> {
    let b = cell.bounds;
    let image =
        imageops::crop_imm(sheet, b.min_x as u32, b.min_y as u32, b.width() as u32, b.height() as u32)
            .to_image();

    let covered = Some(covered_bounds(&image, None)).filter(|c| !c.is_degenerate());
    let offsets = offsets_from_rgb(sheet, b, markers)
        .map_err(|source| SheetError::Markers { index: cell.index, source })?;

    Ok(ScannedFrame { image, covered, offsets: offsets.into() })
}

/// Analyze every frame of a sprite sheet.
///
/// Frames are scanned in parallel. Deduplication then walks the frames in
/// order and matches each one against the earlier frames that are not
/// duplicates themselves: first unmirrored, then (with `flip`) mirrored.
/// Pixels and anchors must both match. When several frames have conflicting
/// markers, the lowest frame index is reported.
#[tracing::instrument(level = "debug", skip(sheet), fields(width = sheet.width(), height = sheet.height()))]
pub fn analyze_sheet(sheet: &RgbaImage, options: &SheetOptions) -> Result<SheetReport, SheetError> {
    let cells = options.grid.frames(sheet.width(), sheet.height())?;

    let scanned: Vec<Result<ScannedFrame, SheetError>> =
        cells.par_iter().map(|cell| scan_frame(sheet, cell, options.markers)).collect();
    let scanned = scanned.into_iter().collect::<Result<Vec<_>, _>>()?;

    let frame_width = options.grid.frame_width as i32;
    let frame_height = options.grid.frame_height as i32;
    let same_pixels = |a: &RgbaImage, b: &RgbaImage, flip: bool| {
        if options.lineart {
            lineart_equal(a, b, flip)
        } else {
            images_equal(a, b, flip)
        }
    };

    let mut frames: Vec<FrameReport> = Vec::with_capacity(cells.len());
    for (cell, frame) in cells.iter().zip(&scanned) {
        let mut duplicate_of = None;
        for (earlier, prior) in frames.iter().zip(&scanned) {
            if earlier.duplicate_of.is_some() {
                continue;
            }
            let flips: &[bool] = if options.flip { &[false, true] } else { &[false] };
            if let Some(&flipped) = flips.iter().find(|&&flip| {
                same_pixels(&frame.image, &prior.image, flip)
                    && offsets_equal(&frame.offsets, &prior.offsets, frame_width, flip)
            }) {
                duplicate_of = Some(DuplicateOf { index: earlier.index, flipped });
                break;
            }
        }
        if let Some(dup) = duplicate_of {
            tracing::debug!(frame = cell.index, of = dup.index, flipped = dup.flipped, "duplicate frame");
        }

        let center = frame.offsets.center.unwrap_or(Point::new(frame_width / 2, frame_height / 2));
        frames.push(FrameReport {
            index: cell.index,
            column: cell.column,
            row: cell.row,
            bounds: cell.bounds,
            covered: frame.covered,
            offsets: frame.offsets,
            safe_box: frame.covered.map(|c| safe_box(c, center)),
            duplicate_of,
        });
    }

    Ok(SheetReport {
        frame_width: options.grid.frame_width,
        frame_height: options.grid.frame_height,
        frames,
    })
}
