//! Source orientation metadata and orientation remapping.
//!
//! A bitmap's pixels are stored "raw" (as the sensor wrote them) together with
//! an EXIF-style orientation that says how to turn them upright. The crop
//! engine works in the upright ("oriented") space; these helpers move points,
//! rectangles and pixel buffers between the two.
//!
//! # Mapping table
//!
//! For an oriented point `(dx, dy)` in an oriented image of size `(Dw, Dh)`:
//!
//! ```text
//! Normal          raw = (dx,      dy)
//! FlipHorizontal  raw = (Dw - dx, dy)
//! Rotate180       raw = (Dw - dx, Dh - dy)
//! FlipVertical    raw = (dx,      Dh - dy)
//! Transpose       raw = (dy,      dx)
//! Rotate90CW      raw = (dy,      Dw - dx)
//! Transverse      raw = (Dh - dy, Dw - dx)
//! Rotate270CW     raw = (Dh - dy, dx)
//! ```

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

/// How the stored pixels must be turned to appear upright.
///
/// Discriminants are the EXIF tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    /// Mirrored left to right.
    FlipHorizontal = 2,
    Rotate180 = 3,
    /// Mirrored top to bottom.
    FlipVertical = 4,
    /// Mirrored across the main diagonal.
    Transpose = 5,
    /// Stored a quarter turn counter-clockwise; shown after turning clockwise.
    Rotate90CW = 6,
    /// Mirrored across the anti-diagonal.
    Transverse = 7,
    Rotate270CW = 8,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Normal,
        Orientation::FlipHorizontal,
        Orientation::Rotate180,
        Orientation::FlipVertical,
        Orientation::Transpose,
        Orientation::Rotate90CW,
        Orientation::Transverse,
        Orientation::Rotate270CW,
    ];

    /// Orientation for an EXIF tag value, `None` outside 1..=8.
    pub fn from_exif(value: u8) -> Option<Self> {
        (1..=8)
            .contains(&value)
            .then(|| Self::ALL[usize::from(value - 1)])
    }

    pub fn exif(self) -> u8 {
        self as u8
    }

    /// Quarter-turn orientations exchange width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// Size of the upright image for a raw buffer of `raw_size`.
    pub fn oriented_size(self, raw_size: Size) -> Size {
        if self.swaps_dimensions() {
            raw_size.transposed()
        } else {
            raw_size
        }
    }

    /// Maps a point of the upright image back into raw pixel space.
    pub fn raw_point(self, point: Point, oriented_size: Size) -> Point {
        let (dw, dh) = (oriented_size.width, oriented_size.height);
        let (dx, dy) = (point.x, point.y);
        match self {
            Orientation::Normal => Point::new(dx, dy),
            Orientation::FlipHorizontal => Point::new(dw - dx, dy),
            Orientation::Rotate180 => Point::new(dw - dx, dh - dy),
            Orientation::FlipVertical => Point::new(dx, dh - dy),
            Orientation::Transpose => Point::new(dy, dx),
            Orientation::Rotate90CW => Point::new(dy, dw - dx),
            Orientation::Transverse => Point::new(dh - dy, dw - dx),
            Orientation::Rotate270CW => Point::new(dh - dy, dx),
        }
    }

    /// Maps a rectangle of the upright image back into raw pixel space.
    pub fn raw_rect(self, rect: Rect, oriented_size: Size) -> Rect {
        let a = self.raw_point(rect.origin, oriented_size);
        let b = self.raw_point(
            Point::new(rect.max_x(), rect.max_y()),
            oriented_size,
        );
        Rect::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    /// Turns raw pixels upright.
    pub fn apply(self, raw: DynamicImage) -> DynamicImage {
        use Orientation::*;
        match self {
            Normal => raw,
            FlipHorizontal => raw.fliph(),
            Rotate180 => raw.rotate180(),
            FlipVertical => raw.flipv(),
            Transpose => raw.rotate90().fliph(),
            Rotate90CW => raw.rotate90(),
            Transverse => raw.rotate270().fliph(),
            Rotate270CW => raw.rotate270(),
        }
    }
}
