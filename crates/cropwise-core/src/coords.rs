//! Coordinate-space conversions.
//!
//! Three spaces show up in the crop engine:
//!
//! - **Image space**: upright image pixels, origin top-left, y down. `CropInfo`
//!   lives here.
//! - **Bitmap space**: the same pixels with the origin at the bottom-left and
//!   y up, which is what the rotation primitive works in. Positive angles are
//!   counter-clockwise here.
//! - **Display space**: viewport points, origin top-left, y down. The image is
//!   scaled by the zoom, scrolled by the offset and the whole scroll surface is
//!   rotated about the viewport center. Positive angles turn clockwise on
//!   screen.
//!
//! Every sign flip between these spaces goes through this module.

use crate::geometry::Point;

/// Converts an image-space point to bitmap space for an image `height` tall.
#[inline]
pub fn image_to_bitmap(point: Point, height: f64) -> Point {
    Point::new(point.x, height - point.y)
}

/// Converts a bitmap-space point back to image space.
#[inline]
pub fn bitmap_to_image(point: Point, height: f64) -> Point {
    Point::new(point.x, height - point.y)
}

/// Converts a display rotation into the equivalent bitmap-space angle.
///
/// A clockwise turn on a y-down screen is a clockwise turn in a y-up bitmap,
/// which is a negative angle there.
#[inline]
pub fn display_angle_to_bitmap(angle: f64) -> f64 {
    -angle
}

/// Rotates `point` about `center` by `angle` radians using the standard
/// rotation matrix in whatever frame the inputs are expressed in.
#[inline]
pub fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// The mapping between display space and image space for one viewport state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    /// Center of the viewport, the pivot of the rotation.
    pub pivot: Point,
    pub angle: f64,
    pub zoom: f64,
    pub offset: Point,
}

impl DisplayTransform {
    /// Image point shown at a display point.
    pub fn display_to_image(&self, point: Point) -> Point {
        let local = rotate_about(point, self.pivot, -self.angle);
        Point::new(
            (local.x + self.offset.x) / self.zoom,
            (local.y + self.offset.y) / self.zoom,
        )
    }

    /// Display point where an image point is drawn.
    pub fn image_to_display(&self, point: Point) -> Point {
        let local = Point::new(
            point.x * self.zoom - self.offset.x,
            point.y * self.zoom - self.offset.y,
        );
        rotate_about(local, self.pivot, self.angle)
    }

    /// Offset that puts `image_point` under `display_point` at the current
    /// zoom and angle.
    pub fn offset_placing(&self, image_point: Point, display_point: Point) -> Point {
        let local = rotate_about(display_point, self.pivot, -self.angle);
        Point::new(
            image_point.x * self.zoom - local.x,
            image_point.y * self.zoom - local.y,
        )
    }
}
