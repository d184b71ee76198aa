//! Authoritative crop state in image pixel space.
//!
//! `CropInfo` describes the selection independently of any viewport: the crop
//! rectangle is centered on `rotation_center`, the image is turned by
//! `rotation_angle` about that point before cropping.
//!
//! # Rotation coverage
//!
//! When the image is rotated, the axis-aligned crop window has to be covered by
//! the tilted image everywhere, which takes more magnification than the plain
//! fill scale. [`CropInfo::minimum_scale`] computes that magnification and
//! [`CropInfo::scroll_view_insets`] the matching reduction of the scroll range.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::geometry::{EdgeInsets, Point, Rect, Size};

/// Crop size, rotation center and rotation angle for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropInfo {
    image_size: Size,
    /// Size of the crop region in image pixels.
    pub crop_size: Size,
    /// Center of the crop region in image pixels.
    pub rotation_center: Point,
    /// Rotation applied to the image before cropping, in radians.
    pub rotation_angle: f64,
}

impl CropInfo {
    /// Starts a crop over the whole image.
    pub fn new(image_size: Size) -> Self {
        Self {
            image_size,
            crop_size: image_size,
            rotation_center: Point::new(image_size.width / 2.0, image_size.height / 2.0),
            rotation_angle: 0.0,
        }
    }

    /// Builds a crop state from explicit values.
    pub fn with_crop(
        image_size: Size,
        crop_size: Size,
        rotation_center: Point,
        rotation_angle: f64,
    ) -> Self {
        Self {
            image_size,
            crop_size,
            rotation_center,
            rotation_angle,
        }
    }

    /// Builds an unrotated crop state from a rectangle in image pixels.
    pub fn from_rect(image_size: Size, rect: Rect) -> Self {
        Self::with_crop(image_size, rect.size, rect.center(), 0.0)
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation_angle != 0.0
    }

    /// The crop region, centered at the rotation center.
    pub fn crop_rect(&self) -> Rect {
        Rect::centered_at(self.rotation_center, self.crop_size)
    }

    pub fn image_rect(&self) -> Rect {
        Rect::from_size(self.image_size)
    }

    /// True when the selection differs from the untouched full image.
    pub fn is_cropped(&self) -> bool {
        self.crop_size.rounded() != self.image_size.rounded() || self.is_rotated()
    }

    /// Restores the full-image, unrotated state.
    pub fn reset(&mut self) {
        self.crop_size = self.image_size;
        self.rotation_angle = 0.0;
        self.rotation_center =
            Point::new(self.image_size.width / 2.0, self.image_size.height / 2.0);
    }

    /// Intersects the crop rectangle with the image bounds.
    ///
    /// Returns the unchanged state when the crop already fits, and a reset
    /// state when the crop lies entirely outside the image.
    pub fn clamped(&self) -> CropInfo {
        let image_rect = self.image_rect();
        let crop_rect = self.crop_rect();
        if image_rect.contains_rect(&crop_rect, 1e-6) {
            return *self;
        }
        match image_rect.intersection(&crop_rect) {
            Some(rect) => CropInfo {
                crop_size: rect.size,
                rotation_center: rect.center(),
                ..*self
            },
            None => {
                let mut info = *self;
                info.reset();
                info.rotation_angle = self.rotation_angle;
                info
            }
        }
    }

    /// The same selection on a copy of the image with a different resolution.
    pub fn scaled_to(&self, image_size: Size) -> CropInfo {
        if image_size == self.image_size || !self.image_size.is_valid() {
            return CropInfo {
                image_size,
                ..*self
            };
        }
        let sx = image_size.width / self.image_size.width;
        let sy = image_size.height / self.image_size.height;
        CropInfo {
            image_size,
            crop_size: Size::new(self.crop_size.width * sx, self.crop_size.height * sy),
            rotation_center: Point::new(self.rotation_center.x * sx, self.rotation_center.y * sy),
            rotation_angle: self.rotation_angle,
        }
    }

    /// Minimum scale of the whole image for the current angle.
    pub fn minimum_scale_for(&self, crop_size: Size) -> f64 {
        Self::minimum_scale(crop_size, self.image_size, self.rotation_angle)
    }

    /// Smallest uniform scale at which an image of `full_size`, rotated by
    /// `angle`, still covers a centered crop window of `crop_size`.
    ///
    /// Four candidates are formed from the horizontal and vertical rotation
    /// coverage factors combined with the fit and fill scales; the median of
    /// the four (index 2 once sorted) is returned.
    pub fn minimum_scale(crop_size: Size, full_size: Size, angle: f64) -> f64 {
        let angle = angle.abs();
        let fill = full_size.scale_to_fill(crop_size);
        let fit = full_size.scale_to_fit(crop_size);

        let horizontal = horizontal_coverage(crop_size, angle);
        let vertical = vertical_coverage(crop_size, angle);

        let mut candidates = [
            vertical * fit,
            horizontal * fit,
            horizontal * fill,
            vertical * fill,
        ];
        candidates.sort_by(f64::total_cmp);
        candidates[2]
    }

    /// Exact scale at which `full_size` contains the bounding box of a crop
    /// window of `crop_size` turned by `angle`.
    ///
    /// Matches [`CropInfo::minimum_scale`] when crop and image share their
    /// proportions and is never smaller than it.
    pub fn covering_scale(crop_size: Size, full_size: Size, angle: f64) -> f64 {
        let (sin, cos) = angle.abs().sin_cos();
        let needed = Size::new(
            crop_size.width * cos + crop_size.height * sin,
            crop_size.height * cos + crop_size.width * sin,
        );
        full_size.scale_to_fill(needed)
    }

    pub fn scroll_view_insets_for(&self, size: Size) -> EdgeInsets {
        Self::scroll_view_insets(size, self.rotation_angle)
    }

    /// Extra inset on each side of the viewport that keeps a rotated image
    /// covering a crop window of `size`.
    ///
    /// The values are negative and symmetric; they are exactly zero at angle 0.
    pub fn scroll_view_insets(size: Size, angle: f64) -> EdgeInsets {
        if angle == 0.0 {
            return EdgeInsets::ZERO;
        }
        let angle = angle.abs();
        let (sin, cos) = angle.sin_cos();
        let w = size.width / 2.0;
        let h = size.height / 2.0;
        let horizontal = w * cos + h * sin - w;
        let vertical = h * cos + w * sin - h;
        EdgeInsets::new(-vertical, -horizontal, -vertical, -horizontal)
    }
}

/// Width of the tilted image edge across the crop window, relative to the
/// window width.
fn horizontal_coverage(size: Size, angle: f64) -> f64 {
    let top_left = triangle_point(
        Point::ZERO,
        Point::new(0.0, size.height),
        FRAC_PI_2 - angle,
        angle,
    );
    let top_right = triangle_point(
        Point::new(size.width, 0.0),
        Point::ZERO,
        FRAC_PI_2 - angle,
        angle,
    );
    top_left.distance(top_right) / size.width
}

/// Height of the tilted image edge across the crop window, relative to the
/// window height.
fn vertical_coverage(size: Size, angle: f64) -> f64 {
    let top_left = triangle_point(
        Point::ZERO,
        Point::new(0.0, size.height),
        FRAC_PI_2 - angle,
        angle,
    );
    let bottom_left = triangle_point(
        Point::new(0.0, size.height),
        Point::new(size.width, size.height),
        FRAC_PI_2 - angle,
        angle,
    );
    top_left.distance(bottom_left) / size.height
}

/// Third vertex of a triangle from two vertices and the angles at them.
///
/// With `a3 = |p2 - p1|`, `alp3 = π - alp1 - alp2` and the law of sines
/// `a2 = a3·sin(alp2)/sin(alp3)`, the vertex solves
///
/// ```text
/// u·x3 + v·y3 = x1·u + y1·v + a2·a3·cos(alp1)
/// u·y3 - v·x3 = y2·u - x2·v + a2·a3·sin(alp1)
/// ```
///
/// where `(u, v) = p2 - p1`.
pub(crate) fn triangle_point(p1: Point, p2: Point, alp1: f64, alp2: f64) -> Point {
    let (x1, y1) = (p1.x, p1.y);
    let (x2, y2) = (p2.x, p2.y);

    let u = x2 - x1;
    let v = y2 - y1;
    let a3 = u.hypot(v);
    let alp3 = PI - alp1 - alp2;
    let a2 = a3 * alp2.sin() / alp3.sin();
    let rhs1 = x1 * u + y1 * v + a2 * a3 * alp1.cos();
    let rhs2 = y2 * u - x2 * v + a2 * a3 * alp1.sin();
    let a3_sq = a3 * a3;
    Point::new(
        (u * rhs1 - v * rhs2) / a3_sq,
        (v * rhs1 + u * rhs2) / a3_sq,
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================
