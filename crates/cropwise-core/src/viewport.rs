//! Viewport state and its reconciliation with the crop.
//!
//! The image (natural size `content_size`) is scaled by `zoom`, scrolled by
//! `offset` and the whole scroll surface is turned by `rotation_angle` about
//! the viewport center. The crop frame is an axis-aligned rectangle in
//! viewport coordinates. [`Viewport`] is a `Copy` value; every reducer takes
//! the current state and returns the next one, so a session can keep the
//! previous state around for comparisons.
//!
//! After every reducer the viewport is *settled*: the minimum zoom is
//! recomputed for the crop frame and angle, the zoom is clamped into range and
//! the offset is clamped so the image covers the whole crop window.

use serde::{Deserialize, Serialize};

use crate::coords::{rotate_about, DisplayTransform};
use crate::crop_info::CropInfo;
use crate::geometry::{EdgeInsets, Point, Rect, Size};

/// Scroll and zoom state of the image behind the crop frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport size in points.
    pub size: Size,
    /// Area the crop frame may occupy.
    pub max_crop_frame: Rect,
    pub crop_frame: Rect,
    /// Natural image size in pixels.
    pub content_size: Size,
    pub zoom: f64,
    /// Last zoom asked for by the user or an align pass, before clamping.
    pub user_zoom: f64,
    pub minimum_zoom: f64,
    pub maximum_zoom: f64,
    pub offset: Point,
    pub content_inset: EdgeInsets,
    pub rotation_angle: f64,
}

impl Viewport {
    /// Fits the whole image into `max_crop_frame`, centered and unrotated.
    pub fn fitted(
        size: Size,
        max_crop_frame: Rect,
        content_size: Size,
        maximum_zoom: f64,
    ) -> Self {
        Self::blank(size, max_crop_frame, content_size, maximum_zoom)
            .applying(&CropInfo::new(content_size))
    }

    fn blank(size: Size, max_crop_frame: Rect, content_size: Size, maximum_zoom: f64) -> Self {
        Self {
            size,
            max_crop_frame,
            crop_frame: max_crop_frame,
            content_size,
            zoom: 1.0,
            user_zoom: 1.0,
            minimum_zoom: 0.0,
            maximum_zoom,
            offset: Point::ZERO,
            content_inset: EdgeInsets::ZERO,
            rotation_angle: 0.0,
        }
    }

    /// Center of the viewport, the pivot of the rotation.
    pub fn pivot(&self) -> Point {
        Rect::from_size(self.size).center()
    }

    pub fn transform(&self) -> DisplayTransform {
        DisplayTransform {
            pivot: self.pivot(),
            angle: self.rotation_angle,
            zoom: self.zoom,
            offset: self.offset,
        }
    }

    /// The crop state shown by this viewport, in image pixels.
    pub fn crop_info(&self) -> CropInfo {
        CropInfo::with_crop(
            self.content_size,
            self.crop_frame.size.scaled(1.0 / self.zoom),
            self.transform().display_to_image(self.crop_frame.center()),
            self.rotation_angle,
        )
    }

    /// Smallest zoom at which the image covers a crop frame of `crop_size`
    /// turned by `angle`.
    ///
    /// The median-of-four estimate from [`CropInfo::minimum_scale`] is exact
    /// when crop and image share proportions; the bounding-box cover handles
    /// the rest.
    pub fn minimum_zoom_for(&self, crop_size: Size, angle: f64) -> f64 {
        let estimate = CropInfo::minimum_scale(crop_size, self.content_size, angle);
        let cover = CropInfo::covering_scale(crop_size, self.content_size, angle);
        estimate.max(cover)
    }

    /// Rebuilds the viewport around a crop state: the crop is fitted into the
    /// max crop frame and the image placed so the crop shows the same pixels.
    pub fn applying(self, info: &CropInfo) -> Self {
        let scale = info.crop_size.scale_to_fit(self.max_crop_frame.size);
        let crop_frame = Rect::centered_in(self.max_crop_frame, info.crop_size.scaled(scale));
        Self {
            crop_frame,
            zoom: scale,
            user_zoom: scale,
            rotation_angle: info.rotation_angle,
            ..self
        }
        .reframed(info.rotation_center, crop_frame.center())
    }

    /// Replaces the crop frame, leaving the image where it is on screen unless
    /// the new frame needs more zoom to stay covered.
    pub fn with_crop_frame(self, frame: Rect) -> Self {
        let frame = self.max_crop_frame.intersection(&frame).unwrap_or(self.crop_frame);
        let anchor = self.transform().display_to_image(frame.center());
        Self {
            crop_frame: frame,
            ..self
        }
        .reframed(anchor, frame.center())
    }

    /// Turns the image to `angle`, keeping the pixel under the crop center.
    pub fn with_rotation(self, angle: f64) -> Self {
        let center = self.crop_frame.center();
        let anchor = self.transform().display_to_image(center);
        Self {
            rotation_angle: angle,
            ..self
        }
        .reframed(anchor, center)
    }

    /// Scrolls by a finger movement of `delta` display points.
    pub fn panned_by(self, delta: Point) -> Self {
        let local = rotate_about(delta, Point::ZERO, -self.rotation_angle);
        let offset = Point::new(self.offset.x - local.x, self.offset.y - local.y);
        Self { offset, ..self }.settled()
    }

    /// Multiplies the zoom by `scale`, keeping the pixel under `anchor` in
    /// place.
    pub fn zoomed(self, scale: f64, anchor: Point) -> Self {
        if !scale.is_finite() || scale <= 0.0 {
            return self;
        }
        let image_point = self.transform().display_to_image(anchor);
        let user_zoom = (self.zoom * scale)
            .min(self.maximum_zoom)
            .max(self.minimum_zoom);
        Self { user_zoom, ..self }.reframed(image_point, anchor)
    }

    /// Handles a layout change; the crop keeps showing the same pixels.
    pub fn with_size(self, size: Size, max_crop_frame: Rect) -> Self {
        let info = self.crop_info();
        Self {
            size,
            max_crop_frame,
            ..self
        }
        .applying(&info)
    }

    /// Scales the crop frame to fill the max crop frame and centers it, zooming
    /// the image by the same factor so the crop keeps its content.
    pub fn aligned_to_center(self) -> Self {
        let scale = self.crop_frame.size.scale_to_fit(self.max_crop_frame.size);
        if !scale.is_finite() || scale <= 0.0 {
            return self;
        }
        let anchor = self.transform().display_to_image(self.crop_frame.center());
        let crop_frame =
            Rect::centered_in(self.max_crop_frame, self.crop_frame.size.scaled(scale));
        Self {
            crop_frame,
            user_zoom: self.zoom * scale,
            ..self
        }
        .reframed(anchor, crop_frame.center())
    }

    /// Settles zoom and offset so `image_point` is drawn at `display_point`.
    fn reframed(mut self, image_point: Point, display_point: Point) -> Self {
        self.minimum_zoom = self.minimum_zoom_for(self.crop_frame.size, self.rotation_angle);
        self.zoom = self.clamped_zoom();
        self.offset = self.transform().offset_placing(image_point, display_point);
        self.with_clamped_offset()
    }

    /// Re-clamps zoom and offset after the offset was set directly.
    fn settled(mut self) -> Self {
        self.minimum_zoom = self.minimum_zoom_for(self.crop_frame.size, self.rotation_angle);
        self.zoom = self.clamped_zoom();
        self.content_inset = content_inset(self.size, self.crop_frame, self.rotation_angle);

        // Some scroll views refuse a negative inset while sitting at the origin.
        if self.zoom == self.minimum_zoom && self.offset == Point::ZERO {
            self.offset = Point::new(-self.content_inset.left, -self.content_inset.top);
        }
        self.with_clamped_offset()
    }

    fn clamped_zoom(&self) -> f64 {
        // The coverage floor wins over the maximum.
        self.user_zoom
            .min(self.maximum_zoom)
            .max(self.minimum_zoom)
    }

    fn with_clamped_offset(mut self) -> Self {
        self.content_inset = content_inset(self.size, self.crop_frame, self.rotation_angle);
        let inset = self.content_inset;
        let scaled = self.content_size.scaled(self.zoom);
        self.offset = Point::new(
            clamp_range(
                self.offset.x,
                -inset.left,
                scaled.width - self.size.width + inset.right,
            ),
            clamp_range(
                self.offset.y,
                -inset.top,
                scaled.height - self.size.height + inset.bottom,
            ),
        );
        self
    }
}

/// Scroll padding that keeps a crop frame covered.
///
/// The base padding is the space around the crop frame when centered, reduced
/// by the extra reach of the rotated crop window. The result is then shifted
/// by how far the crop center sits from the viewport center, measured in the
/// unrotated scroll surface.
pub fn content_inset(size: Size, crop_frame: Rect, angle: f64) -> EdgeInsets {
    let pivot = Rect::from_size(size).center();
    let center = rotate_about(crop_frame.center(), pivot, -angle);
    let dx = center.x - pivot.x;
    let dy = center.y - pivot.y;

    let h = (size.width - crop_frame.width()) / 2.0;
    let v = (size.height - crop_frame.height()) / 2.0;
    let rotation = CropInfo::scroll_view_insets(crop_frame.size, angle);

    EdgeInsets::new(
        v + rotation.top + dy,
        h + rotation.left + dx,
        v + rotation.bottom - dy,
        h + rotation.right - dx,
    )
}

/// Clamps into `[lo, hi]`, or returns the midpoint when the range is empty.
fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        (lo + hi) / 2.0
    } else {
        value.clamp(lo, hi)
    }
}
