//! Session configuration.
//!
//! Hosts usually keep the defaults; the struct is serde-friendly so it can be
//! loaded from a JSON settings file with any subset of fields present.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{EdgeInsets, Edges, Rect, Size};
use crate::transform::InterpolationFilter;

/// Tunables for a [`CropSession`](crate::session::CropSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropOptions {
    /// Smallest crop side in points.
    pub min_side: f64,
    /// Width of the touch band around each crop edge.
    pub touch_area: f64,
    pub maximum_zoom: f64,
    /// Quiet time after a gesture before the crop is re-centered.
    #[serde(with = "millis")]
    pub align_delay: Duration,
    /// Quiet time before the blur overlay comes back.
    #[serde(with = "millis")]
    pub blur_delay: Duration,
    /// Space kept between the viewport edges and the largest crop frame.
    pub crop_margin: EdgeInsets,
    /// Height of the host's control band along the bottom of the viewport.
    pub controls_height: f64,
    pub export_filter: InterpolationFilter,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            min_side: 88.0,
            touch_area: 44.0,
            maximum_zoom: 10.0,
            align_delay: Duration::from_millis(1200),
            blur_delay: Duration::from_millis(300),
            crop_margin: EdgeInsets::uniform(16.0),
            controls_height: 0.0,
            export_filter: InterpolationFilter::Lanczos3,
        }
    }
}

impl CropOptions {
    /// Replaces values that would break the geometry with their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_side.is_finite() && self.min_side > 0.0) {
            tracing::warn!(min_side = self.min_side, "invalid min_side; using default");
            self.min_side = defaults.min_side;
        }
        if !(self.touch_area.is_finite() && self.touch_area >= 0.0) {
            tracing::warn!(
                touch_area = self.touch_area,
                "invalid touch_area; using default"
            );
            self.touch_area = defaults.touch_area;
        }
        if !(self.maximum_zoom.is_finite() && self.maximum_zoom > 0.0) {
            tracing::warn!(
                maximum_zoom = self.maximum_zoom,
                "invalid maximum_zoom; using default"
            );
            self.maximum_zoom = defaults.maximum_zoom;
        }
        let margin = self.crop_margin;
        let margin_ok = [margin.top, margin.left, margin.bottom, margin.right]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        if !margin_ok {
            tracing::warn!(?margin, "invalid crop_margin; using default");
            self.crop_margin = defaults.crop_margin;
        }
        if !(self.controls_height.is_finite() && self.controls_height >= 0.0) {
            tracing::warn!(
                controls_height = self.controls_height,
                "invalid controls_height; using default"
            );
            self.controls_height = defaults.controls_height;
        }
        self
    }

    /// The largest crop frame for a viewport of `size`.
    ///
    /// The control band is removed first, then the margins. Falls back to the
    /// whole viewport when nothing is left.
    pub fn max_crop_frame(&self, size: Size) -> Rect {
        let frame = Rect::from_size(size)
            .cropped_by(self.controls_height, Edges::BOTTOM)
            .inset_by_insets(self.crop_margin);
        if frame.size.is_valid() {
            frame
        } else {
            Rect::from_size(size)
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
