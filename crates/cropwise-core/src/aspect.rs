//! Aspect-ratio catalog for constrained cropping.
//!
//! Ratios are expressed as width divided by height, so portrait presets are
//! below 1.0 and landscape presets above it.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// A named crop ratio or a custom one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AspectRatio {
    R1x1,
    R2x3,
    R3x5,
    R3x4,
    R4x5,
    R5x7,
    R9x16,
    R3x2,
    R4x3,
    R16x9,
    /// Arbitrary width/height ratio. Build it through [`AspectRatio::custom`].
    Custom(f64),
}

impl AspectRatio {
    /// Every named preset, portrait first.
    pub const ALL: [AspectRatio; 10] = [
        Self::R1x1,
        Self::R2x3,
        Self::R3x5,
        Self::R3x4,
        Self::R4x5,
        Self::R5x7,
        Self::R9x16,
        Self::R3x2,
        Self::R4x3,
        Self::R16x9,
    ];

    /// Creates a custom ratio, rejecting values that are not finite and positive.
    pub fn custom(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self::Custom(ratio))
    }

    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        match self {
            Self::R1x1 => 1.0,
            Self::R2x3 => 2.0 / 3.0,
            Self::R3x5 => 3.0 / 5.0,
            Self::R3x4 => 3.0 / 4.0,
            Self::R4x5 => 4.0 / 5.0,
            Self::R5x7 => 5.0 / 7.0,
            Self::R9x16 => 9.0 / 16.0,
            Self::R3x2 => 3.0 / 2.0,
            Self::R4x3 => 4.0 / 3.0,
            Self::R16x9 => 16.0 / 9.0,
            Self::Custom(ratio) => ratio,
        }
    }

    /// Human-readable label for ratio pickers.
    pub fn title(self) -> &'static str {
        match self {
            Self::R1x1 => "1:1",
            Self::R2x3 => "2:3",
            Self::R3x5 => "3:5",
            Self::R3x4 => "3:4",
            Self::R4x5 => "4:5",
            Self::R5x7 => "5:7",
            Self::R9x16 => "9:16",
            Self::R3x2 => "3:2",
            Self::R4x3 => "4:3",
            Self::R16x9 => "16:9",
            Self::Custom(_) => "Custom",
        }
    }
}

/// Ratio choice at the session level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CropAspectRatio {
    /// Keep the proportions of the source image.
    Original,
    Fixed(AspectRatio),
}

impl CropAspectRatio {
    /// Resolves the choice to a concrete ratio for an image.
    ///
    /// Returns `None` for `Original` when the image size is degenerate, and
    /// for a `Custom` ratio that is not finite and positive.
    pub fn resolve(self, image_size: Size) -> Option<f64> {
        match self {
            Self::Original => image_size.is_valid().then(|| image_size.aspect_ratio()),
            Self::Fixed(ratio) => Some(ratio.ratio()).filter(|r| r.is_finite() && *r > 0.0),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Fixed(ratio) => ratio.title(),
        }
    }
}

impl From<AspectRatio> for CropAspectRatio {
    fn from(ratio: AspectRatio) -> Self {
        Self::Fixed(ratio)
    }
}
