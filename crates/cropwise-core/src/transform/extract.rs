//! Final crop extraction.
//!
//! Turns a source bitmap and a [`CropInfo`] into the cropped output:
//!
//! 1. Orientation: the bitmap is made upright. An unrotated crop takes a
//!    shortcut and cuts the raw buffer first, orienting only the result.
//! 2. Rotation: the upright bitmap is turned about the rotation center onto a
//!    black canvas of the same extent.
//! 3. Crop: the crop rectangle is cut out at its rounded pixel size.

use crate::bitmap::{Bitmap, BitmapProvider};
use crate::crop_info::CropInfo;
use crate::error::ExtractError;

use super::crop::crop_pixels;
use super::rotation::{rotate_bitmap, InterpolationFilter};

/// Extracts the region described by `info` from `bitmap`.
///
/// When `info` was computed for a different resolution of the same image,
/// the selection is scaled to the bitmap first.
///
/// # Errors
///
/// Fails when the bitmap buffer is unusable or the crop is empty or not
/// finite.
pub fn extract(
    bitmap: &Bitmap,
    info: &CropInfo,
    filter: InterpolationFilter,
) -> Result<Bitmap, ExtractError> {
    bitmap.validate()?;
    let info = info.scaled_to(bitmap.oriented_size());
    let crop_rect = info.crop_rect();
    if !crop_rect.is_finite() || !info.rotation_angle.is_finite() || !crop_rect.size.is_valid() {
        return Err(ExtractError::InvalidGeometry {
            width: crop_rect.width(),
            height: crop_rect.height(),
        });
    }

    if !info.is_rotated() {
        let raw_rect = bitmap
            .orientation
            .raw_rect(crop_rect, bitmap.oriented_size());
        let raw = crop_pixels(bitmap, raw_rect)?;
        return Ok(raw.with_orientation(bitmap.orientation).normalized()?);
    }

    let upright = bitmap.normalized()?;
    let rotated = rotate_bitmap(&upright, info.rotation_center, info.rotation_angle, filter);
    crop_pixels(&rotated, crop_rect)
}

/// Extracts from whichever representation of the image has pixels.
pub fn extract_from(
    provider: &dyn BitmapProvider,
    info: &CropInfo,
    filter: InterpolationFilter,
) -> Result<Bitmap, ExtractError> {
    if let Some(bitmap) = provider.primary().filter(|b| !b.is_empty()) {
        return extract(bitmap, info, filter);
    }
    match provider.alternate() {
        Some(bitmap) if !bitmap.is_empty() => extract(&bitmap, info, filter),
        _ => Err(ExtractError::UnsupportedSource),
    }
}

/// Extracts the crop with export quality, falling back to the unchanged
/// source when extraction fails.
pub fn create_cropped_image(bitmap: &Bitmap, info: &CropInfo) -> Bitmap {
    match extract(bitmap, info, InterpolationFilter::Lanczos3) {
        Ok(cropped) => cropped,
        Err(err) => {
            tracing::warn!(
                %err,
                width = bitmap.width,
                height = bitmap.height,
                "crop extraction failed; returning source image"
            );
            bitmap.clone()
        }
    }
}
