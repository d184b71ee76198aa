//! Pixel-exact rectangular crops.
//!
//! The crop rectangle is given in pixel coordinates (origin top-left) and is
//! rounded to whole pixels. The output always has the rounded size of the
//! rectangle; parts of the rectangle outside the source come out black.

use crate::bitmap::Bitmap;
use crate::error::ExtractError;
use crate::geometry::Rect;

/// Largest output side, as a multiple of the longer source side.
const MAX_OUTPUT_FACTOR: f64 = 2.0;

/// Copies the pixels under `rect` out of the raw buffer of `bitmap`.
///
/// # Errors
///
/// [`ExtractError::InvalidGeometry`] when the rectangle is not finite, rounds
/// to an empty size or is far larger than the source. [`ExtractError::Bitmap`]
/// when the source buffer is unusable.
pub fn crop_pixels(bitmap: &Bitmap, rect: Rect) -> Result<Bitmap, ExtractError> {
    bitmap.validate()?;
    let invalid = || ExtractError::InvalidGeometry {
        width: rect.width(),
        height: rect.height(),
    };
    if !rect.is_finite() {
        return Err(invalid());
    }
    let out_w = rect.width().round();
    let out_h = rect.height().round();
    let max_side = bitmap.width.max(bitmap.height) as f64 * MAX_OUTPUT_FACTOR;
    if out_w < 1.0 || out_h < 1.0 || out_w > max_side || out_h > max_side {
        return Err(invalid());
    }
    let (out_w, out_h) = (out_w as u32, out_h as u32);
    let left = rect.min_x().round() as i64;
    let top = rect.min_y().round() as i64;

    // Whole bitmap requested.
    if left == 0 && top == 0 && out_w == bitmap.width && out_h == bitmap.height {
        return Ok(Bitmap::new(bitmap.width, bitmap.height, bitmap.pixels.clone()));
    }

    let mut output = vec![0u8; out_w as usize * out_h as usize * 3];

    // Columns of the output that overlap the source.
    let src_w = bitmap.width as i64;
    let col_start = (-left).clamp(0, out_w as i64);
    let col_end = (src_w - left).clamp(col_start, out_w as i64);
    if col_end == col_start {
        return Ok(Bitmap::new(out_w, out_h, output));
    }
    let span = (col_end - col_start) as usize * 3;

    for y in 0..out_h as i64 {
        let src_y = top + y;
        if src_y < 0 || src_y >= bitmap.height as i64 {
            continue;
        }
        let src_start = ((src_y * src_w + left + col_start) * 3) as usize;
        let dst_start = ((y * out_w as i64 + col_start) * 3) as usize;
        output[dst_start..dst_start + span]
            .copy_from_slice(&bitmap.pixels[src_start..src_start + span]);
    }

    Ok(Bitmap::new(out_w, out_h, output))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
