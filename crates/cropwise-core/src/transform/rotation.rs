//! Turning a bitmap about an arbitrary pivot.
//!
//! Output pixels are filled by inverse mapping: each output pixel center is
//! rotated back onto the source and the source is sampled there. The work
//! happens in bitmap space (origin bottom-left, y up), so the display angle
//! goes through [`display_angle_to_bitmap`] first:
//!
//! ```text
//! src = pivot + R(-a) * (dst - pivot)
//! ```
//!
//! The canvas keeps the source extent. Anything the turned image does not
//! reach stays black.

use std::f64::consts::PI;

use crate::bitmap::Bitmap;
use crate::coords::{bitmap_to_image, display_angle_to_bitmap, image_to_bitmap, rotate_about};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Resampling used when pixels land between source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Weighted average of the four nearest pixels. Cheap enough for live
    /// previews.
    #[default]
    Bilinear,
    /// Windowed sinc over a 6x6 neighborhood, for exports.
    Lanczos3,
}

/// Rotates a bitmap about `center` onto a black canvas of the same size.
///
/// # Arguments
///
/// * `bitmap` - Upright source; its orientation field is ignored
/// * `center` - Pivot in image space (origin top-left)
/// * `angle` - Display angle in radians, positive turns clockwise on screen
/// * `filter` - How to sample between source pixels
pub fn rotate_bitmap(
    bitmap: &Bitmap,
    center: Point,
    angle: f64,
    filter: InterpolationFilter,
) -> Bitmap {
    if angle == 0.0 || bitmap.is_empty() {
        return bitmap.clone();
    }

    let (w, h) = (bitmap.width, bitmap.height);
    let height = h as f64;
    let pivot = image_to_bitmap(center, height);
    let inverse = -display_angle_to_bitmap(angle);

    let mut output = vec![0u8; w as usize * h as usize * 3];
    for (index, out) in output.chunks_exact_mut(3).enumerate() {
        let (x, y) = (index % w as usize, index / w as usize);
        let dst = image_to_bitmap(Point::new(x as f64 + 0.5, y as f64 + 0.5), height);
        let src = bitmap_to_image(rotate_about(dst, pivot, inverse), height);

        let rgb = match filter {
            InterpolationFilter::Bilinear => sample_bilinear(bitmap, src),
            InterpolationFilter::Lanczos3 => sample_lanczos3(bitmap, src),
        };
        out.copy_from_slice(&rgb);
    }

    Bitmap::new(w, h, output)
}

#[inline]
fn texel(bitmap: &Bitmap, x: usize, y: usize) -> [f64; 3] {
    let start = (y * bitmap.width as usize + x) * 3;
    let px = &bitmap.pixels[start..start + 3];
    [px[0] as f64, px[1] as f64, px[2] as f64]
}

#[inline]
fn accumulate(acc: &mut [f64; 3], rgb: [f64; 3], weight: f64) {
    for (sum, channel) in acc.iter_mut().zip(rgb) {
        *sum += channel * weight;
    }
}

fn to_rgb8(acc: [f64; 3], total_weight: f64) -> [u8; 3] {
    acc.map(|v| (v / total_weight).clamp(0.0, 255.0).round() as u8)
}

/// Bilinear sample at a continuous position whose pixel centers sit at
/// `i + 0.5`.
///
/// Off the bitmap the result is black; the outer half pixel repeats the edge.
fn sample_bilinear(bitmap: &Bitmap, at: Point) -> [u8; 3] {
    let (w, h) = (bitmap.width as f64, bitmap.height as f64);
    if at.x < 0.0 || at.y < 0.0 || at.x > w || at.y > h {
        return [0, 0, 0];
    }
    let x = (at.x - 0.5).clamp(0.0, w - 1.0);
    let y = (at.y - 0.5).clamp(0.0, h - 1.0);

    let (x0, y0) = (x.floor() as usize, y.floor() as usize);
    let x1 = (x0 + 1).min(bitmap.width as usize - 1);
    let y1 = (y0 + 1).min(bitmap.height as usize - 1);
    let (fx, fy) = (x - x0 as f64, y - y0 as f64);

    let mut acc = [0.0; 3];
    for (px, py, weight) in [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x1, y0, fx * (1.0 - fy)),
        (x0, y1, (1.0 - fx) * fy),
        (x1, y1, fx * fy),
    ] {
        accumulate(&mut acc, texel(bitmap, px, py), weight);
    }
    to_rgb8(acc, 1.0)
}

/// Lanczos3 sample. The 6x6 window must fit on the bitmap; near the border
/// bilinear takes over.
fn sample_lanczos3(bitmap: &Bitmap, at: Point) -> [u8; 3] {
    let (w, h) = (bitmap.width as i64, bitmap.height as i64);
    let (cx, cy) = (at.x - 0.5, at.y - 0.5);
    if cx < 2.0 || cy < 2.0 || cx >= (w - 3) as f64 || cy >= (h - 3) as f64 {
        return sample_bilinear(bitmap, at);
    }

    let (x0, y0) = (cx.floor() as i64, cy.floor() as i64);
    let mut acc = [0.0; 3];
    let mut total = 0.0;
    for py in y0 - 2..=y0 + 3 {
        let wy = lanczos_kernel(cy - py as f64, 3.0);
        for px in x0 - 2..=x0 + 3 {
            let weight = wy * lanczos_kernel(cx - px as f64, 3.0);
            accumulate(&mut acc, texel(bitmap, px as usize, py as usize), weight);
            total += weight;
        }
    }

    if total > 0.0 {
        to_rgb8(acc, total)
    } else {
        [0, 0, 0]
    }
}

/// `sinc(x) * sinc(x / a)` inside the window `|x| < a`, zero outside.
fn lanczos_kernel(x: f64, a: f64) -> f64 {
    let x = x.abs();
    if x >= a {
        return 0.0;
    }
    if x < 1e-12 {
        return 1.0;
    }
    let t = PI * x;
    a * t.sin() * (t / a).sin() / (t * t)
}
