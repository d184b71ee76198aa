//! Pixel operations behind the final crop: rotation, cropping, extraction.
//!
//! # Transform Order
//!
//! When extracting a crop, operations are applied in this order:
//! 1. Orientation normalization
//! 2. Rotation about the crop center
//! 3. Crop
//!
//! # Coordinate System
//!
//! - Rotation angles are in radians, positive = clockwise on screen
//! - Crop coordinates are in upright image pixels
//! - Origin is top-left corner

mod crop;
mod extract;
mod rotation;

pub use crop::crop_pixels;
pub use extract::{create_cropped_image, extract, extract_from};
pub use rotation::{rotate_bitmap, InterpolationFilter};
