//! Error types for bitmap handling and crop extraction.

use thiserror::Error;

/// Problems with a bitmap's pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitmapError {
    /// The bitmap carries no pixel data at all.
    #[error("Bitmap has no pixel data")]
    Empty,

    /// The buffer length does not match `width * height * 3`.
    #[error("RGB buffer holds {actual} bytes, {expected} expected")]
    BufferMismatch { expected: usize, actual: usize },

    /// The buffer could not be handed to the `image` crate.
    #[error("Failed to convert bitmap: {0}")]
    Conversion(String),
}

/// Reasons a crop extraction cannot produce an output bitmap.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// Neither the primary nor the alternate representation has pixels.
    #[error("Unsupported source bitmap: no pixel data available")]
    UnsupportedSource,

    /// The crop state describes an empty or non-finite region.
    #[error("Invalid crop geometry: {width}x{height}")]
    InvalidGeometry { width: f64, height: f64 },

    #[error(transparent)]
    Bitmap(#[from] BitmapError),
}
