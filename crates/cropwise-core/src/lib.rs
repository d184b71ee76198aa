//! Cropwise Core - Interactive photo cropping engine
//!
//! This crate keeps the crop state of a photo in sync with an interactive
//! viewport (crop frame resizing, pan, pinch zoom, straightening) and extracts
//! the final cropped bitmap, including rotation and orientation handling.

pub mod aspect;
pub mod bitmap;
pub mod coords;
pub mod crop_info;
pub mod debounce;
pub mod error;
pub mod geometry;
pub mod options;
pub mod orientation;
pub mod resize;
pub mod rotation;
pub mod session;
pub mod transform;
pub mod viewport;

pub use aspect::{AspectRatio, CropAspectRatio};
pub use bitmap::{Bitmap, BitmapProvider};
pub use crop_info::CropInfo;
pub use error::{BitmapError, ExtractError};
pub use geometry::{EdgeInsets, Edges, Point, Rect, Size};
pub use options::CropOptions;
pub use orientation::Orientation;
pub use resize::{ResizeEngine, ResizeSession};
pub use rotation::RotationDial;
pub use session::{
    CropSession, ExtractionJob, GestureEvent, GestureSource, RenderSink, RenderSnapshot,
};
pub use transform::{create_cropped_image, extract, extract_from, InterpolationFilter};
pub use viewport::Viewport;
