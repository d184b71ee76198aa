//! RGB bitmaps and the provider seam used by extraction.

use image::DynamicImage;

use crate::error::BitmapError;
use crate::geometry::Size;
use crate::orientation::Orientation;

/// A bitmap with RGB pixel data and orientation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    /// Raw width in pixels (before orientation correction).
    pub width: u32,
    /// Raw height in pixels (before orientation correction).
    pub height: u32,
    /// Packed RGB8 rows, top row first, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
    /// How the raw pixels must be turned to appear upright.
    pub orientation: Orientation,
}

impl Bitmap {
    /// Create an upright bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "RGB buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
            orientation: Orientation::Normal,
        }
    }

    /// An opaque black bitmap.
    pub fn black(width: u32, height: u32) -> Self {
        Self::new(width, height, vec![0; width as usize * height as usize * 3])
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Create a Bitmap from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Copies the raw pixels into an `image` buffer.
    pub fn to_rgb_image(&self) -> Result<image::RgbImage, BitmapError> {
        self.validate()?;
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            BitmapError::Conversion(format!("{}x{} buffer rejected", self.width, self.height))
        })
    }

    /// Checks that the buffer holds pixels and matches the dimensions.
    pub fn validate(&self) -> Result<(), BitmapError> {
        if self.is_empty() {
            return Err(BitmapError::Empty);
        }
        let expected = self.width as usize * self.height as usize * 3;
        if self.pixels.len() != expected {
            return Err(BitmapError::BufferMismatch {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// True when there is nothing to crop.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Raw buffer dimensions.
    pub fn raw_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Dimensions once the orientation is applied. This is the crop engine's
    /// image size.
    pub fn oriented_size(&self) -> Size {
        self.orientation.oriented_size(self.raw_size())
    }

    /// Returns an upright copy whose orientation is `Normal`.
    pub fn normalized(&self) -> Result<Bitmap, BitmapError> {
        if self.orientation == Orientation::Normal {
            self.validate()?;
            return Ok(self.clone());
        }
        let rgb = self.to_rgb_image()?;
        let upright = self.orientation.apply(DynamicImage::ImageRgb8(rgb));
        Ok(Bitmap::from_rgb_image(upright.into_rgb8()))
    }

    /// Reads one pixel of the raw buffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }
}

/// Supplies the pixels a crop session extracts from.
///
/// Hosts whose images may be backed by something other than a pixel buffer
/// (a GPU texture, a lazily decoded file) expose that through `alternate`,
/// which is only consulted when `primary` has no pixel data.
pub trait BitmapProvider {
    /// The main pixel representation, if one is loaded.
    fn primary(&self) -> Option<&Bitmap>;

    /// A secondary representation rendered on demand.
    fn alternate(&self) -> Option<Bitmap> {
        None
    }

    /// Upright size of the image in pixels.
    fn image_size(&self) -> Size {
        self.primary()
            .map(Bitmap::oriented_size)
            .unwrap_or(Size::ZERO)
    }
}

impl BitmapProvider for Bitmap {
    fn primary(&self) -> Option<&Bitmap> {
        Some(self)
    }
}
