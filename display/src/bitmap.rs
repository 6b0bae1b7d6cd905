//! Monochrome frame buffer as the panel wants it.
//!
//! One bit per pixel, rows padded to a whole byte, MSB is the leftmost pixel, a set bit is
//! white.  This is the layout of the usual e-paper controllers.
//!

use image::{GrayImage, Luma};

/// Luma values under this are ink
const THRESHOLD: u8 = 128;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Bytes per row
    ///
    #[inline]
    pub fn stride(width: u32) -> usize {
        (width as usize + 7) / 8
    }

    /// A buffer with every byte set to `fill`.
    ///
    pub fn filled(width: u32, height: u32, fill: u8) -> Self {
        Self {
            width,
            height,
            data: vec![fill; Self::stride(width) * height as usize],
        }
    }

    /// Threshold a grayscale image into a bitmap.
    ///
    pub fn from_luma(img: &GrayImage) -> Self {
        let (width, height) = img.dimensions();
        let stride = Self::stride(width);
        let mut data = vec![0u8; stride * height as usize];

        for (x, y, Luma([v])) in img.enumerate_pixels() {
            if *v >= THRESHOLD {
                data[y as usize * stride + x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Expand back into an 8-bit image, black or white.
    ///
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.is_white(x, y) { 255 } else { 0 }])
        })
    }

    #[inline]
    pub fn is_white(&self, x: u32, y: u32) -> bool {
        let stride = Self::stride(self.width);
        self.data[y as usize * stride + x as usize / 8] & (0x80 >> (x % 8)) != 0
    }

    /// Number of ink pixels
    ///
    pub fn black_pixels(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| !self.is_white(x, y))
            .count()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
