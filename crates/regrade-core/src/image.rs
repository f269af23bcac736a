//! Image representation for the grading pipeline.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// One 8-bit RGBA pixel.
///
/// Channel values are always in `[0, 255]`; every transform funnels its
/// floating-point result through [`Pixel::from_channels`] before writing.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Round unscaled 0–255 channel values to the nearest integer and clamp.
    ///
    /// This is the single point where floating-point colour becomes a pixel.
    /// NaN maps to 0.
    pub fn from_channels(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: quantize(r),
            g: quantize(g),
            b: quantize(b),
            a: quantize(a),
        }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Pixel {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[inline]
fn quantize(v: f32) -> u8 {
    // `as` saturates and maps NaN to 0.
    v.round().clamp(0.0, 255.0) as u8
}

/// Row-major RGBA8 image, origin top-left.
///
/// Immutable once built; loading a new image replaces the buffer wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl ImageBuffer {
    /// Wrap a pixel vector, checking that it holds exactly `width × height` pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(CoreError::DimensionMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from tightly packed RGBA8 bytes, as produced by most decoders.
    pub fn from_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self, CoreError> {
        if bytes.len() % 4 != 0 {
            return Err(CoreError::ByteLength { len: bytes.len() });
        }
        let pixels: Vec<Pixel> = bytes
            .chunks_exact(4)
            .map(|c| Pixel::from([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// An image where every pixel is `fill`.
    pub fn filled(width: u32, height: u32, fill: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Zero-sized buffer. Stands in for "no image loaded yet".
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when either dimension is zero. Such a buffer is never processed.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Pixel at column `x`, row `y`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Zero-copy RGBA8 view of the pixel data.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Consume the buffer into tightly packed RGBA8 bytes.
    pub fn into_rgba8(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Default for ImageBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_channels_rounds_and_clamps() {
        let px = Pixel::from_channels(-12.0, 127.5, 254.6, 300.0);
        assert_eq!(px, Pixel::new(0, 128, 255, 255));
    }

    #[test]
    fn test_from_channels_nan_is_zero() {
        let px = Pixel::from_channels(f32::NAN, 10.2, 0.0, 255.0);
        assert_eq!(px.r, 0);
        assert_eq!(px.g, 10);
    }

    #[test]
    fn test_new_rejects_wrong_pixel_count() {
        let err = ImageBuffer::new(2, 2, vec![Pixel::BLACK; 3]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DimensionMismatch { width: 2, height: 2, len: 3 }
        ));
    }

    #[test]
    fn test_rgba8_bytes_round_trip() {
        let bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let image = ImageBuffer::from_rgba8(2, 1, bytes.clone()).unwrap();
        assert_eq!(image.pixel(1, 0), Some(Pixel::new(5, 6, 7, 8)));
        assert_eq!(image.as_bytes(), bytes.as_slice());
        assert_eq!(image.into_rgba8(), bytes);
    }

    #[test]
    fn test_rgba8_rejects_partial_pixel() {
        let err = ImageBuffer::from_rgba8(1, 1, vec![0; 5]).unwrap_err();
        assert!(matches!(err, CoreError::ByteLength { len: 5 }));
    }

    #[test]
    fn test_pixel_lookup_is_row_major() {
        let pixels = (0..6).map(|i| Pixel::new(i, 0, 0, 255)).collect();
        let image = ImageBuffer::new(3, 2, pixels).unwrap();
        assert_eq!(image.pixel(0, 1).map(|p| p.r), Some(3));
        assert_eq!(image.pixel(2, 1).map(|p| p.r), Some(5));
        assert_eq!(image.pixel(3, 0), None);
    }

    #[test]
    fn test_zero_sized_is_empty() {
        assert!(ImageBuffer::empty().is_empty());
        assert!(ImageBuffer::filled(0, 10, Pixel::BLACK).is_empty());
        assert!(!ImageBuffer::filled(1, 1, Pixel::BLACK).is_empty());
    }
}
