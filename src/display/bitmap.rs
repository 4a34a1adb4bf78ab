use std::fmt;

use crate::error::{RasterError, RasterResult};
use crate::pixel::{AlphaMode, Pixel};
use crate::raster::Surface;

// ============================================================================
// Bitmap
// ============================================================================

/// Owned, row-major grid of premultiplied pixels.
/// (0, 0) is the top-left pixel in storage order.
///
/// Deliberately not `Clone`: every bitmap has exactly one owner, either an
/// `ImageStore` slot or a temporary.
pub struct Bitmap {
    pixels: Vec<Pixel>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Create a fully transparent bitmap
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Pixel::TRANSPARENT)
    }

    /// Create a bitmap with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Pixel) -> Self {
        Self {
            pixels: vec![color; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap an existing pixel vector (length must be width * height)
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> RasterResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RasterError::invalid_dimensions(format!(
                "{}x{} bitmap needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Build from interleaved RGBA8 bytes, as handed over by the image codec
    pub fn from_rgba8(
        width: u32,
        height: u32,
        bytes: &[u8],
        mode: AlphaMode,
    ) -> RasterResult<Self> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(RasterError::invalid_dimensions(format!(
                "{}x{} RGBA8 buffer needs {} bytes, got {}",
                width,
                height,
                expected,
                bytes.len()
            )));
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Pixel::from_rgba([c[0], c[1], c[2], c[3]], mode))
            .collect();
        Self::from_pixels(width, height, pixels)
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
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as i64) < self.width as i64 && y >= 0 && (y as i64) < self.height as i64
    }

    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Read a pixel, None if out of bounds
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Pixel> {
        if self.in_bounds(x, y) {
            Some(self.pixels[self.pixel_index(x as u32, y as u32)])
        } else {
            None
        }
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut Pixel> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(&mut self.pixels[idx])
        } else {
            None
        }
    }

    /// Read a pixel, reporting out-of-range addressing as an error
    pub fn get_pixel(&self, x: u32, y: u32) -> RasterResult<Pixel> {
        if x < self.width && y < self.height {
            Ok(self.pixels[self.pixel_index(x, y)])
        } else {
            Err(RasterError::out_of_bounds(x, y, self.width, self.height))
        }
    }

    /// Replace a pixel (no blending), reporting out-of-range addressing as an error
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Pixel) -> RasterResult<()> {
        if x < self.width && y < self.height {
            let idx = self.pixel_index(x, y);
            self.pixels[idx] = color;
            Ok(())
        } else {
            Err(RasterError::out_of_bounds(x, y, self.width, self.height))
        }
    }

    /// Fill with a single colour
    pub fn clear(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    /// One row of pixels; panics if `y` is out of range
    #[inline]
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.pixel_index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    pub fn as_pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn as_pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Interleaved RGBA8 bytes, either as stored or converted back to straight alpha
    pub fn to_rgba8(&self, mode: AlphaMode) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for p in &self.pixels {
            let channels = match mode {
                AlphaMode::Straight => p.to_straight_array(),
                AlphaMode::Premultiplied => p.to_premultiplied_array(),
            };
            out.extend_from_slice(&channels);
        }
        out
    }
}

impl Surface for Bitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn composite(&mut self, x: i32, y: i32, color: Pixel) {
        if let Some(p) = self.pixel_mut(x, y) {
            *p += color;
        }
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let bmp = Bitmap::new(3, 2);
        assert_eq!(bmp.dimensions(), (3, 2));
        assert!(bmp.as_pixels().iter().all(|p| *p == Pixel::TRANSPARENT));
    }

    #[test]
    fn test_zero_sized_bitmap() {
        let bmp = Bitmap::new(0, 5);
        assert!(bmp.is_empty());
        assert_eq!(bmp.get(0, 0), None);
        assert!(bmp.get_pixel(0, 0).is_err());
    }

    #[test]
    fn test_set_get_row_major() {
        let mut bmp = Bitmap::new(4, 3);
        let c = Pixel::rgb(1, 2, 3);
        bmp.set_pixel(2, 1, c).unwrap();
        assert_eq!(bmp.get_pixel(2, 1).unwrap(), c);
        assert_eq!(bmp.as_pixels()[4 + 2], c);
        assert_eq!(bmp.row(1)[2], c);
    }

    #[test]
    fn test_out_of_range_is_error_not_corruption() {
        let mut bmp = Bitmap::new(2, 2);
        let err = bmp.set_pixel(2, 0, Pixel::WHITE).unwrap_err();
        assert!(matches!(err, RasterError::OutOfBounds { x: 2, y: 0, .. }));
        assert!(bmp.get_pixel(0, 9).is_err());
        assert_eq!(bmp.get(-1, 0), None);
        assert!(bmp.as_pixels().iter().all(|p| *p == Pixel::TRANSPARENT));
    }

    #[test]
    fn test_composite_out_of_bounds_is_noop() {
        let mut bmp = Bitmap::filled(2, 2, Pixel::BLACK);
        bmp.composite(-1, 0, Pixel::WHITE);
        bmp.composite(0, 2, Pixel::WHITE);
        bmp.composite(i32::MAX, i32::MIN, Pixel::WHITE);
        assert!(bmp.as_pixels().iter().all(|p| *p == Pixel::BLACK));
        bmp.composite(1, 1, Pixel::WHITE);
        assert_eq!(bmp.get(1, 1), Some(Pixel::WHITE));
    }

    #[test]
    fn test_from_rgba8_premultiplies_straight_input() {
        let bmp = Bitmap::from_rgba8(1, 1, &[200, 100, 0, 128], AlphaMode::Straight).unwrap();
        assert_eq!(bmp.get(0, 0), Some(Pixel::from_straight(200, 100, 0, 128)));
        assert!(Bitmap::from_rgba8(2, 1, &[0; 4], AlphaMode::Straight).is_err());
    }

    #[test]
    fn test_to_rgba8_modes() {
        let bmp = Bitmap::filled(1, 1, Pixel::from_straight(255, 0, 0, 128));
        assert_eq!(bmp.to_rgba8(AlphaMode::Premultiplied), vec![128, 0, 0, 128]);
        assert_eq!(bmp.to_rgba8(AlphaMode::Straight), vec![255, 0, 0, 128]);
    }

    #[test]
    fn test_clear() {
        let mut bmp = Bitmap::new(3, 3);
        bmp.clear(Pixel::WHITE);
        assert!(bmp.as_pixels().iter().all(|p| *p == Pixel::WHITE));
    }
}
