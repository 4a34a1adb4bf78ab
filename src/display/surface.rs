use crate::display::Orientation;
use crate::error::{RasterError, RasterResult};
use crate::pixel::Pixel;
use crate::raster::Surface;

/// The drawable view of a backend frame buffer for the duration of one frame.
///
/// Coordinates are top-left based regardless of the backend's row order.
pub struct FrameSurface<'a> {
    pixels: &'a mut [Pixel],
    width: u32,
    height: u32,
    orientation: Orientation,
}

impl<'a> FrameSurface<'a> {
    pub fn new(
        pixels: &'a mut [Pixel],
        width: u32,
        height: u32,
        orientation: Orientation,
    ) -> RasterResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RasterError::invalid_dimensions(format!(
                "{}x{} frame needs {} pixels, backend gave {}",
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
            orientation,
        })
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
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as i64) < self.width as i64 && y >= 0 && (y as i64) < self.height as i64
    }

    /// Storage index for in-bounds drawing coordinates
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        self.orientation.storage_row(y, self.height) as usize * self.width as usize + x as usize
    }

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

    pub fn get_pixel(&self, x: i32, y: i32) -> RasterResult<Pixel> {
        self.get(x, y)
            .ok_or_else(|| RasterError::out_of_bounds(x, y, self.width, self.height))
    }

    /// Replace a pixel without blending
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Pixel) -> RasterResult<()> {
        let (width, height) = (self.width, self.height);
        let p = self
            .pixel_mut(x, y)
            .ok_or_else(|| RasterError::out_of_bounds(x, y, width, height))?;
        *p = color;
        Ok(())
    }

    /// Composite over a pixel, reporting out-of-range addressing
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Pixel) -> RasterResult<()> {
        let (width, height) = (self.width, self.height);
        let p = self
            .pixel_mut(x, y)
            .ok_or_else(|| RasterError::out_of_bounds(x, y, width, height))?;
        *p += color;
        Ok(())
    }

    pub fn clear(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    /// Raw storage, in the backend's row order
    pub fn as_pixels(&self) -> &[Pixel] {
        self.pixels
    }
}

impl Surface for FrameSurface<'_> {
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
