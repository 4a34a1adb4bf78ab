//! The drawing facade: a presentation backend plus the images it can draw.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codec::{self, SaveMode};
use crate::display::{Bitmap, FrameSurface, PresentBackend};
use crate::error::{RasterError, RasterResult};
use crate::pixel::Pixel;
use crate::raster;
use crate::store::{ImageHandle, ImageStore};

/// Owns a backend and an [`ImageStore`].
///
/// Drawing happens inside [`Renderer::frame`], which acquires the backend's
/// buffer, hands the closure a [`Frame`], and releases the buffer afterwards.
pub struct Renderer<B: PresentBackend> {
    backend: B,
    images: ImageStore,
}

impl<B: PresentBackend> Renderer<B> {
    pub fn new(backend: B) -> Self {
        let (width, height) = backend.size();
        info!(width, height, orientation = ?backend.orientation(), "renderer ready");
        Self {
            backend,
            images: ImageStore::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.backend.size().0
    }

    pub fn height(&self) -> u32 {
        self.backend.size().1
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Run `draw` against this frame's surface.
    ///
    /// The buffer is released even when the surface could not be built, so a
    /// failed frame never leaves the backend stuck mid-frame.
    pub fn frame<R>(&mut self, draw: impl FnOnce(&mut Frame<'_>) -> R) -> RasterResult<R> {
        let (width, height) = self.backend.size();
        let orientation = self.backend.orientation();
        let pixels = self.backend.acquire_frame_buffer()?;

        let result = FrameSurface::new(pixels, width, height, orientation).map(|surface| {
            let mut frame = Frame {
                surface,
                images: &mut self.images,
            };
            draw(&mut frame)
        });

        self.backend.release_frame_buffer()?;
        result
    }

    /// Show the last completed frame
    pub fn present(&mut self) -> RasterResult<()> {
        self.backend.present()
    }

    /// Decode an image file and register it.
    /// A missing or undecodable file is an error, never a placeholder.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> RasterResult<ImageHandle> {
        let bitmap = codec::read_image(path)?;
        Ok(self.images.add(bitmap))
    }

    pub fn add_image(&mut self, image: Bitmap) -> ImageHandle {
        self.images.add(image)
    }

    pub fn image(&self, handle: ImageHandle) -> RasterResult<&Bitmap> {
        self.images.get(handle)
    }

    /// The image at a given size, from the scale cache
    pub fn image_scaled(
        &mut self,
        handle: ImageHandle,
        width: u32,
        height: u32,
    ) -> RasterResult<&Bitmap> {
        self.images.get_scaled(handle, width, height)
    }

    pub fn image_dimensions(&self, handle: ImageHandle) -> RasterResult<(u32, u32)> {
        self.images.dimensions(handle)
    }

    pub fn image_pixel(&self, x: u32, y: u32, handle: ImageHandle) -> RasterResult<Pixel> {
        self.images.get(handle)?.get_pixel(x, y)
    }

    /// Write a registered image as PNG; returns the path actually written
    pub fn save_image(
        &self,
        handle: ImageHandle,
        path: impl AsRef<Path>,
        mode: SaveMode,
    ) -> RasterResult<PathBuf> {
        let image = self.images.get(handle)?;
        debug!(%handle, ?mode, "saving image");
        codec::write_image(image, path, mode)
    }
}

// ============================================================================
// Frame
// ============================================================================

/// Drawing API for one frame. Coordinates have a top-left origin with y
/// growing downward.
///
/// Shape and image drawing silently skips pixels outside the frame. The
/// single-pixel calls treat out-of-range coordinates as an error instead.
pub struct Frame<'a> {
    surface: FrameSurface<'a>,
    images: &'a mut ImageStore,
}

impl<'a> Frame<'a> {
    #[inline]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &FrameSurface<'a> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut FrameSurface<'a> {
        &mut self.surface
    }

    /// Composite one pixel
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Pixel) -> RasterResult<()> {
        self.surface.draw_pixel(x, y, color)
    }

    /// Overwrite one pixel without blending
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Pixel) -> RasterResult<()> {
        self.surface.set_pixel(x, y, color)
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> RasterResult<Pixel> {
        self.surface.get_pixel(x, y)
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel) {
        raster::draw_line(&mut self.surface, x0, y0, x1, y1, color);
    }

    pub fn draw_line_aa(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel) {
        raster::draw_line_aa(&mut self.surface, x0, y0, x1, y1, color);
    }

    pub fn draw_line_aa_width(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        width: f32,
        color: Pixel,
    ) {
        raster::draw_line_aa_width(&mut self.surface, x0, y0, x1, y1, width, color);
    }

    /// Filled rectangle with inclusive corners; needs `y0 <= y1`
    pub fn draw_rectangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel) {
        raster::fill_rect(&mut self.surface, x0, y0, x1, y1, color);
    }

    /// Overwrite every pixel (no blending)
    pub fn clear(&mut self, color: Pixel) {
        self.surface.clear(color);
    }

    /// Clear to opaque black
    pub fn clear_black(&mut self) {
        self.clear(Pixel::BLACK);
    }

    /// Composite an image at its native size with its top-left at (x, y)
    pub fn draw_image(&mut self, x: i32, y: i32, handle: ImageHandle) -> RasterResult<()> {
        let image = self.images.get(handle)?;
        raster::blit(&mut self.surface, x, y, image);
        Ok(())
    }

    /// Composite an image stretched over the inclusive rectangle
    /// (x0, y0)..=(x1, y1). An empty or inverted rectangle draws nothing.
    pub fn draw_image_scaled(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        handle: ImageHandle,
    ) -> RasterResult<()> {
        self.images.dimensions(handle)?;
        let width = x1 as i64 - x0 as i64 + 1;
        let height = y1 as i64 - y0 as i64 + 1;
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        let too_large = |axis: &str, size: i64| {
            RasterError::invalid_dimensions(format!("scaled {} {} too large", axis, size))
        };
        let width = u32::try_from(width).map_err(|_| too_large("width", width))?;
        let height = u32::try_from(height).map_err(|_| too_large("height", height))?;

        let image = self.images.get_scaled(handle, width, height)?;
        raster::blit(&mut self.surface, x0, y0, image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{MemoryBackend, Orientation};

    fn renderer(width: u32, height: u32) -> Renderer<MemoryBackend> {
        Renderer::new(MemoryBackend::new(width, height))
    }

    #[test]
    fn test_frame_releases_buffer() {
        let mut r = renderer(4, 4);
        r.frame(|f| f.clear_black()).unwrap();
        r.present().unwrap();
        r.frame(|f| f.clear(Pixel::WHITE)).unwrap();
        r.present().unwrap();
        assert_eq!(r.backend().frames_presented(), 2);
        assert!(r.backend().storage().iter().all(|p| *p == Pixel::WHITE));
    }

    #[test]
    fn test_frame_returns_closure_value() {
        let mut r = renderer(3, 2);
        let dims = r.frame(|f| (f.width(), f.height())).unwrap();
        assert_eq!(dims, (3, 2));
    }

    #[test]
    fn test_rectangle_through_frame() {
        let mut r = renderer(10, 10);
        let red = Pixel::rgb(255, 0, 0);
        r.frame(|f| f.draw_rectangle(2, 2, 6, 6, red)).unwrap();
        let shot = r.backend().snapshot().unwrap();
        assert_eq!(shot.as_pixels().iter().filter(|p| **p == red).count(), 25);
    }

    #[test]
    fn test_pixel_calls_report_out_of_range() {
        let mut r = renderer(2, 2);
        r.frame(|f| {
            assert!(f.draw_pixel(2, 2, Pixel::WHITE).is_err());
            assert!(f.set_pixel(-1, 0, Pixel::WHITE).is_err());
            assert!(f.get_pixel(0, 5).is_err());
            f.set_pixel(1, 1, Pixel::WHITE).unwrap();
            assert_eq!(f.get_pixel(1, 1).unwrap(), Pixel::WHITE);
        })
        .unwrap();
    }

    #[test]
    fn test_bottom_up_backend_draws_top_left_origin() {
        let backend = MemoryBackend::with_orientation(3, 3, Orientation::BottomUp);
        let mut r = Renderer::new(backend);
        r.frame(|f| f.draw_line(0, 0, 2, 0, Pixel::WHITE)).unwrap();
        // storage keeps the row last, the snapshot shows it first
        assert!(r.backend().storage()[6..9].iter().all(|p| *p == Pixel::WHITE));
        let shot = r.backend().snapshot().unwrap();
        assert_eq!(shot.row(0), &[Pixel::WHITE; 3]);
    }

    #[test]
    fn test_draw_image_and_invalid_handle() {
        let mut r = renderer(4, 4);
        let h = r.add_image(Bitmap::filled(2, 2, Pixel::WHITE));
        r.frame(|f| f.draw_image(3, 3, h)).unwrap().unwrap();
        let shot = r.backend().snapshot().unwrap();
        assert_eq!(shot.get(3, 3), Some(Pixel::WHITE));
        assert_eq!(shot.as_pixels().iter().filter(|p| **p == Pixel::WHITE).count(), 1);

        let bogus = ImageHandle::from_index(9);
        let err = r.frame(|f| f.draw_image(0, 0, bogus)).unwrap().unwrap_err();
        assert!(matches!(err, RasterError::InvalidHandle(_)));
        assert!(r.image_dimensions(bogus).is_err());
    }

    #[test]
    fn test_draw_image_scaled_uses_inclusive_corners() {
        let mut r = renderer(8, 8);
        let h = r.add_image(Bitmap::filled(2, 2, Pixel::WHITE));
        r.frame(|f| f.draw_image_scaled(1, 1, 4, 3, h)).unwrap().unwrap();
        let shot = r.backend().snapshot().unwrap();
        assert_eq!(shot.as_pixels().iter().filter(|p| **p == Pixel::WHITE).count(), 4 * 3);
        assert_eq!(r.images().cached_sizes(h).unwrap(), 1);
        assert_eq!(r.image_scaled(h, 4, 3).unwrap().dimensions(), (4, 3));
    }

    #[test]
    fn test_draw_image_scaled_empty_rect_is_noop() {
        let mut r = renderer(4, 4);
        let h = r.add_image(Bitmap::filled(2, 2, Pixel::WHITE));
        r.frame(|f| {
            f.draw_image_scaled(3, 0, 1, 2, h).unwrap();
            f.draw_image_scaled(0, 3, 2, 2, h).unwrap();
        })
        .unwrap();
        assert!(r.backend().storage().iter().all(|p| *p == Pixel::TRANSPARENT));
        assert_eq!(r.images().cached_sizes(h).unwrap(), 0);
    }

    #[test]
    fn test_image_pixel() {
        let mut r = renderer(1, 1);
        let mut bmp = Bitmap::new(2, 2);
        bmp.set_pixel(1, 0, Pixel::rgb(1, 2, 3)).unwrap();
        let h = r.add_image(bmp);
        assert_eq!(r.image_pixel(1, 0, h).unwrap(), Pixel::rgb(1, 2, 3));
        assert!(r.image_pixel(2, 0, h).is_err());
        assert_eq!(r.image(h).unwrap().dimensions(), (2, 2));
    }
}
