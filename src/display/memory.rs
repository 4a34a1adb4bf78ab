use std::time::Duration;

use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::display::{Bitmap, Orientation, PresentBackend};
use crate::error::{RasterError, RasterResult};
use crate::pixel::Pixel;
use crate::util::{FrameTimer, DEFAULT_SAMPLE_COUNT};

/// Headless backend: frames live in an owned buffer and "presenting" just
/// counts. Used for tests and offscreen rendering.
pub struct MemoryBackend {
    buffer: Bitmap,
    orientation: Orientation,
    in_frame: bool,
    frames_presented: u64,
    timer: FrameTimer,
}

impl MemoryBackend {
    /// Top-down buffer cleared to transparent
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_orientation(width, height, Orientation::TopDown)
    }

    pub fn with_orientation(width: u32, height: u32, orientation: Orientation) -> Self {
        let timer = FrameTimer::new(DEFAULT_SAMPLE_COUNT, Duration::from_secs(1));
        Self::with_timer(width, height, orientation, timer)
    }

    /// Size, row order and report interval taken from `config`
    pub fn from_config(config: &RenderConfig) -> RasterResult<Self> {
        config.validate()?;
        let timer = FrameTimer::new(DEFAULT_SAMPLE_COUNT, config.fps_report_interval());
        Ok(Self::with_timer(config.width, config.height, config.orientation, timer))
    }

    pub fn with_timer(
        width: u32,
        height: u32,
        orientation: Orientation,
        timer: FrameTimer,
    ) -> Self {
        debug!(
            width,
            height,
            ?orientation,
            report_ms = timer.report_interval().as_millis() as u64,
            "created memory backend"
        );
        Self {
            buffer: Bitmap::new(width, height),
            orientation,
            in_frame: false,
            frames_presented: 0,
            timer,
        }
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Raw buffer contents in storage order
    pub fn storage(&self) -> &[Pixel] {
        self.buffer.as_pixels()
    }

    /// Copy of the current buffer with row 0 at the top, whatever the
    /// storage order
    pub fn snapshot(&self) -> RasterResult<Bitmap> {
        let (width, height) = self.buffer.dimensions();
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            pixels.extend_from_slice(self.buffer.row(self.orientation.storage_row(y, height)));
        }
        Bitmap::from_pixels(width, height, pixels)
    }
}

impl PresentBackend for MemoryBackend {
    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn acquire_frame_buffer(&mut self) -> RasterResult<&mut [Pixel]> {
        if self.in_frame {
            return Err(RasterError::frame_state("frame buffer already acquired"));
        }
        self.in_frame = true;
        Ok(self.buffer.as_pixels_mut())
    }

    fn release_frame_buffer(&mut self) -> RasterResult<()> {
        if !self.in_frame {
            return Err(RasterError::frame_state("release without a matching acquire"));
        }
        self.in_frame = false;
        Ok(())
    }

    fn present(&mut self) -> RasterResult<()> {
        if self.in_frame {
            return Err(RasterError::frame_state("present while a frame is still open"));
        }
        self.frames_presented += 1;
        self.timer.tick();
        if let Some(fps) = self.timer.report() {
            let (slowest, fastest) = self.timer.fps_range().unwrap_or_default();
            info!(
                frames = self.frames_presented,
                "memory backend at {:.1} fps (range {:.1}..{:.1})",
                fps,
                slowest,
                fastest
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_cycle() {
        let mut backend = MemoryBackend::new(2, 2);
        let buf = backend.acquire_frame_buffer().unwrap();
        assert_eq!(buf.len(), 4);
        buf[1] = Pixel::WHITE;
        backend.release_frame_buffer().unwrap();
        backend.present().unwrap();
        assert_eq!(backend.frames_presented(), 1);
        assert_eq!(backend.storage()[1], Pixel::WHITE);
    }

    #[test]
    fn test_out_of_order_calls_are_errors() {
        let mut backend = MemoryBackend::new(2, 2);
        assert!(matches!(backend.release_frame_buffer(), Err(RasterError::FrameState(_))));
        backend.acquire_frame_buffer().unwrap();
        assert!(matches!(backend.acquire_frame_buffer(), Err(RasterError::FrameState(_))));
        assert!(matches!(backend.present(), Err(RasterError::FrameState(_))));
        backend.release_frame_buffer().unwrap();
        backend.present().unwrap();
    }

    #[test]
    fn test_from_config_uses_size_orientation_and_interval() {
        let config = RenderConfig {
            width: 32,
            height: 16,
            orientation: Orientation::BottomUp,
            fps_report_interval_ms: 250,
            ..RenderConfig::default()
        };
        let mut backend = MemoryBackend::from_config(&config).unwrap();
        assert_eq!(backend.size(), (32, 16));
        assert_eq!(backend.orientation(), Orientation::BottomUp);
        assert_eq!(backend.timer().report_interval(), Duration::from_millis(250));

        backend.acquire_frame_buffer().unwrap();
        backend.release_frame_buffer().unwrap();
        backend.present().unwrap();
        assert_eq!(backend.timer().frame_count(), 1);

        let zero = RenderConfig {
            width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(MemoryBackend::from_config(&zero), Err(RasterError::Config(_))));
    }

    #[test]
    fn test_snapshot_flips_bottom_up() {
        let mut backend = MemoryBackend::with_orientation(1, 3, Orientation::BottomUp);
        let buf = backend.acquire_frame_buffer().unwrap();
        buf[2] = Pixel::WHITE; // last storage row = drawing row 0
        backend.release_frame_buffer().unwrap();
        let shot = backend.snapshot().unwrap();
        assert_eq!(shot.get(0, 0), Some(Pixel::WHITE));
        assert_eq!(shot.get(0, 2), Some(Pixel::TRANSPARENT));
    }
}
