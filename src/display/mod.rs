pub mod bitmap;
mod memory;
#[cfg(feature = "sdl")]
mod sdl;
mod surface;

pub use bitmap::Bitmap;
pub use memory::MemoryBackend;
#[cfg(feature = "sdl")]
pub use sdl::{SdlBackend, SdlDisplay};
pub use surface::FrameSurface;

use serde::{Deserialize, Serialize};

use crate::error::RasterResult;
use crate::pixel::Pixel;

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 768;

/// Row order of a backend's frame buffer in memory.
///
/// Drawing always uses a top-left origin with y growing downward; this only
/// decides which storage row a drawing row lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Row 0 is stored first
    #[default]
    TopDown,
    /// Row 0 is stored last (e.g. GL textures)
    BottomUp,
}

impl Orientation {
    /// Storage row holding drawing row `y` of a `height`-row buffer
    #[inline]
    pub fn storage_row(self, y: u32, height: u32) -> u32 {
        match self {
            Self::TopDown => y,
            Self::BottomUp => height - 1 - y,
        }
    }
}

/// A display that hands out one frame buffer at a time.
///
/// The cycle is acquire, draw, release, present. Calling these out of order
/// yields `RasterError::FrameState`.
pub trait PresentBackend {
    /// Frame buffer dimensions in pixels
    fn size(&self) -> (u32, u32);

    fn orientation(&self) -> Orientation;

    /// Begin a frame; the slice holds `width * height` pixels in storage order
    fn acquire_frame_buffer(&mut self) -> RasterResult<&mut [Pixel]>;

    /// End the frame opened by `acquire_frame_buffer`
    fn release_frame_buffer(&mut self) -> RasterResult<()>;

    /// Show the last released frame
    fn present(&mut self) -> RasterResult<()>;
}
