//! Software 2D rasterization with premultiplied-alpha compositing.
//!
//! A [`Renderer`] pairs a [`PresentBackend`] with an [`ImageStore`]. Each
//! frame is drawn through a [`Frame`]: lines (solid, anti-aliased, wide),
//! filled rectangles, and images blitted at native size or resized through
//! the store's scale cache.

pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod input;
pub mod pixel;
pub mod raster;
pub mod renderer;
pub mod resample;
pub mod sketch;
pub mod store;
pub mod util;

pub use codec::SaveMode;
pub use config::RenderConfig;
pub use display::{Bitmap, FrameSurface, MemoryBackend, Orientation, PresentBackend};
#[cfg(feature = "sdl")]
pub use display::{SdlBackend, SdlDisplay};
pub use error::{RasterError, RasterResult};
pub use geometry::{BoundingBox, Point};
pub use input::{InputEvent, Key, MouseButtonKind, Overlay};
pub use pixel::{AlphaMode, Pixel};
pub use raster::Surface;
pub use renderer::{Frame, Renderer};
pub use store::{ImageHandle, ImageStore};
