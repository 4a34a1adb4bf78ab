//! Append-only image registry with a per-image cache of resized copies.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::display::bitmap::Bitmap;
use crate::error::{RasterError, RasterResult};
use crate::resample::resample;

/// Opaque reference to an image registered with an [`ImageStore`].
///
/// Handles are issued in registration order and stay valid for the store's
/// lifetime; images are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageHandle(usize);

impl ImageHandle {
    /// Rebuild a handle from its registration index.
    /// Nothing checks that the index was ever issued; lookups do.
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Slot {
    base: Bitmap,
    scaled: HashMap<(u32, u32), Bitmap>,
}

/// Owns every registered image and its resized variants.
///
/// A resized copy is produced the first time a size is requested and the same
/// bitmap is handed back for every later request of that size. Cached copies
/// are never refreshed, so edits made to a base image after a size was first
/// requested do not reach that size.
#[derive(Default)]
pub struct ImageStore {
    slots: Vec<Slot>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered images
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Take ownership of `image` and return its handle
    pub fn add(&mut self, image: Bitmap) -> ImageHandle {
        let handle = ImageHandle(self.slots.len());
        debug!(%handle, width = image.width(), height = image.height(), "registered image");
        self.slots.push(Slot {
            base: image,
            scaled: HashMap::new(),
        });
        handle
    }

    fn slot(&self, handle: ImageHandle) -> RasterResult<&Slot> {
        self.slots
            .get(handle.index())
            .ok_or(RasterError::InvalidHandle(handle))
    }

    fn slot_mut(&mut self, handle: ImageHandle) -> RasterResult<&mut Slot> {
        self.slots
            .get_mut(handle.index())
            .ok_or(RasterError::InvalidHandle(handle))
    }

    /// The image as registered
    pub fn get(&self, handle: ImageHandle) -> RasterResult<&Bitmap> {
        Ok(&self.slot(handle)?.base)
    }

    pub fn dimensions(&self, handle: ImageHandle) -> RasterResult<(u32, u32)> {
        Ok(self.slot(handle)?.base.dimensions())
    }

    /// The image at `width` x `height`, resampling on first request.
    /// The registered size returns the base image itself.
    pub fn get_scaled(
        &mut self,
        handle: ImageHandle,
        width: u32,
        height: u32,
    ) -> RasterResult<&Bitmap> {
        let image = self.get_scaled_mut(handle, width, height)?;
        Ok(image)
    }

    /// Mutable form of [`get_scaled`](Self::get_scaled); edits are seen by
    /// every later request for the same size.
    ///
    /// At the registered size this is the base image itself. Edits made
    /// through it never reach sizes that are already cached; sizes first
    /// requested afterwards are resampled from the edited base.
    pub fn get_scaled_mut(
        &mut self,
        handle: ImageHandle,
        width: u32,
        height: u32,
    ) -> RasterResult<&mut Bitmap> {
        if width == 0 || height == 0 {
            return Err(RasterError::invalid_dimensions(format!(
                "cannot scale image {} to {}x{}",
                handle, width, height
            )));
        }
        let Slot { base, scaled } = self.slot_mut(handle)?;
        if base.dimensions() == (width, height) {
            return Ok(base);
        }
        let base = &*base;
        Ok(scaled.entry((width, height)).or_insert_with(|| {
            debug!(%handle, width, height, "scale cache miss, resampling");
            resample(base, width, height)
        }))
    }

    /// How many resized variants of `handle` are cached
    pub fn cached_sizes(&self, handle: ImageHandle) -> RasterResult<usize> {
        Ok(self.slot(handle)?.scaled.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;

    fn store_with_image() -> (ImageStore, ImageHandle) {
        let mut store = ImageStore::new();
        let h = store.add(Bitmap::filled(4, 4, Pixel::rgb(10, 20, 30)));
        (store, h)
    }

    #[test]
    fn test_handles_are_sequential() {
        let mut store = ImageStore::new();
        assert!(store.is_empty());
        let a = store.add(Bitmap::new(1, 1));
        let b = store.add(Bitmap::new(2, 2));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimensions(b).unwrap(), (2, 2));
    }

    #[test]
    fn test_unknown_handle_is_error() {
        let (mut store, _) = store_with_image();
        let bogus = ImageHandle::from_index(5);
        assert!(matches!(store.get(bogus), Err(RasterError::InvalidHandle(h)) if h == bogus));
        assert!(store.get_scaled(bogus, 2, 2).is_err());
        assert!(store.dimensions(bogus).is_err());
    }

    #[test]
    fn test_native_size_returns_base() {
        let (mut store, h) = store_with_image();
        let base_ptr = store.get(h).unwrap().as_pixels().as_ptr();
        let scaled_ptr = store.get_scaled(h, 4, 4).unwrap().as_pixels().as_ptr();
        assert_eq!(base_ptr, scaled_ptr);
        assert_eq!(store.cached_sizes(h).unwrap(), 0);
    }

    #[test]
    fn test_scaled_copy_is_cached_once() {
        let (mut store, h) = store_with_image();
        let first = store.get_scaled(h, 8, 2).unwrap().as_pixels().as_ptr();
        // more sizes force the map to grow in between
        for n in 1..20 {
            store.get_scaled(h, n, n + 1).unwrap();
        }
        let second = store.get_scaled(h, 8, 2).unwrap().as_pixels().as_ptr();
        assert_eq!(first, second);
        assert_eq!(store.cached_sizes(h).unwrap(), 20);
    }

    #[test]
    fn test_edits_to_cached_copy_persist() {
        let (mut store, h) = store_with_image();
        store
            .get_scaled_mut(h, 3, 3)
            .unwrap()
            .set_pixel(1, 1, Pixel::WHITE)
            .unwrap();
        let again = store.get_scaled(h, 3, 3).unwrap();
        assert_eq!(again.get(1, 1), Some(Pixel::WHITE));
        assert_eq!(again.get(0, 0), Some(Pixel::rgb(10, 20, 30)));
    }

    #[test]
    fn test_base_edits_skip_existing_cached_sizes() {
        let (mut store, h) = store_with_image();
        let before = store.get_scaled(h, 2, 2).unwrap().get(0, 0);

        store.get_scaled_mut(h, 4, 4).unwrap().clear(Pixel::WHITE);
        assert_eq!(store.get(h).unwrap().get(3, 3), Some(Pixel::WHITE));

        // already cached: still resampled from the old base
        assert_eq!(store.get_scaled(h, 2, 2).unwrap().get(0, 0), before);
        // first request after the edit sees it
        assert_eq!(store.get_scaled(h, 8, 8).unwrap().get(5, 5), Some(Pixel::WHITE));
    }

    #[test]
    fn test_zero_size_request_rejected() {
        let (mut store, h) = store_with_image();
        assert!(matches!(
            store.get_scaled(h, 0, 4),
            Err(RasterError::InvalidDimensions(_))
        ));
        assert_eq!(store.cached_sizes(h).unwrap(), 0);
    }

    #[test]
    fn test_caches_are_per_image() {
        let mut store = ImageStore::new();
        let a = store.add(Bitmap::filled(2, 2, Pixel::WHITE));
        let b = store.add(Bitmap::filled(2, 2, Pixel::BLACK));
        assert_eq!(store.get_scaled(a, 5, 5).unwrap().get(2, 2), Some(Pixel::WHITE));
        assert_eq!(store.get_scaled(b, 5, 5).unwrap().get(2, 2), Some(Pixel::BLACK));
        assert_eq!(store.cached_sizes(a).unwrap(), 1);
    }
}
