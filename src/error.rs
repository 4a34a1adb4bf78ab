//! Error taxonomy shared by every public operation.

use crate::store::ImageHandle;

/// Convenience result type used across the crate.
pub type RasterResult<T> = Result<T, RasterError>;

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// Handle was never issued by the store it was used with.
    #[error("invalid image handle {0}")]
    InvalidHandle(ImageHandle),

    /// Direct pixel addressing outside the target's dimensions.
    #[error("pixel ({x}, {y}) is outside a {width}x{height} surface")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Decode or encode failure reported by the image codec.
    #[error("image codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Frame acquire/release/present called out of order.
    #[error("frame state error: {0}")]
    FrameState(String),

    #[error("display backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    pub fn out_of_bounds(x: impl Into<i64>, y: impl Into<i64>, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x: x.into(),
            y: y.into(),
            width,
            height,
        }
    }

    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    pub fn frame_state(msg: impl Into<String>) -> Self {
        Self::FrameState(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(RasterError::InvalidHandle(ImageHandle::from_index(7))
            .to_string()
            .contains("invalid image handle 7"));
        assert!(RasterError::out_of_bounds(-1, 3, 4, 4)
            .to_string()
            .contains("(-1, 3)"));
        assert!(RasterError::codec("x").to_string().starts_with("image codec error:"));
        assert!(RasterError::frame_state("x").to_string().starts_with("frame state error:"));
        assert!(RasterError::config("x").to_string().starts_with("config error:"));
    }

    #[test]
    fn test_other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = RasterError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
