//! Premultiplied RGBA8 pixel and the source-over compositing operator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

// ============================================================================
// Channel Math
// ============================================================================

/// Scale a straight channel by alpha/255, rounding to nearest
#[inline]
fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 127) / 255) as u8
}

/// Inverse of `premultiply`, saturating at 255 for out-of-domain input
#[inline]
fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = a as u32;
    ((c as u32 * 255 + a / 2) / a).min(255) as u8
}

/// Interpretation of the colour channels handed to a constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    /// R, G, B are unscaled and get multiplied by A/255
    Straight,
    /// R, G, B are already scaled by A/255 and are stored verbatim
    Premultiplied,
}

// ============================================================================
// Pixel
// ============================================================================

/// An 8-bit-per-channel RGBA value, always stored premultiplied.
///
/// R, G and B are intended to stay at or below A. The type does not enforce
/// that, so compositing clamps instead of wrapping when inputs break it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct Pixel {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Self = Self::premultiplied(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Build from straight (non-premultiplied) channels
    #[inline]
    pub fn from_straight(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: premultiply(r, a),
            g: premultiply(g, a),
            b: premultiply(b, a),
            a,
        }
    }

    /// Build from channels that already satisfy the premultiplied invariant
    #[inline]
    pub const fn premultiplied(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque colour
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build from a 4-channel array, premultiplying unless told otherwise
    #[inline]
    pub fn from_rgba(channels: [u8; 4], mode: AlphaMode) -> Self {
        let [r, g, b, a] = channels;
        match mode {
            AlphaMode::Straight => Self::from_straight(r, g, b, a),
            AlphaMode::Premultiplied => Self::premultiplied(r, g, b, a),
        }
    }

    #[inline]
    pub fn r(&self) -> u8 {
        self.r
    }

    #[inline]
    pub fn g(&self) -> u8 {
        self.g
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.b
    }

    #[inline]
    pub fn a(&self) -> u8 {
        self.a
    }

    #[inline]
    pub fn r_mut(&mut self) -> &mut u8 {
        &mut self.r
    }

    #[inline]
    pub fn g_mut(&mut self) -> &mut u8 {
        &mut self.g
    }

    #[inline]
    pub fn b_mut(&mut self) -> &mut u8 {
        &mut self.b
    }

    #[inline]
    pub fn a_mut(&mut self) -> &mut u8 {
        &mut self.a
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Stored channels in R, G, B, A order
    #[inline]
    pub fn to_premultiplied_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channels divided back out by alpha (zero alpha yields all zeros)
    #[inline]
    pub fn to_straight_array(self) -> [u8; 4] {
        [
            unpremultiply(self.r, self.a),
            unpremultiply(self.g, self.a),
            unpremultiply(self.b, self.a),
            self.a,
        ]
    }

    /// Scale every channel (alpha included) by a coverage fraction in [0, 1].
    /// Used by the anti-aliased rasterizers to fade a stroke colour.
    #[inline]
    pub fn scaled(self, coverage: f32) -> Self {
        let coverage = if coverage.is_nan() {
            0.0
        } else {
            coverage.clamp(0.0, 1.0)
        };
        let scale = |c: u8| (c as f32 * coverage).round() as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: scale(self.a),
        }
    }
}

/// Source-over compositing in premultiplied space: `src` drawn on top of `dst`.
///
/// An opaque source replaces the destination outright. Otherwise every
/// channel, alpha included, becomes `src + round(dst * (255 - src.a) / 255)`,
/// clamped to 255.
#[inline]
pub fn over(dst: Pixel, src: Pixel) -> Pixel {
    if src.a == 255 {
        return src;
    }
    let inv = 255 - src.a as u16;
    let blend = |s: u8, d: u8| -> u8 {
        let kept = (d as u16 * inv + 127) / 255;
        (s as u16 + kept).min(255) as u8
    };
    Pixel {
        r: blend(src.r, dst.r),
        g: blend(src.g, dst.g),
        b: blend(src.b, dst.b),
        a: blend(src.a, dst.a),
    }
}

impl AddAssign for Pixel {
    /// `dst += src` composites `src` over `dst`
    #[inline]
    fn add_assign(&mut self, src: Self) {
        *self = over(*self, src);
    }
}

impl From<[u8; 3]> for Pixel {
    fn from(c: [u8; 3]) -> Self {
        Self::rgb(c[0], c[1], c[2])
    }
}

impl From<[u8; 4]> for Pixel {
    /// Straight-alpha input, like the codec produces
    fn from(c: [u8; 4]) -> Self {
        Self::from_rgba(c, AlphaMode::Straight)
    }
}

impl From<Pixel> for [u8; 4] {
    fn from(p: Pixel) -> Self {
        p.to_premultiplied_array()
    }
}

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ R: {}, G: {}, B: {}, A: {} ]",
            self.r, self.g, self.b, self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_straight_rounds_to_nearest() {
        let p = Pixel::from_straight(100, 50, 200, 128);
        assert_eq!(
            p.to_premultiplied_array(),
            [
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128
            ]
        );
        assert_eq!(Pixel::from_straight(255, 255, 255, 255), Pixel::WHITE);
        assert_eq!(Pixel::from_straight(200, 10, 99, 0), Pixel::TRANSPARENT);
    }

    #[test]
    fn test_premultiplied_is_verbatim() {
        let p = Pixel::from_rgba([10, 20, 30, 40], AlphaMode::Premultiplied);
        assert_eq!(p.to_premultiplied_array(), [10, 20, 30, 40]);
        let q = Pixel::from_rgba([10, 20, 30, 40], AlphaMode::Straight);
        assert_ne!(p, q);
    }

    #[test]
    fn test_three_channel_is_opaque() {
        let p = Pixel::from([1, 2, 3]);
        assert_eq!(p.to_premultiplied_array(), [1, 2, 3, 255]);
    }

    #[test]
    fn test_over_transparent_is_identity() {
        let dsts = [
            Pixel::from_straight(12, 200, 77, 190),
            Pixel::WHITE,
            Pixel::TRANSPARENT,
            Pixel::premultiplied(40, 40, 40, 40),
        ];
        for dst in dsts {
            assert_eq!(over(dst, Pixel::TRANSPARENT), dst);
        }
    }

    #[test]
    fn test_over_opaque_replaces() {
        let src = Pixel::rgb(9, 8, 7);
        assert_eq!(over(Pixel::WHITE, src), src);
        assert_eq!(over(Pixel::premultiplied(3, 3, 3, 100), src), src);
    }

    #[test]
    fn test_over_half_alpha() {
        // 50% red over opaque blue
        let src = Pixel::from_straight(255, 0, 0, 128);
        let mut dst = Pixel::rgb(0, 0, 255);
        dst += src;
        assert_eq!(dst.r(), 128);
        assert_eq!(dst.g(), 0);
        assert_eq!(dst.b(), 127);
        assert_eq!(dst.a(), 255);
    }

    #[test]
    fn test_over_clamps_inconsistent_input() {
        // R > A breaks the premultiplied invariant; the sum must not wrap
        let src = Pixel::premultiplied(250, 0, 0, 10);
        let dst = Pixel::rgb(255, 0, 0);
        let out = over(dst, src);
        assert_eq!(out.r(), 255);
        assert_eq!(out.a(), 255);
    }

    #[test]
    fn test_straight_round_trip() {
        // Precision in 8-bit premultiplied storage is only +-1 once alpha is
        // at least half; below that, low colour bits are lost.
        for a in 128..=255u8 {
            for c in 0..=255u8 {
                let p = Pixel::from_straight(c, 255 - c, c / 2, a);
                let [r, g, b, back_a] = p.to_straight_array();
                assert_eq!(back_a, a);
                assert!((r as i16 - c as i16).abs() <= 1, "r c={} a={}", c, a);
                assert!((g as i16 - (255 - c) as i16).abs() <= 1, "g c={} a={}", c, a);
                assert!((b as i16 - (c / 2) as i16).abs() <= 1, "b c={} a={}", c, a);
            }
        }
    }

    #[test]
    fn test_straight_of_transparent_is_zero() {
        assert_eq!(Pixel::premultiplied(0, 0, 0, 0).to_straight_array(), [0; 4]);
    }

    #[test]
    fn test_scaled_coverage() {
        let p = Pixel::rgb(200, 100, 0);
        assert_eq!(p.scaled(1.0), p);
        assert_eq!(p.scaled(0.0), Pixel::TRANSPARENT);
        assert_eq!(p.scaled(0.5).to_premultiplied_array(), [100, 50, 0, 128]);
        assert_eq!(p.scaled(7.0), p);
        assert_eq!(p.scaled(f32::NAN), Pixel::TRANSPARENT);
    }

    #[test]
    fn test_channel_accessors_are_mutable() {
        let mut p = Pixel::TRANSPARENT;
        *p.a_mut() = 90;
        *p.r_mut() = 30;
        assert_eq!(p.to_premultiplied_array(), [30, 0, 0, 90]);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(
            Pixel::premultiplied(1, 2, 3, 4).to_string(),
            "[ R: 1, G: 2, B: 3, A: 4 ]"
        );
    }
}
