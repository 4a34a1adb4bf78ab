//! Line, rectangle and image rasterization onto any pixel surface.
//!
//! Every routine composites through [`Surface::composite`], which drops
//! writes that land outside the surface. Coordinates are therefore never
//! clipped up front (except where noted as a pure optimization) and lines
//! that leave the surface keep their exact pixel positions where they re-enter.

use crate::display::bitmap::Bitmap;
use crate::pixel::Pixel;

/// Widest stroke `draw_line_aa_width` will sweep, in pixels
pub const MAX_STROKE_WIDTH: f32 = 4096.0;

/// Something the rasterizers can draw on.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Composite `color` over the pixel at (x, y). Out-of-range is a no-op.
    fn composite(&mut self, x: i32, y: i32, color: Pixel);
}

// ============================================================================
// Lines
// ============================================================================

/// Composite at 64-bit coordinates; points outside the `i32` range are skipped
#[inline]
fn plot_wide<S: Surface + ?Sized>(surface: &mut S, x: i64, y: i64, color: Pixel) {
    if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
        surface.composite(x, y, color);
    }
}

/// Draw a 1-pixel solid line using Bresenham's algorithm.
///
/// The path is 8-connected and always includes both endpoints.
pub fn draw_line<S: Surface + ?Sized>(
    surface: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Pixel,
) {
    let dx = (x1 as i64 - x0 as i64).abs();
    let dy = -(y1 as i64 - y0 as i64).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let (mut x, mut y) = (x0, y0);
    loop {
        surface.composite(x, y, color);
        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Euclidean length of the (dx, dy) step, or 1 for a degenerate line
#[inline]
fn line_length(dx: i64, dy: i64) -> f32 {
    if dx + dy == 0 {
        1.0
    } else {
        (dx as f64).hypot(dy as f64) as f32
    }
}

/// Draw a unit-width anti-aliased line (Zingl's variant of Wu's algorithm).
///
/// The main pixel at each step gets coverage `1 - distance`, and the
/// neighbour on the far side of the ideal line picks up the remainder.
pub fn draw_line_aa<S: Surface + ?Sized>(
    surface: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Pixel,
) {
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    let ed = line_length(dx, dy);

    let mut plot = |x: i64, y: i64, dist: i64| {
        plot_wide(&mut *surface, x, y, color.scaled(1.0 - dist.abs() as f32 / ed));
    };

    let (mut x, mut y) = (x0, y0);
    loop {
        plot(x, y, err - dx + dy);
        let e2 = err;
        let xt = x;
        if 2 * e2 >= -dx {
            if x == x1 {
                break;
            }
            if ((e2 + dy) as f32) < ed {
                plot(x, y + sy, e2 + dy);
            }
            err -= dy;
            x += sx;
        }
        if 2 * e2 <= dy {
            if y == y1 {
                break;
            }
            if ((dx - e2) as f32) < ed {
                plot(xt + sx, y, dx - e2);
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw an anti-aliased line of the given stroke width.
///
/// Each step sweeps perpendicular to the major axis until the distance from
/// the ideal line exceeds half the width. Coverage falls off over the last
/// pixel: `1 - max(0, distance - half_width + 1)` where
/// `half_width = (width + 1) / 2`.
///
/// A NaN or infinite width draws nothing; negative widths act as 0 and
/// widths past [`MAX_STROKE_WIDTH`] are capped.
pub fn draw_line_aa_width<S: Surface + ?Sized>(
    surface: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    width: f32,
    color: Pixel,
) {
    if !width.is_finite() {
        return;
    }
    let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    let ed = line_length(dx, dy);
    let wd = (width.clamp(0.0, MAX_STROKE_WIDTH) + 1.0) / 2.0;
    let reach = ed * wd;

    let mut plot = |x: i64, y: i64, dist: i64| {
        let fade = (dist.abs() as f32 / ed - wd + 1.0).max(0.0);
        plot_wide(&mut *surface, x, y, color.scaled(1.0 - fade));
    };

    let (mut x, mut y) = (x0, y0);
    loop {
        plot(x, y, err - dx + dy);
        let mut e2 = err;
        let xt = x;
        if 2 * e2 >= -dx {
            // vertical sweep
            e2 += dy;
            let mut ys = y;
            while (e2 as f32) < reach && (y1 != ys || dx > dy) {
                ys += sy;
                plot(x, ys, e2);
                e2 += dx;
            }
            if x == x1 {
                break;
            }
            e2 = err;
            err -= dy;
            x += sx;
        }
        if 2 * e2 <= dy {
            // horizontal sweep
            e2 = dx - e2;
            let mut xs = xt;
            while (e2 as f32) < reach && (x1 != xs || dx < dy) {
                xs += sx;
                plot(xs, y, e2);
                e2 += dy;
            }
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

// ============================================================================
// Areas
// ============================================================================

/// Fill the inclusive rectangle spanned by (x0, y0) and (x1, y1).
///
/// The x corners may come in either order. The y corners must satisfy
/// `y0 <= y1`; a reversed pair fills nothing.
pub fn fill_rect<S: Surface + ?Sized>(
    surface: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Pixel,
) {
    let (left, right) = if x1 < x0 { (x1, x0) } else { (x0, x1) };

    // Only the part overlapping the surface can change anything
    let x_start = (left as i64).max(0);
    let x_end = (right as i64).min(surface.width() as i64 - 1);
    let y_start = (y0 as i64).max(0);
    let y_end = (y1 as i64).min(surface.height() as i64 - 1);

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            surface.composite(x as i32, y as i32, color);
        }
    }
}

/// Composite a whole image with its top-left corner at (dest_x, dest_y).
///
/// Only the intersection of the placed image and the surface is touched;
/// an image placed entirely off-surface is a no-op.
pub fn blit<S: Surface + ?Sized>(surface: &mut S, dest_x: i32, dest_y: i32, image: &Bitmap) {
    let dest_x = dest_x as i64;
    let dest_y = dest_y as i64;

    let src_left = (-dest_x).max(0);
    let src_top = (-dest_y).max(0);
    let src_right = (image.width() as i64).min(surface.width() as i64 - dest_x);
    let src_bottom = (image.height() as i64).min(surface.height() as i64 - dest_y);

    if src_left >= src_right || src_top >= src_bottom {
        return;
    }

    for sy in src_top..src_bottom {
        let row = image.row(sy as u32);
        let ty = (dest_y + sy) as i32;
        for sx in src_left..src_right {
            surface.composite((dest_x + sx) as i32, ty, row[sx as usize]);
        }
    }
}
