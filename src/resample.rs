//! Image resizing: interpolated point sampling when growing, box-averaged
//! supersampling when shrinking.

use crate::display::bitmap::Bitmap;
use crate::pixel::Pixel;

/// How far into a destination pixel the downscale footprint reaches.
/// Just short of 1.0 so neighbouring footprints never share an edge.
const FOOTPRINT_EXTENT: f32 = 0.999;

/// Map a destination coordinate into source space
#[inline]
fn project(src_span: f32, dst_span: f32, point: f32) -> f32 {
    point / dst_span * src_span
}

/// Per-channel weighted mix; `amount_of_first` is the weight of `first`
fn mix(first: Pixel, second: Pixel, amount_of_first: f32) -> Pixel {
    let w = amount_of_first.clamp(0.0, 1.0);
    let a = first.to_premultiplied_array();
    let b = second.to_premultiplied_array();
    let ch = |i: usize| (a[i] as f32 * w + b[i] as f32 * (1.0 - w)).round() as u8;
    Pixel::premultiplied(ch(0), ch(1), ch(2), ch(3))
}

/// Sample `image` at a fractional source location.
///
/// The pixel under the location is blended with its horizontal neighbour on
/// whichever side the location leans toward, weighted by the distance from
/// that neighbour's centre, and likewise vertically. The two axis results are
/// averaged and then averaged again with the direct sample. Edge pixels skip
/// the blend toward the missing neighbour.
///
/// `image` must not be empty.
pub(crate) fn sample_interpolated(image: &Bitmap, loc_x: f32, loc_y: f32) -> Pixel {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let pos_x = (loc_x.floor() as i64).clamp(0, max_x);
    let pos_y = (loc_y.floor() as i64).clamp(0, max_y);
    let at = |x: i64, y: i64| image.row(y as u32)[x as usize];

    let direct = at(pos_x, pos_y);

    let x_offset = (loc_x - pos_x as f32).clamp(0.0, 1.0);
    let x_pixel = if x_offset < 0.5 {
        if pos_x > 0 {
            mix(direct, at(pos_x - 1, pos_y), 0.5 + x_offset)
        } else {
            direct
        }
    } else if pos_x < max_x {
        mix(direct, at(pos_x + 1, pos_y), 1.5 - x_offset)
    } else {
        direct
    };

    let y_offset = (loc_y - pos_y as f32).clamp(0.0, 1.0);
    let y_pixel = if y_offset < 0.5 {
        if pos_y > 0 {
            mix(direct, at(pos_x, pos_y - 1), 0.5 + y_offset)
        } else {
            direct
        }
    } else if pos_y < max_y {
        mix(direct, at(pos_x, pos_y + 1), 1.5 - y_offset)
    } else {
        direct
    };

    mix(mix(x_pixel, y_pixel, 0.5), direct, 0.5)
}

/// Sampling plan for one resize: projection spans and per-axis sample counts.
#[derive(Debug, Clone, Copy)]
pub struct SampleGrid {
    src_width: f32,
    src_height: f32,
    dst_width: f32,
    dst_height: f32,
    src_cols: u32,
    src_rows: u32,
    samples_x: u32,
    samples_y: u32,
}

impl SampleGrid {
    /// Plan a resize of a `src_width` x `src_height` image. Target dimensions must be non-zero.
    pub fn new(src_width: u32, src_height: u32, dst_width: u32, dst_height: u32) -> Self {
        let ratio_x = src_width as f32 / dst_width as f32;
        let ratio_y = src_height as f32 / dst_height as f32;
        Self {
            src_width: src_width as f32,
            src_height: src_height as f32,
            dst_width: dst_width as f32,
            dst_height: dst_height as f32,
            src_cols: src_width,
            src_rows: src_height,
            samples_x: (ratio_x.ceil() as u32).max(1),
            samples_y: (ratio_y.ceil() as u32).max(1),
        }
    }

    /// Sample counts per destination pixel along x and y
    pub fn samples_per_pixel(&self) -> (u32, u32) {
        (self.samples_x, self.samples_y)
    }

    /// True when neither axis shrinks, so one centred sample suffices
    pub fn is_single_sample(&self) -> bool {
        self.samples_x == 1 && self.samples_y == 1
    }

    /// Source-space centre of destination pixel (dx, dy)
    pub fn center(&self, dx: u32, dy: u32) -> (f32, f32) {
        (
            project(self.src_width, self.dst_width, dx as f32 + 0.5),
            project(self.src_height, self.dst_height, dy as f32 + 0.5),
        )
    }

    /// Supersampling locations for destination pixel (dx, dy) that fall
    /// inside the source. Points past either edge are dropped, so the
    /// caller averages over however many remain.
    pub fn footprint(&self, dx: u32, dy: u32, out: &mut Vec<(f32, f32)>) {
        out.clear();
        let min_x = project(self.src_width, self.dst_width, dx as f32);
        let max_x = project(self.src_width, self.dst_width, dx as f32 + FOOTPRINT_EXTENT);
        let min_y = project(self.src_height, self.dst_height, dy as f32);
        let max_y = project(self.src_height, self.dst_height, dy as f32 + FOOTPRINT_EXTENT);
        let step_x = (max_x - min_x) / self.samples_x as f32;
        let step_y = (max_y - min_y) / self.samples_y as f32;

        for j in 0..self.samples_y {
            let loc_y = min_y + j as f32 * step_y;
            if loc_y < 0.0 || loc_y as u32 >= self.src_rows {
                continue;
            }
            for i in 0..self.samples_x {
                let loc_x = min_x + i as f32 * step_x;
                if loc_x < 0.0 || loc_x as u32 >= self.src_cols {
                    continue;
                }
                out.push((loc_x, loc_y));
            }
        }
    }
}

/// Unweighted per-channel mean, rounded; transparent for no samples
fn average(samples: &[Pixel]) -> Pixel {
    if samples.is_empty() {
        return Pixel::TRANSPARENT;
    }
    let mut totals = [0u32; 4];
    for s in samples {
        for (t, c) in totals.iter_mut().zip(s.to_premultiplied_array()) {
            *t += c as u32;
        }
    }
    let n = samples.len() as f32;
    let ch = |i: usize| (totals[i] as f32 / n).round() as u8;
    Pixel::premultiplied(ch(0), ch(1), ch(2), ch(3))
}

/// Produce a new `width` x `height` bitmap from `src`.
///
/// A zero target dimension yields an empty bitmap of that size. An empty
/// source yields a fully transparent bitmap.
pub fn resample(src: &Bitmap, width: u32, height: u32) -> Bitmap {
    let mut out = Bitmap::new(width, height);
    if out.is_empty() || src.is_empty() {
        return out;
    }

    let grid = SampleGrid::new(src.width(), src.height(), width, height);
    let single = grid.is_single_sample();
    let mut points = Vec::new();
    let mut samples = Vec::new();

    let pixels = out.as_pixels_mut();
    for dy in 0..height {
        for dx in 0..width {
            let value = if single {
                let (x, y) = grid.center(dx, dy);
                sample_interpolated(src, x, y)
            } else {
                grid.footprint(dx, dy, &mut points);
                samples.clear();
                samples.extend(points.iter().map(|&(x, y)| sample_interpolated(src, x, y)));
                average(&samples)
            };
            pixels[dy as usize * width as usize + dx as usize] = value;
        }
    }
    out
}
