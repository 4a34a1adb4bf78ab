//! 2D points and axis-aligned boxes for layout and hit testing

use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        (*self - *other).length()
    }

    /// Calculate the length of the point as a vector
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Nearest integer pixel coordinates
    #[inline]
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Point `t` of the way from `a` to `b` (unclamped)
#[inline]
pub fn lerp(a: Point, b: Point, t: f32) -> Point {
    Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, f: f32) -> Self {
        Self::new(self.x * f, self.y * f)
    }
}

// ============================================================================
// Bounding Box
// ============================================================================

/// Axis-aligned box. `min` holds the smaller coordinate on both axes, so
/// the box reads the same whether y grows up or down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    min: Point,
    max: Point,
}

impl BoundingBox {
    /// Box spanning two opposite corners, given in any order
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Edges count as inside
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Touching edges count as overlap
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y)
    }

    /// Move so `min` lands on `corner`, keeping the size
    pub fn move_to(&mut self, corner: Point) {
        let size = self.max - self.min;
        self.min = corner;
        self.max = corner + size;
    }
}

impl Add<Point> for BoundingBox {
    type Output = Self;

    fn add(self, v: Point) -> Self {
        Self::new(self.min + v, self.max + v)
    }
}

impl AddAssign<Point> for BoundingBox {
    fn add_assign(&mut self, v: Point) {
        *self = *self + v;
    }
}

impl Sub<Point> for BoundingBox {
    type Output = Self;

    fn sub(self, v: Point) -> Self {
        Self::new(self.min - v, self.max - v)
    }
}

impl SubAssign<Point> for BoundingBox {
    fn sub_assign(&mut self, v: Point) {
        *self = *self - v;
    }
}

impl Mul<f32> for BoundingBox {
    type Output = Self;

    /// Scale both corners about the origin; a negative factor re-normalizes
    fn mul(self, f: f32) -> Self {
        Self::new(self.min * f, self.max * f)
    }
}

impl MulAssign<f32> for BoundingBox {
    fn mul_assign(&mut self, f: f32) {
        *self = *self * f;
    }
}

impl Mul<BoundingBox> for f32 {
    type Output = BoundingBox;

    fn mul(self, b: BoundingBox) -> BoundingBox {
        b * self
    }
}
