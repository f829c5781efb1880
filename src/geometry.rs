use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 2D coordinate in the search region. Wolves, targets and bounds are all points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same value on both axes.
    #[inline(always)]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    #[inline(always)]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Componentwise product.
    #[inline(always)]
    pub fn hadamard(self, other: Point) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    #[inline(always)]
    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Arithmetic mean of a set of points. `None` for an empty slice.
    pub fn mean(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Point::ORIGIN, |acc, &p| acc + p);
        Some(sum / points.len() as f32)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline(always)]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline(always)]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    #[inline(always)]
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    #[inline(always)]
    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "({:.*}, {:.*})", p, self.x, p, self.y),
            None => write!(f, "({}, {})", self.x, self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_algebra() {
        let a = Point::new(1.0, -2.0);
        let b = Point::new(3.0, 4.0);

        assert_eq!(a + b, Point::new(4.0, 2.0));
        assert_eq!(a - b, Point::new(-2.0, -6.0));
        assert_eq!(a * 2.0, Point::new(2.0, -4.0));
        assert_eq!(b / 2.0, Point::new(1.5, 2.0));
        assert_eq!(a.abs(), Point::new(1.0, 2.0));
        assert_eq!(a.hadamard(b), Point::new(3.0, -8.0));
        assert_eq!(-a, Point::new(-1.0, 2.0));
    }

    #[test]
    fn test_distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_mean() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(0.0, 3.0),
        ];
        assert_eq!(Point::mean(&pts), Some(Point::new(1.0, 1.0)));
        assert_eq!(Point::mean(&[]), None);
    }

    #[test]
    fn test_display_precision() {
        let p = Point::new(1.23456, 7.0);
        assert_eq!(format!("{:.2}", p), "(1.23, 7.00)");
    }
}
