use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};

use crate::geometry::Transformation;
use crate::geometry::geo_traits::Transformable;

/// Geometric primitive representing a point (or a vector from the origin)
#[derive(Debug, Clone, PartialEq, Copy, Default)]
pub struct Point(pub f64, pub f64);

impl Transformable for Point {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        (self.0, self.1) = t.apply((self.0, self.1));
        self
    }
}

impl Point {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.sq_distance(other).sqrt()
    }

    pub fn sq_distance(&self, other: &Point) -> f64 {
        (self.0 - other.0).powi(2) + (self.1 - other.1).powi(2)
    }

    /// z-component of the cross product of `(a - self)` and `(b - self)`.
    /// Positive if `self -> a -> b` turns counterclockwise.
    pub fn cross(&self, a: &Point, b: &Point) -> f64 {
        (a.0 - self.0) * (b.1 - self.1) - (a.1 - self.1) * (b.0 - self.0)
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point(-self.0, -self.1)
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
        self.1.to_bits().hash(state);
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.0, p.1)
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Point(p.0, p.1)
    }
}
