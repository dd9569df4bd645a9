use crate::error::Degeneracy;
use crate::geometry::geo_enums::GeoRelation;
use crate::geometry::geo_traits::CollidesWith;
use crate::geometry::primitives::Point;

///Axis-aligned rectangle
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self, Degeneracy> {
        if ![x_min, y_min, x_max, y_max].iter().all(|v| v.is_finite()) {
            return Err(Degeneracy::NonFinite);
        }
        if !(x_min < x_max && y_min < y_max) {
            return Err(Degeneracy::ZeroArea);
        }
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Bounding box of a set of points, `None` if the set is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Rect>, p| {
            Some(match acc {
                None => Rect {
                    x_min: p.0,
                    y_min: p.1,
                    x_max: p.0,
                    y_max: p.1,
                },
                Some(r) => Rect {
                    x_min: r.x_min.min(p.0),
                    y_min: r.y_min.min(p.1),
                    x_max: r.x_max.max(p.0),
                    y_max: r.y_max.max(p.1),
                },
            })
        })
    }

    /// Returns the geometric relation between `self` and another [`Rect`].
    pub fn relation_to(&self, other: Rect) -> GeoRelation {
        if !self.collides_with(&other) {
            return GeoRelation::Disjoint;
        }
        if self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
        {
            return GeoRelation::Surrounding;
        }
        if self.x_min >= other.x_min
            && self.y_min >= other.y_min
            && self.x_max <= other.x_max
            && self.y_max <= other.y_max
        {
            return GeoRelation::Enclosed;
        }
        GeoRelation::Intersecting
    }

    /// Returns a new rectangle expanded by `d` on every side.
    /// Negative values shrink, `None` if the result would be inverted.
    pub fn resize_by(mut self, d: f64) -> Option<Self> {
        self.x_min -= d;
        self.y_min -= d;
        self.x_max += d;
        self.y_max += d;
        match self.x_min <= self.x_max && self.y_min <= self.y_max {
            true => Some(self),
            false => None,
        }
    }

    pub fn translate(self, (dx, dy): (f64, f64)) -> Self {
        Rect {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }

    /// Counterclockwise corners, starting from the bottom-left one
    pub fn corners(&self) -> [Point; 4] {
        [
            Point(self.x_min, self.y_min),
            Point(self.x_max, self.y_min),
            Point(self.x_max, self.y_max),
            Point(self.x_min, self.y_max),
        ]
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns the largest rectangle that is contained in both `a` and `b`.
    pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
        let x_min = f64::max(a.x_min, b.x_min);
        let y_min = f64::max(a.y_min, b.y_min);
        let x_max = f64::min(a.x_max, b.x_max);
        let y_max = f64::min(a.y_max, b.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    /// Returns the smallest rectangle that contains both `a` and `b`.
    pub fn bounding_rect(a: Rect, b: Rect) -> Rect {
        Rect {
            x_min: f64::min(a.x_min, b.x_min),
            y_min: f64::min(a.y_min, b.y_min),
            x_max: f64::max(a.x_max, b.x_max),
            y_max: f64::max(a.y_max, b.y_max),
        }
    }

    pub fn centroid(&self) -> Point {
        Point(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }

    pub fn diameter(&self) -> f64 {
        let dx = self.x_max - self.x_min;
        let dy = self.y_max - self.y_min;
        (dx.powi(2) + dy.powi(2)).sqrt()
    }
}

impl CollidesWith<Rect> for Rect {
    #[inline(always)]
    fn collides_with(&self, other: &Rect) -> bool {
        f64::max(self.x_min, other.x_min) <= f64::min(self.x_max, other.x_max)
            && f64::max(self.y_min, other.y_min) <= f64::min(self.y_max, other.y_max)
    }
}

impl CollidesWith<Point> for Rect {
    #[inline(always)]
    fn collides_with(&self, point: &Point) -> bool {
        let Point(x, y) = *point;
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}
