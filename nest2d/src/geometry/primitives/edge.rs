use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, Transformable};
use crate::geometry::primitives::Point;

/// Geometric primitive representing a line segment
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
}

impl Edge {
    pub fn new(start: Point, end: Point) -> Self {
        Edge { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Angle of the edge's direction in `[0, 2π)`
    pub fn angle(&self) -> f64 {
        let a = (self.end.1 - self.start.1).atan2(self.end.0 - self.start.0);
        if a < 0.0 { a + std::f64::consts::TAU } else { a }
    }

    pub fn x_min(&self) -> f64 {
        f64::min(self.start.0, self.end.0)
    }

    pub fn y_min(&self) -> f64 {
        f64::min(self.start.1, self.end.1)
    }

    pub fn x_max(&self) -> f64 {
        f64::max(self.start.0, self.end.0)
    }

    pub fn y_max(&self) -> f64 {
        f64::max(self.start.1, self.end.1)
    }

    /// Point of the segment closest to `p`
    pub fn closest_point(&self, p: Point) -> Point {
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let sq_len = dx * dx + dy * dy;
        if sq_len == 0.0 {
            return self.start;
        }
        let t = (((p.0 - self.start.0) * dx + (p.1 - self.start.1) * dy) / sq_len).clamp(0.0, 1.0);
        Point(self.start.0 + t * dx, self.start.1 + t * dy)
    }

    /// Whether `p` lies on the segment (collinear and within its extent)
    fn contains_collinear(&self, p: &Point) -> bool {
        p.0 >= self.x_min() && p.0 <= self.x_max() && p.1 >= self.y_min() && p.1 <= self.y_max()
    }
}

impl Transformable for Edge {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        self.start.transform(t);
        self.end.transform(t);
        self
    }
}

impl CollidesWith<Edge> for Edge {
    fn collides_with(&self, other: &Edge) -> bool {
        //orientation based segment intersection test, collinear overlap included
        let (p1, q1, p2, q2) = (self.start, self.end, other.start, other.end);
        let o1 = p1.cross(&q1, &p2).signum();
        let o2 = p1.cross(&q1, &q2).signum();
        let o3 = p2.cross(&q2, &p1).signum();
        let o4 = p2.cross(&q2, &q1).signum();

        let c1 = p1.cross(&q1, &p2) == 0.0;
        let c2 = p1.cross(&q1, &q2) == 0.0;
        let c3 = p2.cross(&q2, &p1) == 0.0;
        let c4 = p2.cross(&q2, &q1) == 0.0;

        if !(c1 || c2 || c3 || c4) {
            return o1 != o2 && o3 != o4;
        }
        (c1 && self.contains_collinear(&p2))
            || (c2 && self.contains_collinear(&q2))
            || (c3 && other.contains_collinear(&p1))
            || (c4 && other.contains_collinear(&q1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_edges_collide() {
        let a = Edge::new(Point(0.0, 0.0), Point(2.0, 2.0));
        let b = Edge::new(Point(0.0, 2.0), Point(2.0, 0.0));
        assert!(a.collides_with(&b));
    }

    #[test]
    fn parallel_edges_do_not_collide() {
        let a = Edge::new(Point(0.0, 0.0), Point(2.0, 0.0));
        let b = Edge::new(Point(0.0, 1.0), Point(2.0, 1.0));
        assert!(!a.collides_with(&b));
    }

    #[test]
    fn touching_endpoint_collides() {
        let a = Edge::new(Point(0.0, 0.0), Point(2.0, 0.0));
        let b = Edge::new(Point(2.0, 0.0), Point(3.0, 1.0));
        assert!(a.collides_with(&b));
    }
}
