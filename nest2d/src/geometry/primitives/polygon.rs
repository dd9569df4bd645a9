use crate::error::Degeneracy;
use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Point, Rect, SPolygon};

/// Polygon with a single outer boundary and zero or more holes.
/// Every contour, holes included, is stored counterclockwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub outer: SPolygon,
    pub holes: Vec<SPolygon>,
}

impl Polygon {
    pub fn new(outer: SPolygon, holes: Vec<SPolygon>) -> Self {
        Polygon { outer, holes }
    }

    /// Builds a polygon from raw contours, see [`SPolygon::new`]
    pub fn from_contours(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Result<Self, Degeneracy> {
        let outer = SPolygon::new(outer)?;
        let holes = holes
            .into_iter()
            .map(SPolygon::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon { outer, holes })
    }

    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// All contours, outer boundary first
    pub fn rings(&self) -> impl Iterator<Item = &SPolygon> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// The polygon as a rectangle, if it is an axis-aligned rectangle without holes
    pub fn as_rect(&self) -> Option<Rect> {
        match self.holes.is_empty() {
            true => self.outer.as_axis_aligned_rect(),
            false => None,
        }
    }

    pub fn n_vertices(&self) -> usize {
        self.rings().map(|r| r.n_vertices()).sum()
    }

    /// Full validation of an input polygon: every ring simple, holes inside the outer ring.
    pub fn validate(&self) -> Result<(), Degeneracy> {
        for ring in self.rings() {
            ring.validate_simple()?;
        }
        let holes_inside = self.holes.iter().all(|h| {
            h.vertices
                .iter()
                .all(|v| self.outer.collides_with(v) || self.outer.vertices.contains(v))
        });
        match holes_inside && self.area() > 0.0 {
            true => Ok(()),
            false => Err(Degeneracy::SelfIntersecting),
        }
    }

    pub fn translate(&self, (dx, dy): (f64, f64)) -> Polygon {
        self.transform_clone(&Transformation::from_translation((dx, dy)))
    }

    pub fn all_vertices(&self) -> impl Iterator<Item = &Point> {
        self.rings().flat_map(|r| r.vertices.iter())
    }

    pub fn holes_area(&self) -> f64 {
        self.holes.iter().map(|h| h.area).sum()
    }
}

impl Shape for Polygon {
    fn centroid(&self) -> Point {
        let area = self.area();
        if self.holes.is_empty() || area <= 0.0 {
            return self.outer.centroid();
        }
        let weighted = |p: &SPolygon, sign: f64| {
            let Point(x, y) = p.centroid();
            (sign * p.area * x, sign * p.area * y)
        };
        let (sx, sy) = self
            .holes
            .iter()
            .map(|h| weighted(h, -1.0))
            .fold(weighted(&self.outer, 1.0), |(ax, ay), (bx, by)| {
                (ax + bx, ay + by)
            });
        Point(sx / area, sy / area)
    }

    fn area(&self) -> f64 {
        self.outer.area - self.holes_area()
    }

    fn bbox(&self) -> Rect {
        self.outer.bbox
    }

    fn diameter(&self) -> f64 {
        self.outer.diameter
    }
}

impl Transformable for Polygon {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        self.outer.transform(t);
        self.holes.iter_mut().for_each(|h| {
            h.transform(t);
        });
        self
    }
}

impl CollidesWith<Point> for Polygon {
    fn collides_with(&self, point: &Point) -> bool {
        self.outer.collides_with(point) && !self.holes.iter().any(|h| h.collides_with(point))
    }
}

impl From<SPolygon> for Polygon {
    fn from(outer: SPolygon) -> Self {
        Polygon {
            outer,
            holes: vec![],
        }
    }
}

impl From<Rect> for Polygon {
    fn from(r: Rect) -> Self {
        SPolygon::from(r).into()
    }
}

/// Total area of a set of polygons
pub fn total_area(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(|p| p.area()).sum()
}

/// Bounding box of a set of polygons
pub fn total_bbox(polygons: &[Polygon]) -> Option<Rect> {
    polygons
        .iter()
        .map(|p| p.bbox())
        .reduce(Rect::bounding_rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Polygon {
        Polygon::from_contours(
            vec![
                Point(0.0, 0.0),
                Point(10.0, 0.0),
                Point(10.0, 10.0),
                Point(0.0, 10.0),
            ],
            vec![vec![
                Point(2.0, 2.0),
                Point(2.0, 8.0),
                Point(8.0, 8.0),
                Point(8.0, 2.0),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn area_subtracts_holes() {
        let f = frame();
        assert_eq!(f.area(), 64.0);
        assert!(f.holes[0].area > 0.0);
        assert_eq!(f.validate(), Ok(()));
    }

    #[test]
    fn points_in_hole_are_outside() {
        let f = frame();
        assert!(f.collides_with(&Point(1.0, 1.0)));
        assert!(!f.collides_with(&Point(5.0, 5.0)));
    }

    #[test]
    fn symmetric_frame_centroid() {
        let c = frame().centroid();
        assert!((c.0 - 5.0).abs() < 1e-9 && (c.1 - 5.0).abs() < 1e-9);
    }
}
