use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::error::Degeneracy;
use crate::geometry::Transformation;
use crate::geometry::convex_hull::convex_hull_from_points;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Edge, Point, Rect};

/// Geometric primitive representing a simple polygon: <https://en.wikipedia.org/wiki/Simple_polygon>
///
/// Vertices are always stored in counterclockwise order, without a repeated closing vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct SPolygon {
    /// Set of vertices describing the polygon
    pub vertices: Vec<Point>,
    /// Bounding box
    pub bbox: Rect,
    pub area: f64,
    /// Maximum distance between any two points in the polygon
    pub diameter: f64,
}

impl SPolygon {
    /// Create a new simple polygon from a set of points.
    /// Expensive operations are performed here! Use [Self::clone()] or [Self::transform()] to avoid recomputation.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped.
    /// Clockwise input is reversed.
    pub fn new(points: Vec<Point>) -> Result<Self, Degeneracy> {
        if !points.iter().all(|p| p.is_finite()) {
            return Err(Degeneracy::NonFinite);
        }
        let mut points = points.into_iter().dedup().collect_vec();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 3 {
            return Err(Degeneracy::TooFewVertices(points.len()));
        }

        let area = match SPolygon::calculate_area(&points) {
            area if area == 0.0 => return Err(Degeneracy::ZeroArea),
            area if area < 0.0 => {
                //edges should always be ordered counterclockwise (positive area)
                points.reverse();
                -area
            }
            area => area,
        };

        let diameter = SPolygon::calculate_diameter(&points);
        let bbox = SPolygon::generate_bounding_box(&points);

        Ok(SPolygon {
            vertices: points,
            bbox,
            area,
            diameter,
        })
    }

    /// Checks the polygon for repeated vertices and crossing edges.
    /// Quadratic in the number of edges, meant for input validation only.
    pub fn validate_simple(&self) -> Result<(), Degeneracy> {
        if self.vertices.iter().unique().count() != self.vertices.len() {
            return Err(Degeneracy::DuplicateVertices);
        }
        let n = self.n_vertices();
        for (i, j) in (0..n).tuple_combinations() {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if !adjacent && self.edge(i).collides_with(&self.edge(j)) {
                return Err(Degeneracy::SelfIntersecting);
            }
        }
        Ok(())
    }

    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i]
    }

    pub fn edge(&self, i: usize) -> Edge {
        let j = (i + 1) % self.n_vertices();
        Edge::new(self.vertices[i], self.vertices[j])
    }

    pub fn edge_iter(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.n_vertices()).map(move |i| self.edge(i))
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// True if no vertex turns clockwise (collinear vertices allowed)
    pub fn is_convex(&self) -> bool {
        let n = self.n_vertices();
        (0..n).all(|i| {
            let (a, b, c) = (
                self.vertices[i],
                self.vertices[(i + 1) % n],
                self.vertices[(i + 2) % n],
            );
            a.cross(&b, &c) >= 0.0
        })
    }

    /// Returns the rectangle if the polygon is an axis-aligned rectangle (ignoring collinear vertices).
    pub fn as_axis_aligned_rect(&self) -> Option<Rect> {
        let on_bbox_corner = |p: &Point| {
            (p.0 == self.bbox.x_min || p.0 == self.bbox.x_max)
                && (p.1 == self.bbox.y_min || p.1 == self.bbox.y_max)
        };
        let area_matches = (self.area - self.bbox.area()).abs() <= 1e-12 * self.bbox.area();
        let corners = self.vertices.iter().filter(|p| on_bbox_corner(p)).count();
        match area_matches && corners == 4 {
            true => Some(self.bbox),
            false => None,
        }
    }

    /// The point reflection through the origin, `{-p | p ∈ self}`
    pub fn reflected(&self) -> SPolygon {
        //a point reflection is a rotation by π: orientation is preserved
        let vertices = self.vertices.iter().map(|p| -*p).collect_vec();
        let bbox = SPolygon::generate_bounding_box(&vertices);
        SPolygon {
            vertices,
            bbox,
            area: self.area,
            diameter: self.diameter,
        }
    }

    /// Index of the vertex with the lowest y, ties broken by lowest x
    pub fn bottom_left_vertex_idx(&self) -> usize {
        self.vertices
            .iter()
            .position_min_by_key(|p| (OrderedFloat(p.1), OrderedFloat(p.0)))
            .unwrap_or(0)
    }

    pub fn calculate_diameter(points: &[Point]) -> f64 {
        //The two points furthest apart must be part of the convex hull
        let ch = convex_hull_from_points(points.to_vec());

        ch.iter()
            .tuple_combinations()
            .map(|(p1, p2)| OrderedFloat(p1.sq_distance(p2)))
            .max()
            .map_or(0.0, |sq_d| sq_d.0.sqrt())
    }

    pub fn generate_bounding_box(points: &[Point]) -> Rect {
        Rect::from_points(points).unwrap_or(Rect {
            x_min: 0.0,
            y_min: 0.0,
            x_max: 0.0,
            y_max: 0.0,
        })
    }

    //https://en.wikipedia.org/wiki/Shoelace_formula
    //counterclockwise = positive area, clockwise = negative area
    pub fn calculate_area(points: &[Point]) -> f64 {
        let mut sigma: f64 = 0.0;
        for i in 0..points.len() {
            let j = (i + 1) % points.len();
            let (x_i, y_i) = points[i].into();
            let (x_j, y_j) = points[j].into();
            sigma += (y_i + y_j) * (x_i - x_j)
        }
        0.5 * sigma
    }
}

impl Shape for SPolygon {
    fn centroid(&self) -> Point {
        //based on: https://en.wikipedia.org/wiki/Centroid#Of_a_polygon
        let mut c_x = 0.0;
        let mut c_y = 0.0;

        for edge in self.edge_iter() {
            let Point(x_i, y_i) = edge.start;
            let Point(x_j, y_j) = edge.end;
            c_x += (x_i + x_j) * (x_i * y_j - x_j * y_i);
            c_y += (y_i + y_j) * (x_i * y_j - x_j * y_i);
        }

        c_x /= 6.0 * self.area;
        c_y /= 6.0 * self.area;

        Point(c_x, c_y)
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn bbox(&self) -> Rect {
        self.bbox
    }

    fn diameter(&self) -> f64 {
        self.diameter
    }
}

impl Transformable for SPolygon {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        //destructuring pattern to ensure that the code is updated when the struct changes
        let SPolygon {
            vertices,
            bbox,
            area: _,
            diameter: _,
        } = self;

        vertices.iter_mut().for_each(|p| {
            p.transform(t);
        });

        //regenerate bounding box
        *bbox = SPolygon::generate_bounding_box(vertices);

        self
    }
}

impl CollidesWith<Point> for SPolygon {
    fn collides_with(&self, point: &Point) -> bool {
        //based on the ray casting algorithm: https://en.wikipedia.org/wiki/Point_in_polygon#Ray_casting_algorithm
        if !self.bbox.collides_with(point) {
            return false;
        }
        let Point(px, py) = *point;
        let mut inside = false;
        for edge in self.edge_iter() {
            let (Point(x1, y1), Point(x2, y2)) = (edge.start, edge.end);
            if (y1 > py) != (y2 > py) {
                let x_cross = x1 + (py - y1) * (x2 - x1) / (y2 - y1);
                if px < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl From<Rect> for SPolygon {
    fn from(r: Rect) -> Self {
        SPolygon {
            vertices: r.corners().to_vec(),
            bbox: r,
            area: r.area(),
            diameter: r.diameter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> SPolygon {
        SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(4.0, 0.0),
            Point(4.0, 1.0),
            Point(1.0, 1.0),
            Point(1.0, 4.0),
            Point(0.0, 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn clockwise_input_is_reversed() {
        let cw = SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(0.0, 1.0),
            Point(1.0, 1.0),
            Point(1.0, 0.0),
        ])
        .unwrap();
        assert!(SPolygon::calculate_area(&cw.vertices) > 0.0);
        assert_eq!(cw.area, 1.0);
    }

    #[test]
    fn closing_vertex_is_stripped() {
        let p = SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(1.0, 0.0),
            Point(0.0, 1.0),
            Point(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(p.n_vertices(), 3);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let collinear = vec![Point(0.0, 0.0), Point(1.0, 1.0), Point(2.0, 2.0)];
        assert_eq!(SPolygon::new(collinear), Err(Degeneracy::ZeroArea));
        let two = vec![Point(0.0, 0.0), Point(1.0, 1.0)];
        assert_eq!(SPolygon::new(two), Err(Degeneracy::TooFewVertices(2)));
    }

    #[test]
    fn bowtie_is_not_simple() {
        let bowtie = SPolygon::new(vec![
            Point(0.0, 0.0),
            Point(3.0, 2.0),
            Point(3.0, 0.0),
            Point(0.0, 3.0),
        ])
        .unwrap();
        assert_eq!(bowtie.validate_simple(), Err(Degeneracy::SelfIntersecting));
        assert_eq!(l_shape().validate_simple(), Ok(()));
    }

    #[test]
    fn convexity_and_containment() {
        let l = l_shape();
        assert!(!l.is_convex());
        assert!(l.collides_with(&Point(0.5, 3.0)));
        assert!(!l.collides_with(&Point(3.0, 3.0)));
        assert!(SPolygon::from(Rect::try_new(0.0, 0.0, 2.0, 1.0).unwrap()).is_convex());
    }

    #[test]
    fn detects_axis_aligned_rectangles() {
        let r = Rect::try_new(1.0, 2.0, 5.0, 3.0).unwrap();
        assert_eq!(SPolygon::from(r).as_axis_aligned_rect(), Some(r));
        assert_eq!(l_shape().as_axis_aligned_rect(), None);
    }
}
