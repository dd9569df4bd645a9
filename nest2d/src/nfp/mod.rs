use crate::geometry::primitives::{Point, Polygon, Rect, total_bbox};
use crate::kernel::Tolerance;

mod cache;
mod engine;
mod minkowski;

pub use cache::{GeoCache, IfpCache, IfpKey, NfpCache, NfpKey};
pub use engine::NfpEngine;
pub use minkowski::{convex_nfp, minkowski_sum_convex};

/// Reference point positions at which an orbiting shape overlaps (or touches) a stationary one.
///
/// Disconnected components are kept as separate polygons.
/// Cavities of the stationary shape in which the orbiting shape fits appear as holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NofitPolygon {
    pub regions: Vec<Polygon>,
}

impl NofitPolygon {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn translated(&self, v: (f64, f64)) -> Vec<Polygon> {
        self.regions.iter().map(|r| r.translate(v)).collect()
    }
}

/// Set of feasible reference point positions.
#[derive(Clone, Debug, PartialEq)]
pub enum FeasibleRegion {
    /// No position is feasible
    Empty,
    /// Axis-aligned rectangle of positions, possibly collapsed to a segment or a point
    Rect(Rect),
    /// Union of polygons
    Polygons(Vec<Polygon>),
}

impl FeasibleRegion {
    pub fn is_empty(&self) -> bool {
        match self {
            FeasibleRegion::Empty => true,
            FeasibleRegion::Rect(_) => false,
            FeasibleRegion::Polygons(p) => p.is_empty(),
        }
    }

    /// Polygonal representation.
    /// Rectangles are kept exact, only a collapsed axis is widened by the tolerance.
    pub fn to_polygons(&self, tol: Tolerance) -> Vec<Polygon> {
        match self {
            FeasibleRegion::Empty => vec![],
            FeasibleRegion::Rect(r) => {
                let mut r = *r;
                if r.width() <= 0.0 {
                    r.x_min -= tol.eps;
                    r.x_max += tol.eps;
                }
                if r.height() <= 0.0 {
                    r.y_min -= tol.eps;
                    r.y_max += tol.eps;
                }
                match r.width() > 0.0 && r.height() > 0.0 {
                    true => vec![Polygon::from(r)],
                    false => vec![],
                }
            }
            FeasibleRegion::Polygons(p) => p.clone(),
        }
    }

    /// Candidate positions: every vertex of the region, in a fixed scan order
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            FeasibleRegion::Empty => vec![],
            FeasibleRegion::Rect(r) => r.corners().to_vec(),
            FeasibleRegion::Polygons(p) => p.iter().flat_map(|p| p.all_vertices().copied()).collect(),
        }
    }

    /// Points of the region closest to `target`: the clamped target for rectangles,
    /// one point per boundary edge otherwise
    pub fn nearest_points(&self, target: Point) -> Vec<Point> {
        match self {
            FeasibleRegion::Empty => vec![],
            FeasibleRegion::Rect(r) => vec![Point(
                target.0.clamp(r.x_min, r.x_max),
                target.1.clamp(r.y_min, r.y_max),
            )],
            FeasibleRegion::Polygons(p) => p
                .iter()
                .flat_map(|p| p.rings())
                .flat_map(|ring| ring.edge_iter())
                .map(|e| e.closest_point(target))
                .collect(),
        }
    }

    pub fn bbox(&self) -> Option<Rect> {
        match self {
            FeasibleRegion::Empty => None,
            FeasibleRegion::Rect(r) => Some(*r),
            FeasibleRegion::Polygons(p) => total_bbox(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geo_traits::Shape;

    #[test]
    fn open_rect_is_not_widened() {
        let tol = Tolerance::new(1e-6, 10.0);
        let r = Rect::try_new(1.0, 2.0, 5.0, 4.0).unwrap();
        let polys = FeasibleRegion::Rect(r).to_polygons(tol);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].bbox(), r);
    }

    #[test]
    fn collapsed_axis_is_widened_alone() {
        let tol = Tolerance::new(1e-6, 10.0);
        let r = Rect {
            x_min: 3.0,
            y_min: 0.0,
            x_max: 3.0,
            y_max: 2.0,
        };
        let polys = FeasibleRegion::Rect(r).to_polygons(tol);
        assert_eq!(polys.len(), 1);
        let bbox = polys[0].bbox();
        assert_eq!((bbox.y_min, bbox.y_max), (0.0, 2.0));
        assert!(bbox.x_min < 3.0 && bbox.x_max > 3.0);
        assert!(bbox.width() <= 2.0 * tol.eps + 1e-12);
    }
}
