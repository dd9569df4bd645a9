use std::fmt::Debug;
use std::slice;

use crate::error::{Degeneracy, KernelError};
use crate::geometry::Transformation;
use crate::geometry::geo_enums::GeoRelation;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Point, Polygon, Rect, SPolygon, total_area};

mod geo_kernel;

#[doc(inline)]
pub use geo_kernel::GeoKernel;

/// Absolute numeric tolerance of a nesting run.
///
/// Two coordinates closer than `eps` are considered equal.
/// It is derived from a relative epsilon and the characteristic length of the bins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub fn new(relative_eps: f64, characteristic_length: f64) -> Self {
        Tolerance {
            eps: relative_eps * characteristic_length,
        }
    }

    /// Overlap (in area) between `p` and `q` that is attributed to floating point error
    pub fn area_slack(&self, p: &Polygon, q: &Polygon) -> f64 {
        self.eps * (p.diameter() + q.diameter())
    }

    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }
}

/// Capability set of a 2D geometry kernel.
///
/// Everything above this layer (nofit polygons, placement, bins) only depends on this interface.
/// Implementations must be deterministic: identical inputs produce identical outputs.
/// Boolean operations return sets of polygons, empty when the result has no area.
pub trait GeometryKernel: Send + Sync + Debug {
    /// Union of all `polygons`
    fn union(&self, polygons: &[Polygon]) -> Result<Vec<Polygon>, KernelError>;

    /// Everything in `subject` that is not in `clip`
    fn difference(
        &self,
        subject: &[Polygon],
        clip: &[Polygon],
    ) -> Result<Vec<Polygon>, KernelError>;

    /// Everything in both `a` and `b`
    fn intersection(&self, a: &[Polygon], b: &[Polygon]) -> Result<Vec<Polygon>, KernelError>;

    /// Inflates (`delta > 0`) or deflates (`delta < 0`) a polygon by `delta`.
    fn offset(&self, polygon: &Polygon, delta: f64) -> Result<Polygon, KernelError>;

    fn area(&self, polygon: &Polygon) -> f64 {
        polygon.area()
    }

    fn bounding_box(&self, polygon: &Polygon) -> Rect {
        polygon.bbox()
    }

    fn translate(&self, polygon: &Polygon, v: (f64, f64)) -> Polygon {
        polygon.translate(v)
    }

    /// Rotates `polygon` by `angle` (radians, counterclockwise) around `pivot`
    fn rotate(&self, polygon: &Polygon, angle: f64, pivot: Point) -> Polygon {
        polygon.transform_clone(&Transformation::from_rotation_around(angle, pivot.into()))
    }

    /// Returns why `contour` cannot be used as a polygon contour, if it cannot.
    fn check_degenerate(&self, contour: &[Point]) -> Option<Degeneracy> {
        SPolygon::new(contour.to_vec())
            .and_then(|p| p.validate_simple())
            .err()
    }

    /// Whether the interiors of `p` and `q` overlap by more than the tolerance allows
    fn intersects(&self, p: &Polygon, q: &Polygon, tol: Tolerance) -> Result<bool, KernelError> {
        let (bp, bq) = (p.bbox(), q.bbox());
        let shrunk = bp.resize_by(-tol.eps);
        match shrunk {
            Some(bp) if bp.collides_with(&bq) => {}
            _ => return Ok(false),
        }
        let overlap = self.intersection(slice::from_ref(p), slice::from_ref(q))?;
        Ok(total_area(&overlap) > tol.area_slack(p, q))
    }

    /// Whether `inner` lies within `outer`, up to the tolerance
    fn contains(&self, outer: &Polygon, inner: &Polygon, tol: Tolerance) -> Result<bool, KernelError> {
        let Some(grown) = outer.bbox().resize_by(tol.eps) else {
            return Ok(false);
        };
        if grown.relation_to(inner.bbox()) != GeoRelation::Surrounding {
            return Ok(false);
        }
        let protrusion = self.difference(slice::from_ref(inner), slice::from_ref(outer))?;
        Ok(total_area(&protrusion) <= tol.area_slack(outer, inner))
    }
}
