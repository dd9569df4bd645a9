use geo::BooleanOps;
use geo_types::{Coord, LineString, MultiPolygon};
use itertools::Itertools;

use crate::error::{Degeneracy, KernelError};
use crate::geometry::geo_traits::Shape;
use crate::geometry::primitives::{Point, Polygon, SPolygon};
use crate::kernel::GeometryKernel;

/// [`GeometryKernel`] backed by the `geo` crate's boolean operations and `geo-buffer` offsetting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoKernel;

impl GeoKernel {
    pub fn new() -> Self {
        GeoKernel
    }
}

impl GeometryKernel for GeoKernel {
    fn union(&self, polygons: &[Polygon]) -> Result<Vec<Polygon>, KernelError> {
        from_geo_multi(union_all(polygons))
    }

    fn difference(
        &self,
        subject: &[Polygon],
        clip: &[Polygon],
    ) -> Result<Vec<Polygon>, KernelError> {
        if subject.is_empty() {
            return Ok(vec![]);
        }
        if clip.is_empty() {
            return Ok(subject.to_vec());
        }
        from_geo_multi(union_all(subject).difference(&union_all(clip)))
    }

    fn intersection(&self, a: &[Polygon], b: &[Polygon]) -> Result<Vec<Polygon>, KernelError> {
        if a.is_empty() || b.is_empty() {
            return Ok(vec![]);
        }
        from_geo_multi(union_all(a).intersection(&union_all(b)))
    }

    fn offset(&self, polygon: &Polygon, delta: f64) -> Result<Polygon, KernelError> {
        if delta == 0.0 {
            return Ok(polygon.clone());
        }
        let buffered = geo_buffer::buffer_polygon(&to_geo(polygon), delta);
        from_geo_multi(buffered)?
            .into_iter()
            .max_by(|a, b| a.area().total_cmp(&b.area()))
            .ok_or(KernelError::Degenerate(Degeneracy::ZeroArea))
    }
}

/// Balanced pairwise union, keeps every operand of a boolean operation valid
fn union_all(polygons: &[Polygon]) -> MultiPolygon<f64> {
    let mut layer = polygons
        .iter()
        .map(|p| MultiPolygon::new(vec![to_geo(p)]))
        .collect_vec();
    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => a.union(b),
                _ => pair[0].clone(),
            })
            .collect_vec();
    }
    layer.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

fn ring_to_geo(points: &[Point], ccw: bool) -> LineString<f64> {
    let coords = points.iter().map(|p| Coord { x: p.0, y: p.1 });
    match ccw {
        true => LineString::from_iter(coords),
        false => LineString::from_iter(coords.rev()),
    }
}

/// Exterior counterclockwise, interiors clockwise
fn to_geo(p: &Polygon) -> geo_types::Polygon<f64> {
    geo_types::Polygon::new(
        ring_to_geo(&p.outer.vertices, true),
        p.holes
            .iter()
            .map(|h| ring_to_geo(&h.vertices, false))
            .collect(),
    )
}

fn ring_from_geo(ls: &LineString<f64>) -> Result<Option<SPolygon>, KernelError> {
    let points = ls.coords().map(|c| Point(c.x, c.y)).collect_vec();
    if !points.iter().all(|p| p.is_finite()) {
        return Err(KernelError::Backend(
            "boolean operation produced non-finite coordinates".into(),
        ));
    }
    //rings without area are artifacts of the operation, not results
    Ok(SPolygon::new(points).ok())
}

fn from_geo_multi(mp: MultiPolygon<f64>) -> Result<Vec<Polygon>, KernelError> {
    let mut result = vec![];
    for gp in mp.0.iter() {
        let Some(outer) = ring_from_geo(gp.exterior())? else {
            continue;
        };
        let mut holes = vec![];
        for interior in gp.interiors() {
            if let Some(hole) = ring_from_geo(interior)? {
                holes.push(hole);
            }
        }
        result.push(Polygon::new(outer, holes));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::{Rect, total_area};
    use crate::kernel::Tolerance;

    fn square(x: f64, y: f64, s: f64) -> Polygon {
        Rect::try_new(x, y, x + s, y + s).unwrap().into()
    }

    #[test]
    fn union_merges_overlapping_squares() {
        let k = GeoKernel;
        let u = k.union(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]).unwrap();
        assert_eq!(u.len(), 1);
        assert!((total_area(&u) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn union_keeps_disjoint_components() {
        let k = GeoKernel;
        let u = k.union(&[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]).unwrap();
        assert_eq!(u.len(), 2);
    }

    #[test]
    fn difference_creates_hole() {
        let k = GeoKernel;
        let d = k
            .difference(&[square(0.0, 0.0, 10.0)], &[square(4.0, 4.0, 2.0)])
            .unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].holes.len(), 1);
        assert!((total_area(&d) - 96.0).abs() < 1e-9);
    }

    #[test]
    fn touching_squares_do_not_intersect() {
        let k = GeoKernel;
        let tol = Tolerance::new(1e-6, 10.0);
        let a = square(0.0, 0.0, 2.0);
        assert!(!k.intersects(&a, &square(2.0, 0.0, 2.0), tol).unwrap());
        assert!(k.intersects(&a, &square(1.0, 0.0, 2.0), tol).unwrap());
    }

    #[test]
    fn containment_with_tolerance() {
        let k = GeoKernel;
        let tol = Tolerance::new(1e-6, 10.0);
        let bin = square(0.0, 0.0, 10.0);
        assert!(k.contains(&bin, &square(0.0, 0.0, 10.0), tol).unwrap());
        assert!(k.contains(&bin, &square(3.0, 3.0, 2.0), tol).unwrap());
        assert!(!k.contains(&bin, &square(9.0, 9.0, 2.0), tol).unwrap());
    }

    #[test]
    fn offset_inflates_square() {
        let k = GeoKernel;
        let inflated = k.offset(&square(0.0, 0.0, 2.0), 1.0).unwrap();
        assert!((inflated.area() - 16.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_contour_is_reported() {
        let k = GeoKernel;
        let line = [Point(0.0, 0.0), Point(1.0, 0.0), Point(2.0, 0.0)];
        assert_eq!(k.check_degenerate(&line), Some(Degeneracy::ZeroArea));
        assert_eq!(k.check_degenerate(&square(0.0, 0.0, 1.0).outer.vertices), None);
    }
}
