use std::sync::Arc;

use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;
use thousands::Separable;

use crate::entities::{Bin, Item};
use crate::error::KernelError;
use crate::geometry::Transformation;
use crate::geometry::decomposition::convex_decomposition;
use crate::geometry::geo_traits::{Shape, Transformable};
use crate::geometry::primitives::{Polygon, Rect, SPolygon};
use crate::kernel::{GeometryKernel, Tolerance};
use crate::nfp::{
    FeasibleRegion, IfpCache, IfpKey, NfpCache, NfpKey, NofitPolygon, convex_nfp,
};

/// Margin (relative to the diameter of the container) of the frame used to invert a container
const FRAME_MARGIN: f64 = 0.05;

/// Builds nofit polygons and inner-fit regions on top of a [`GeometryKernel`].
///
/// Results for items are translation-free and memoized, so they are shared by every
/// placement pass and optimizer trial of a run.
#[derive(Debug)]
pub struct NfpEngine {
    kernel: Arc<dyn GeometryKernel>,
    tol: Tolerance,
    nfp_cache: NfpCache<NofitPolygon>,
    ifp_cache: IfpCache<FeasibleRegion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub nfp_entries: usize,
    pub nfp_hits: usize,
    pub nfp_misses: usize,
    pub ifp_entries: usize,
    pub ifp_hits: usize,
    pub ifp_misses: usize,
}

impl NfpEngine {
    pub fn new(kernel: Arc<dyn GeometryKernel>, tol: Tolerance) -> Self {
        Self {
            kernel,
            tol,
            nfp_cache: NfpCache::new(),
            ifp_cache: IfpCache::new(),
        }
    }

    pub fn kernel(&self) -> &dyn GeometryKernel {
        self.kernel.as_ref()
    }

    pub fn tol(&self) -> Tolerance {
        self.tol
    }

    /// Nofit polygon of `orbiting` around `stationary`, both in their current position.
    ///
    /// The reference point of `orbiting` is its origin.
    /// Holes of `stationary` in which `orbiting` fits show up as holes of the result.
    pub fn compute_nfp(
        &self,
        stationary: &Polygon,
        orbiting: &Polygon,
    ) -> Result<NofitPolygon, KernelError> {
        let s_parts = convex_decomposition(&stationary.outer);
        let o_parts = convex_decomposition(&orbiting.outer);
        self.nfp_of_parts(&s_parts, &stationary.holes, &orbiting.outer, &o_parts)
    }

    /// Reference point positions for which `orbiting` lies inside `container`
    /// (and outside its holes).
    pub fn compute_ifp(
        &self,
        container: &Polygon,
        orbiting: &Polygon,
    ) -> Result<FeasibleRegion, KernelError> {
        let o_parts = convex_decomposition(&orbiting.outer);
        self.ifp_of_contour(&container.outer, &container.holes, &orbiting.outer, &o_parts)
    }

    /// Cached nofit polygon of two items, `stationary` rotated around its reference point
    /// but not translated.
    pub fn item_nfp(
        &self,
        stationary: &Item,
        stationary_rotation: f64,
        orbiting: &Item,
        orbiting_rotation: f64,
    ) -> Result<Arc<NofitPolygon>, KernelError> {
        let key = NfpKey {
            stationary_id: stationary.id,
            stationary_rotation: OrderedFloat(stationary_rotation),
            orbiting_id: orbiting.id,
            orbiting_rotation: OrderedFloat(orbiting_rotation),
        };
        self.nfp_cache.get_or_try_insert_with(key, || {
            let s_rot = Transformation::from_rotation(stationary_rotation);
            let o_rot = Transformation::from_rotation(orbiting_rotation);
            let s_parts = rotate_all(&stationary.convex_parts, &s_rot);
            let s_holes = rotate_all(&stationary.shape_int.holes, &s_rot);
            let o_parts = rotate_all(&orbiting.convex_parts, &o_rot);
            let o_outer = orbiting.shape_int.outer.transform_clone(&o_rot);
            self.nfp_of_parts(&s_parts, &s_holes, &o_outer, &o_parts)
        })
    }

    /// Cached inner-fit region of a rotated item in a bin
    pub fn inner_fit(
        &self,
        bin: &Bin,
        item: &Item,
        rotation: f64,
    ) -> Result<Arc<FeasibleRegion>, KernelError> {
        let key = IfpKey {
            bin_id: bin.id,
            item_id: item.id,
            rotation: OrderedFloat(rotation),
        };
        self.ifp_cache.get_or_try_insert_with(key, || {
            let rot = Transformation::from_rotation(rotation);
            let o_parts = rotate_all(&item.convex_parts, &rot);
            let o_outer = item.shape_int.outer.transform_clone(&rot);
            self.ifp_of_contour(
                &bin.shape_int.outer,
                &bin.shape_int.holes,
                &o_outer,
                &o_parts,
            )
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (nfp_hits, nfp_misses) = self.nfp_cache.stats();
        let (ifp_hits, ifp_misses) = self.ifp_cache.stats();
        CacheStats {
            nfp_entries: self.nfp_cache.len(),
            nfp_hits,
            nfp_misses,
            ifp_entries: self.ifp_cache.len(),
            ifp_hits,
            ifp_misses,
        }
    }

    pub fn log_cache_stats(&self) {
        let s = self.cache_stats();
        debug!(
            "[NFP] cache: {} nfps ({} hits, {} misses), {} ifps ({} hits, {} misses)",
            s.nfp_entries.separate_with_commas(),
            s.nfp_hits.separate_with_commas(),
            s.nfp_misses.separate_with_commas(),
            s.ifp_entries.separate_with_commas(),
            s.ifp_hits.separate_with_commas(),
            s.ifp_misses.separate_with_commas()
        );
    }

    fn nfp_of_parts(
        &self,
        s_parts: &[SPolygon],
        s_holes: &[SPolygon],
        o_outer: &SPolygon,
        o_parts: &[SPolygon],
    ) -> Result<NofitPolygon, KernelError> {
        let traces = convex_traces(s_parts, o_parts);
        if traces.is_empty() {
            return Ok(NofitPolygon::default());
        }
        let mut regions = match traces.len() {
            1 => traces,
            _ => self.kernel.union(&traces)?,
        };
        for hole in s_holes {
            let cavity = self
                .ifp_of_contour(hole, &[], o_outer, o_parts)?
                .to_polygons(self.tol);
            if !cavity.is_empty() {
                regions = self.kernel.difference(&regions, &cavity)?;
            }
        }
        Ok(NofitPolygon { regions })
    }

    fn ifp_of_contour(
        &self,
        container: &SPolygon,
        holes: &[SPolygon],
        o_outer: &SPolygon,
        o_parts: &[SPolygon],
    ) -> Result<FeasibleRegion, KernelError> {
        let Some(rect_ifp) = rect_ifp(container.bbox(), o_outer.bbox(), self.tol) else {
            return Ok(FeasibleRegion::Empty);
        };
        let is_rect = container.as_axis_aligned_rect().is_some();
        if is_rect && holes.is_empty() {
            return Ok(FeasibleRegion::Rect(rect_ifp));
        }

        let mut obstacles = vec![];
        if !is_rect {
            for piece in self.inverted_pieces(container)? {
                let parts = convex_decomposition(&piece.outer);
                obstacles.extend(convex_traces(&parts, o_parts));
            }
        }
        for hole in holes {
            let parts = convex_decomposition(hole);
            obstacles.extend(convex_traces(&parts, o_parts));
        }

        let base = FeasibleRegion::Rect(rect_ifp).to_polygons(self.tol);
        let free = match obstacles.is_empty() {
            true => base,
            false => {
                let blocked = self.kernel.union(&obstacles)?;
                self.kernel.difference(&base, &blocked)?
            }
        };
        match free.is_empty() {
            true => Ok(FeasibleRegion::Empty),
            false => Ok(FeasibleRegion::Polygons(free)),
        }
    }

    /// Hole-free pieces of the region between `container` and a frame around it.
    ///
    /// The ring-shaped complement is cut vertically through the center of the container.
    /// Holes a piece might still have (cut through a single point) are filled, which only
    /// removes positions.
    fn inverted_pieces(&self, container: &SPolygon) -> Result<Vec<Polygon>, KernelError> {
        let bbox = container.bbox();
        let margin = FRAME_MARGIN * container.diameter() + self.tol.eps;
        let Some(frame) = bbox.resize_by(margin) else {
            return Ok(vec![]);
        };
        let complement = self
            .kernel
            .difference(&[Polygon::from(frame)], &[Polygon::from(container.clone())])?;
        let x_cut = bbox.centroid().x();
        let halves = [
            Rect::try_new(frame.x_min, frame.y_min, x_cut, frame.y_max),
            Rect::try_new(x_cut, frame.y_min, frame.x_max, frame.y_max),
        ];
        let mut pieces = vec![];
        for half in halves.into_iter().flatten() {
            let clipped = self
                .kernel
                .intersection(&complement, &[Polygon::from(half)])?;
            pieces.extend(clipped.into_iter().map(|p| Polygon::from(p.outer)));
        }
        Ok(pieces)
    }
}

/// Positions of the reference point of an item with bounding box `orbiting` for which
/// the bounding box lies inside `container`.
/// Bounds that cross by less than the tolerance are collapsed.
fn rect_ifp(container: Rect, orbiting: Rect, tol: Tolerance) -> Option<Rect> {
    let collapse = |lo: f64, hi: f64| -> Option<(f64, f64)> {
        if lo <= hi {
            Some((lo, hi))
        } else if lo - hi <= tol.eps {
            let mid = (lo + hi) / 2.0;
            Some((mid, mid))
        } else {
            None
        }
    };
    let (x_min, x_max) = collapse(
        container.x_min - orbiting.x_min,
        container.x_max - orbiting.x_max,
    )?;
    let (y_min, y_max) = collapse(
        container.y_min - orbiting.y_min,
        container.y_max - orbiting.y_max,
    )?;
    Some(Rect {
        x_min,
        y_min,
        x_max,
        y_max,
    })
}

fn convex_traces(s_parts: &[SPolygon], o_parts: &[SPolygon]) -> Vec<Polygon> {
    s_parts
        .iter()
        .cartesian_product(o_parts)
        .filter_map(|(s, o)| convex_nfp(s, o))
        .map(Polygon::from)
        .collect_vec()
}

fn rotate_all(shapes: &[SPolygon], t: &Transformation) -> Vec<SPolygon> {
    shapes.iter().map(|s| s.transform_clone(t)).collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OriginalShape;
    use crate::geometry::DTransformation;
    use crate::geometry::geo_enums::RotationRange;
    use crate::geometry::geo_traits::CollidesWith;
    use crate::geometry::primitives::{Point, total_area};
    use crate::kernel::GeoKernel;
    use std::f64::consts::FRAC_PI_2;

    fn engine() -> NfpEngine {
        NfpEngine::new(Arc::new(GeoKernel::new()), Tolerance::new(1e-6, 10.0))
    }

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        Rect::try_new(x0, y0, x0 + size, y0 + size).unwrap().into()
    }

    fn l_shape() -> Polygon {
        Polygon::from_contours(
            vec![
                Point(0.0, 0.0),
                Point(4.0, 0.0),
                Point(4.0, 1.0),
                Point(1.0, 1.0),
                Point(1.0, 4.0),
                Point(0.0, 4.0),
            ],
            vec![],
        )
        .unwrap()
    }

    fn item(id: usize, shape: Polygon) -> Item {
        let orig = OriginalShape {
            shape,
            pre_transform: DTransformation::empty(),
            offset: None,
        };
        Item::new(id, id as u64, orig, RotationRange::None, 0, &GeoKernel::new()).unwrap()
    }

    #[test]
    fn nfp_of_squares() {
        let nfp = engine()
            .compute_nfp(&square(0.0, 0.0, 2.0), &square(-0.5, -0.5, 1.0))
            .unwrap();
        assert_eq!(nfp.regions.len(), 1);
        assert!((total_area(&nfp.regions) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn nfp_of_concave_shape_keeps_its_notch() {
        let nfp = engine()
            .compute_nfp(&l_shape(), &square(0.0, 0.0, 0.5))
            .unwrap();
        //the orbiting square fits in the notch of the L, so the NFP cannot cover it
        assert!(!nfp.regions[0].collides_with(&Point(2.5, 2.5)));
        assert!(nfp.regions[0].collides_with(&Point(0.5, 0.5)));
    }

    #[test]
    fn hole_becomes_cavity() {
        let ring = Polygon::from_contours(
            Rect::try_new(0.0, 0.0, 10.0, 10.0).unwrap().corners().to_vec(),
            vec![Rect::try_new(2.0, 2.0, 8.0, 8.0).unwrap().corners().to_vec()],
        )
        .unwrap();
        let nfp = engine().compute_nfp(&ring, &square(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(nfp.regions.len(), 1);
        assert_eq!(nfp.regions[0].holes.len(), 1);
        assert!(!nfp.regions[0].collides_with(&Point(4.0, 4.0)));
    }

    #[test]
    fn rect_ifp_closed_form() {
        let ifp = engine()
            .compute_ifp(&square(0.0, 0.0, 10.0), &square(-2.0, -2.0, 4.0))
            .unwrap();
        assert_eq!(
            ifp,
            FeasibleRegion::Rect(Rect::try_new(2.0, 2.0, 8.0, 8.0).unwrap())
        );
    }

    #[test]
    fn exact_fit_collapses_to_a_point() {
        let ifp = engine()
            .compute_ifp(&square(0.0, 0.0, 10.0), &square(0.0, 0.0, 10.0))
            .unwrap();
        let FeasibleRegion::Rect(r) = ifp else {
            panic!("expected a rectangle, got {ifp:?}")
        };
        assert_eq!((r.width(), r.height()), (0.0, 0.0));
    }

    #[test]
    fn too_large_is_empty() {
        let ifp = engine()
            .compute_ifp(&square(0.0, 0.0, 10.0), &square(0.0, 0.0, 11.0))
            .unwrap();
        assert!(ifp.is_empty());
    }

    #[test]
    fn ifp_of_l_shaped_container() {
        let container = Polygon::from_contours(
            vec![
                Point(0.0, 0.0),
                Point(10.0, 0.0),
                Point(10.0, 4.0),
                Point(4.0, 4.0),
                Point(4.0, 10.0),
                Point(0.0, 10.0),
            ],
            vec![],
        )
        .unwrap();
        let ifp = engine()
            .compute_ifp(&container, &square(-1.0, -1.0, 2.0))
            .unwrap();
        let polys = ifp.to_polygons(Tolerance::new(1e-6, 10.0));
        assert!(!polys.is_empty());
        let inside = |p: Point| polys.iter().any(|poly| poly.collides_with(&p));
        assert!(inside(Point(1.0, 1.0)));
        assert!(inside(Point(8.5, 2.0)));
        assert!(inside(Point(2.0, 8.5)));
        assert!(!inside(Point(8.0, 8.0)));
    }

    #[test]
    fn item_nfps_are_cached_per_rotation() {
        let e = engine();
        let (a, b) = (item(0, square(-1.0, -1.0, 2.0)), item(1, l_shape()));
        e.item_nfp(&a, 0.0, &b, 0.0).unwrap();
        e.item_nfp(&a, 0.0, &b, 0.0).unwrap();
        e.item_nfp(&a, 0.0, &b, FRAC_PI_2).unwrap();
        let stats = e.cache_stats();
        assert_eq!(stats.nfp_entries, 2);
        assert_eq!((stats.nfp_hits, stats.nfp_misses), (1, 2));
    }
}
