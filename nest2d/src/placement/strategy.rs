use itertools::Itertools;

use crate::config::PlacementHeuristic;
use crate::entities::{Item, Layout, NestInstance, PlacedItem};
use crate::error::KernelError;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Point, Polygon, Rect};
use crate::geometry::{DTransformation, Transformation};
use crate::nfp::{FeasibleRegion, GeoCache, NfpEngine};
use crate::placement::{ScoreKey, Scorer};
use crate::util::Executor;

/// A feasible-region vertex at which an item might be placed
#[derive(Clone, Copy, Debug)]
struct Candidate {
    key: ScoreKey,
    /// Position in the scan over all rotations and region vertices
    scan_idx: usize,
    rotation: f64,
    position: Point,
}

/// Finds the best position of a single item in a layout.
///
/// For every rotation, the nofit polygons against the placed items are subtracted from the
/// inner-fit region of the bin. The vertices of what remains are scored and verified in order.
#[derive(Debug)]
pub struct PlacementStrategy<'a> {
    pub engine: &'a NfpEngine,
    pub instance: &'a NestInstance,
    pub scorer: Scorer,
    executor: &'a Executor,
    /// Whether an item fits in an empty bin of a type, per (item id, bin id)
    fits_empty: GeoCache<(usize, usize), bool>,
}

impl<'a> PlacementStrategy<'a> {
    pub fn new(
        engine: &'a NfpEngine,
        instance: &'a NestInstance,
        scorer: Scorer,
        executor: &'a Executor,
    ) -> Self {
        Self {
            engine,
            instance,
            scorer,
            executor,
            fits_empty: GeoCache::new(),
        }
    }

    /// Best feasible placement of `item` in `layout` over `rotations`, if any exists.
    pub fn find_placement(
        &self,
        layout: &Layout,
        item: &Item,
        rotations: &[f64],
    ) -> Result<Option<DTransformation>, KernelError> {
        let placed = layout.placed_items().values().collect_vec();
        let bin_bbox = layout.bin.shape_int.bbox();
        let mut candidates = vec![];
        let mut scan_idx = 0;

        for &rotation in rotations {
            let region = self.feasible_region(layout, &placed, item, rotation)?;
            let clamp = match region.as_ref() {
                Some((_, Some(ifp_rect))) => Some(*ifp_rect),
                _ => None,
            };
            let Some((region, _)) = region else {
                continue;
            };
            let rotated_bbox = item
                .shape_int
                .transform_clone(&Transformation::from_rotation(rotation))
                .bbox();
            let mut points = region.vertices();
            if self.scorer.heuristic == PlacementHeuristic::Centered {
                //the position that centers the item in the bin, if it lies on the boundary
                let c = rotated_bbox.centroid();
                let target = Point(bin_bbox.centroid().0 - c.0, bin_bbox.centroid().1 - c.1);
                points.extend(region.nearest_points(target));
            }
            for vertex in points {
                let position = match clamp {
                    Some(r) => clamp_to(vertex, r),
                    None => vertex,
                };
                let placed_bbox = rotated_bbox.translate(position.into());
                candidates.push(Candidate {
                    key: self.scorer.score(placed_bbox, layout.pile_bbox(), bin_bbox),
                    scan_idx,
                    rotation,
                    position,
                });
                scan_idx += 1;
            }
        }

        candidates.sort_by_key(|c| (c.key, c.scan_idx));
        for c in candidates {
            let d_transf = DTransformation::new(c.rotation, c.position.into());
            if self.is_valid(layout, &placed, item, &d_transf)? {
                return Ok(Some(d_transf));
            }
        }
        Ok(None)
    }

    /// Whether `item` can be placed in an empty bin of type `bin_id` in any of `rotations`.
    /// The answer is memoized per (item, bin type).
    pub fn fits_empty_bin(
        &self,
        item: &Item,
        bin_id: usize,
        rotations: &[f64],
    ) -> Result<bool, KernelError> {
        let fits = self
            .fits_empty
            .get_or_try_insert_with((item.id, bin_id), || {
                let empty = Layout::new(self.instance.bin(bin_id).clone());
                self.find_placement(&empty, item, rotations)
                    .map(|p| p.is_some())
            })?;
        Ok(*fits)
    }

    /// The region of feasible reference point positions for a rotation.
    /// Also returns the exact inner-fit rectangle when candidates need to be clamped to it.
    fn feasible_region(
        &self,
        layout: &Layout,
        placed: &[&PlacedItem],
        item: &Item,
        rotation: f64,
    ) -> Result<Option<(FeasibleRegion, Option<Rect>)>, KernelError> {
        let ifp = self.engine.inner_fit(&layout.bin, item, rotation)?;
        if ifp.is_empty() {
            return Ok(None);
        }
        if placed.is_empty() {
            return Ok(Some((ifp.as_ref().clone(), None)));
        }

        let nfps = self.executor.map(placed, |pi| {
            let stationary = self.instance.item(pi.item_id);
            self.engine
                .item_nfp(stationary, pi.d_transf.rotation(), item, rotation)
                .map(|nfp| nfp.translated(pi.d_transf.translation()))
        });
        let obstacles = nfps
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect_vec();

        let clamp = match ifp.as_ref() {
            FeasibleRegion::Rect(r) => Some(*r),
            _ => None,
        };
        let kernel = self.engine.kernel();
        let blocked = kernel.union(&obstacles)?;
        let free = kernel.difference(&ifp.to_polygons(self.engine.tol()), &blocked)?;
        match free.is_empty() {
            true => Ok(None),
            false => Ok(Some((FeasibleRegion::Polygons(free), clamp))),
        }
    }

    fn is_valid(
        &self,
        layout: &Layout,
        placed: &[&PlacedItem],
        item: &Item,
        d_transf: &DTransformation,
    ) -> Result<bool, KernelError> {
        let kernel = self.engine.kernel();
        let tol = self.engine.tol();
        let shape: Polygon = item.shape_int.transform_clone(&d_transf.compose());
        if !kernel.contains(&layout.bin.shape_int, &shape, tol)? {
            return Ok(false);
        }
        let bbox = shape.bbox();
        for pi in placed {
            if pi.shape.bbox().collides_with(&bbox) && kernel.intersects(&pi.shape, &shape, tol)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn clamp_to(p: Point, r: Rect) -> Point {
    Point(p.0.clamp(r.x_min, r.x_max), p.1.clamp(r.y_min, r.y_max))
}
