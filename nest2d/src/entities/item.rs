use std::sync::Arc;

use crate::error::KernelError;
use crate::entities::OriginalShape;
use crate::geometry::decomposition::convex_decomposition;
use crate::geometry::geo_enums::RotationRange;
use crate::geometry::primitives::{Polygon, SPolygon};
use crate::kernel::GeometryKernel;

/// Part to be placed.
#[derive(Clone, Debug)]
pub struct Item {
    /// Index of the item in the instance
    pub id: usize,
    /// Identifier of the item in the input
    pub ext_id: u64,
    /// Contour of the item as defined in the input
    pub shape_orig: Arc<OriginalShape>,
    /// Contour used for placement: centered on its centroid and inflated by half the spacing
    pub shape_int: Arc<Polygon>,
    /// Convex pieces of the outer contour of `shape_int`, shared by every rotation
    pub convex_parts: Arc<Vec<SPolygon>>,
    /// Possible rotations in which to place the item
    pub allowed_rotation: RotationRange,
    /// Items with a higher priority are placed first
    pub priority: i32,
}

impl Item {
    pub fn new(
        id: usize,
        ext_id: u64,
        original_shape: OriginalShape,
        allowed_rotation: RotationRange,
        priority: i32,
        kernel: &dyn GeometryKernel,
    ) -> Result<Item, KernelError> {
        let shape_int = original_shape.convert_to_internal(kernel)?;
        let convex_parts = convex_decomposition(&shape_int.outer);
        Ok(Item {
            id,
            ext_id,
            shape_orig: Arc::new(original_shape),
            shape_int: Arc::new(shape_int),
            convex_parts: Arc::new(convex_parts),
            allowed_rotation,
            priority,
        })
    }

    /// Area of the item as defined in the input
    pub fn area(&self) -> f64 {
        self.shape_orig.area()
    }
}
