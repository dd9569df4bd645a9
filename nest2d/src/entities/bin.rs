use std::sync::Arc;

use crate::entities::OriginalShape;
use crate::error::KernelError;
use crate::geometry::primitives::{Polygon, Rect};
use crate::kernel::GeometryKernel;

/// Type of container items can be packed into
#[derive(Debug, Clone)]
pub struct Bin {
    /// Index of the bin type in the instance
    pub id: usize,
    /// Identifier of the bin type in the input
    pub ext_id: u64,
    /// Shape of the bin as defined in the input
    pub shape_orig: Arc<OriginalShape>,
    /// Shape used for placement, inflated by half the spacing
    pub shape_int: Arc<Polygon>,
    /// The number of copies of this bin available, unlimited if `None`
    pub stock: Option<usize>,
}

impl Bin {
    pub fn new(
        id: usize,
        ext_id: u64,
        original_shape: OriginalShape,
        stock: Option<usize>,
        kernel: &dyn GeometryKernel,
    ) -> Result<Self, KernelError> {
        let shape_int = match original_shape.shape.as_rect() {
            //rectangles grow exactly, no need for the kernel
            Some(r) => match original_shape.offset.and_then(|o| r.resize_by(o)) {
                Some(grown) => Polygon::from(grown),
                None => original_shape.shape.clone(),
            },
            None => original_shape.convert_to_internal(kernel)?,
        };
        Ok(Self {
            id,
            ext_id,
            shape_orig: Arc::new(original_shape),
            shape_int: Arc::new(shape_int),
            stock,
        })
    }

    /// The internal shape as a rectangle, if it is an axis-aligned rectangle without holes
    pub fn rect(&self) -> Option<Rect> {
        self.shape_int.as_rect()
    }

    pub fn area(&self) -> f64 {
        self.shape_orig.area()
    }
}
