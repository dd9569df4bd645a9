use crate::error::KernelError;
use crate::geometry::DTransformation;
use crate::geometry::geo_traits::{Shape, Transformable};
use crate::geometry::primitives::{Point, Polygon, Rect};
use crate::kernel::GeometryKernel;

#[derive(Clone, Debug)]
/// A [`Polygon`] exactly as defined in the input
///
/// Also contains all required operations to convert it to a shape that can be used internally:
/// centering (`pre_transform`) and the offset that realizes the spacing between items.
pub struct OriginalShape {
    pub shape: Polygon,
    pub pre_transform: DTransformation,
    /// Inflation (positive) applied after the pre-transform, if any
    pub offset: Option<f64>,
}

impl OriginalShape {
    pub fn convert_to_internal(&self, kernel: &dyn GeometryKernel) -> Result<Polygon, KernelError> {
        let internal = self.shape.transform_clone(&self.pre_transform.compose());
        match self.offset {
            Some(offset) if offset != 0.0 => kernel.offset(&internal, offset),
            _ => Ok(internal),
        }
    }

    pub fn centroid(&self) -> Point {
        self.shape.centroid()
    }

    pub fn area(&self) -> f64 {
        self.shape.area()
    }

    pub fn bbox(&self) -> Rect {
        self.shape.bbox()
    }

    pub fn diameter(&self) -> f64 {
        self.shape.diameter()
    }
}
