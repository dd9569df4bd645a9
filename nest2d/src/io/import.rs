use itertools::Itertools;
use log::{info, warn};

use crate::config::{NestConfig, validate_rotations};
use crate::entities::{Bin, Item, NestInstance, OriginalShape};
use crate::error::{Degeneracy, KernelError, NestError};
use crate::geometry::geo_enums::RotationRange;
use crate::geometry::geo_traits::Shape;
use crate::geometry::primitives::{Point, Polygon, Rect, SPolygon};
use crate::geometry::{DTransformation, Transformation};
use crate::io::ext_repr::{ExtBin, ExtItem, ExtNestInput, ExtSPolygon, ExtShape};
use crate::kernel::GeometryKernel;

/// An item of the input that was excluded because its shape is unusable
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RejectedItem {
    pub ext_id: u64,
    pub quantity: usize,
    pub reason: Degeneracy,
}

/// Converts external representations of items and bins into internal ones.
#[derive(Clone, Copy, Debug)]
pub struct Importer<'a> {
    kernel: &'a dyn GeometryKernel,
    /// Inflation applied to every item and bin: half the spacing
    offset: Option<f64>,
    default_rotations: &'a RotationRange,
}

impl<'a> Importer<'a> {
    pub fn new(kernel: &'a dyn GeometryKernel, config: &'a NestConfig) -> Self {
        Importer {
            kernel,
            offset: (config.spacing > 0.0).then_some(config.spacing / 2.0),
            default_rotations: &config.allowed_rotations,
        }
    }

    /// Imports the bins and every usable item.
    /// Degenerate items are returned separately, any problem with the bins is fatal.
    pub fn import_instance(
        &self,
        ext: &ExtNestInput,
    ) -> Result<(NestInstance, Vec<RejectedItem>), NestError> {
        if ext.bins.is_empty() {
            return Err(NestError::Configuration("no bins supplied".into()));
        }
        let bins = ext
            .bins
            .iter()
            .enumerate()
            .map(|(id, ext_bin)| self.import_bin(id, ext_bin))
            .collect::<Result<Vec<Bin>, NestError>>()?;

        let mut items = vec![];
        let mut rejected = vec![];
        for ext_item in &ext.items {
            match self.import_item(items.len(), ext_item) {
                Ok(item) => items.push((item, ext_item.quantity)),
                Err(NestError::DegenerateGeometry { reason, .. }) => {
                    warn!("[IMPORT] item {} rejected: {}", ext_item.id, reason);
                    rejected.push(RejectedItem {
                        ext_id: ext_item.id,
                        quantity: ext_item.quantity,
                        reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            "[IMPORT] {} item types ({} copies), {} bin types, {} rejected",
            items.len(),
            items.iter().map(|(_, q)| q).sum::<usize>(),
            bins.len(),
            rejected.len()
        );
        Ok((NestInstance::new(items, bins), rejected))
    }

    pub fn import_item(&self, id: usize, ext_item: &ExtItem) -> Result<Item, NestError> {
        let context = || format!("item {}", ext_item.id);
        let shape = import_shape(&ext_item.shape).map_err(|reason| {
            NestError::DegenerateGeometry {
                context: context(),
                reason,
            }
        })?;
        let allowed_rotation = match ext_item.allowed_rotations.as_ref() {
            Some(angles) => {
                let range = match angles.is_empty() || angles.iter().all(|a| *a == 0.0) {
                    true => RotationRange::None,
                    false => RotationRange::Discrete(angles.iter().map(|a| a.to_radians()).collect()),
                };
                validate_rotations(&range)?;
                range
            }
            None => self.default_rotations.clone(),
        };
        let original_shape = OriginalShape {
            pre_transform: centering_transformation(&shape),
            shape,
            offset: self.offset,
        };
        Item::new(
            id,
            ext_item.id,
            original_shape,
            allowed_rotation,
            ext_item.priority,
            self.kernel,
        )
        .map_err(|e| lift_kernel_error(e, context()))
    }

    pub fn import_bin(&self, id: usize, ext_bin: &ExtBin) -> Result<Bin, NestError> {
        let context = || format!("bin {}", ext_bin.id);
        let shape = import_shape(&ext_bin.shape).map_err(|reason| {
            NestError::DegenerateGeometry {
                context: context(),
                reason,
            }
        })?;
        let original_shape = OriginalShape {
            shape,
            pre_transform: DTransformation::empty(),
            offset: self.offset,
        };
        Bin::new(id, ext_bin.id, original_shape, ext_bin.stock, self.kernel)
        .map_err(|e| lift_kernel_error(e, context()))
    }
}

fn lift_kernel_error(e: KernelError, context: String) -> NestError {
    match e {
        KernelError::Degenerate(reason) => NestError::DegenerateGeometry { context, reason },
        e => NestError::Kernel(e),
    }
}

/// Converts and validates a shape: every contour simple, holes inside the outer boundary
pub fn import_shape(ext_shape: &ExtShape) -> Result<Polygon, Degeneracy> {
    let polygon = match ext_shape {
        ExtShape::Rectangle {
            x_min,
            y_min,
            width,
            height,
        } => Rect::try_new(*x_min, *y_min, x_min + width, y_min + height)?.into(),
        ExtShape::SimplePolygon(esp) => Polygon::from(import_simple_polygon(esp)?),
        ExtShape::Polygon(ep) => Polygon::new(
            import_simple_polygon(&ep.outer)?,
            ep.inner
                .iter()
                .map(import_simple_polygon)
                .collect::<Result<Vec<SPolygon>, Degeneracy>>()?,
        ),
    };
    polygon.validate()?;
    Ok(polygon)
}

pub fn import_simple_polygon(sp: &ExtSPolygon) -> Result<SPolygon, Degeneracy> {
    let points = sp.0.iter().map(|(x, y)| Point(*x, *y)).collect_vec();
    SPolygon::new(points)
}

/// Returns a transformation that translates the shape's centroid to the origin.
pub fn centering_transformation(shape: &Polygon) -> DTransformation {
    let Point(cx, cy) = shape.centroid();
    DTransformation::new(0.0, (-cx, -cy))
}

/// Converts an internal transformation (applied to the centered shape) to an external
/// transformation (applicable to the shape as defined in the input).
///
/// * `int_transf` - The internal transformation.
/// * `pre_transf` - The transformation that was applied to the original shape to derive the internal representation.
pub fn int_to_ext_transformation(
    int_transf: &DTransformation,
    pre_transf: &DTransformation,
) -> DTransformation {
    //1. apply the pre-transform
    //2. apply the internal transformation
    Transformation::empty()
        .transform_from_decomposed(pre_transf)
        .transform_from_decomposed(int_transf)
        .decompose()
}
