use slotmap::SlotMap;

use crate::entities::{Bin, Item, NestInstance, PItemKey, PlacedItem};
use crate::error::KernelError;
use crate::geometry::DTransformation;
use crate::geometry::geo_traits::Shape;
use crate::geometry::primitives::{Polygon, Rect};
use crate::kernel::GeometryKernel;

/// A bin in use: its container together with the items placed inside it.
#[derive(Clone, Debug)]
pub struct Layout {
    /// The bin type this layout is an instance of
    pub bin: Bin,
    placed_items: SlotMap<PItemKey, PlacedItem>,
    /// Bounding box of all placed (internal) shapes
    pile_bbox: Option<Rect>,
}

impl Layout {
    pub fn new(bin: Bin) -> Self {
        Layout {
            bin,
            placed_items: SlotMap::with_key(),
            pile_bbox: None,
        }
    }

    pub fn place_item(&mut self, item: &Item, copy: usize, d_transf: DTransformation) -> PItemKey {
        let placed = PlacedItem::new(item, copy, d_transf);
        let bbox = placed.shape.bbox();
        self.pile_bbox = Some(match self.pile_bbox {
            Some(pile) => Rect::bounding_rect(pile, bbox),
            None => bbox,
        });
        self.placed_items.insert(placed)
    }

    /// Placed items in order of placement
    pub fn placed_items(&self) -> &SlotMap<PItemKey, PlacedItem> {
        &self.placed_items
    }

    pub fn is_empty(&self) -> bool {
        self.placed_items.is_empty()
    }

    pub fn pile_bbox(&self) -> Option<Rect> {
        self.pile_bbox
    }

    /// Sum of the original areas of the placed items
    pub fn placed_item_area(&self, instance: &NestInstance) -> f64 {
        self.placed_items
            .values()
            .map(|pi| instance.item(pi.item_id).area())
            .sum()
    }

    /// Placed item area divided by the bin area
    pub fn utilization(&self, instance: &NestInstance) -> f64 {
        self.placed_item_area(instance) / self.bin.area()
    }

    /// The part of the (internal) bin not covered by any placed item
    pub fn free_region(&self, kernel: &dyn GeometryKernel) -> Result<Vec<Polygon>, KernelError> {
        let placed = self
            .placed_items
            .values()
            .map(|pi| pi.shape.as_ref().clone())
            .collect::<Vec<_>>();
        kernel.difference(std::slice::from_ref(&self.bin.shape_int), &placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OriginalShape;
    use crate::geometry::geo_enums::RotationRange;
    use crate::geometry::primitives::total_area;
    use crate::kernel::GeoKernel;

    fn shape(w: f64, h: f64) -> OriginalShape {
        OriginalShape {
            shape: Rect::try_new(0.0, 0.0, w, h).unwrap().into(),
            pre_transform: DTransformation::empty(),
            offset: None,
        }
    }

    #[test]
    fn pile_and_free_region_follow_placements() {
        let kernel = GeoKernel::new();
        let item = Item::new(0, 0, shape(2.0, 2.0), RotationRange::None, 0, &kernel).unwrap();
        let bin = Bin::new(0, 0, shape(10.0, 4.0), None, &kernel).unwrap();
        let instance = NestInstance::new(vec![(item.clone(), 2)], vec![bin.clone()]);

        let mut layout = Layout::new(bin);
        assert!(layout.is_empty());
        assert_eq!(layout.pile_bbox(), None);
        layout.place_item(&item, 0, DTransformation::empty());
        layout.place_item(&item, 1, DTransformation::new(0.0, (2.0, 2.0)));

        assert_eq!(layout.placed_items().len(), 2);
        assert_eq!(layout.pile_bbox(), Rect::try_new(0.0, 0.0, 4.0, 4.0).ok());
        assert!((layout.utilization(&instance) - 0.2).abs() < 1e-12);

        let free = layout.free_region(&kernel).unwrap();
        assert!((total_area(&free) - 32.0).abs() < 1e-9);
    }
}
