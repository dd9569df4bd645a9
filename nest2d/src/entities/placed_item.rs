use std::sync::Arc;

use slotmap::new_key_type;

use crate::entities::Item;
use crate::geometry::DTransformation;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::primitives::Polygon;

#[cfg(doc)]
use crate::entities::Layout;

new_key_type! {
    /// Unique key for each [`PlacedItem`] in a layout.
    pub struct PItemKey;
}

/// Represents an [`Item`] that has been placed in a [`Layout`]
#[derive(Clone, Debug)]
pub struct PlacedItem {
    /// ID of the type of `Item` that was placed
    pub item_id: usize,
    /// Which copy of the item this is
    pub copy: usize,
    /// The transformation that was applied to the internal shape of the `Item`
    pub d_transf: DTransformation,
    /// The internal shape of the `Item` after it has been transformed and placed in a `Layout`
    pub shape: Arc<Polygon>,
}

impl PlacedItem {
    pub fn new(item: &Item, copy: usize, d_transf: DTransformation) -> Self {
        let shape = Arc::new(item.shape_int.transform_clone(&d_transf.compose()));
        PlacedItem {
            item_id: item.id,
            copy,
            d_transf,
            shape,
        }
    }
}
