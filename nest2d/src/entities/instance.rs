use itertools::Itertools;

use crate::entities::{Bin, Item};
use crate::util::assertions;

/// One copy of an item with a demand larger than one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCopy {
    pub item_id: usize,
    pub copy: usize,
}

/// Validated, internal representation of a nesting problem
#[derive(Debug, Clone)]
pub struct NestInstance {
    /// Items to be placed, with their quantities
    pub items: Vec<(Item, usize)>,
    /// Bin types that can be opened
    pub bins: Vec<Bin>,
}

impl NestInstance {
    pub fn new(items: Vec<(Item, usize)>, bins: Vec<Bin>) -> Self {
        debug_assert!(assertions::instance_item_bin_ids_correct(&items, &bins));
        NestInstance { items, bins }
    }

    pub fn item(&self, id: usize) -> &Item {
        &self.items[id].0
    }

    pub fn bin(&self, id: usize) -> &Bin {
        &self.bins[id]
    }

    pub fn item_qty(&self, id: usize) -> usize {
        self.items[id].1
    }

    pub fn total_item_qty(&self) -> usize {
        self.items.iter().map(|(_, qty)| qty).sum()
    }

    /// Every copy of every item, grouped per item in instance order
    pub fn copies(&self) -> Vec<ItemCopy> {
        self.items
            .iter()
            .flat_map(|(item, qty)| (0..*qty).map(|copy| ItemCopy { item_id: item.id, copy }))
            .collect_vec()
    }

    /// Largest diameter among the bin types, the scale of all tolerances
    pub fn characteristic_length(&self) -> f64 {
        self.bins
            .iter()
            .map(|b| b.shape_orig.diameter())
            .fold(0.0, f64::max)
    }
}
