use itertools::Itertools;
use log::error;

use crate::entities::{Bin, Item, Layout};
use crate::kernel::{GeometryKernel, Tolerance};

//Various checks to verify correctness of the state of the system
//Used in debug_assertion!() blocks and tests

pub fn instance_item_bin_ids_correct(items: &[(Item, usize)], bins: &[Bin]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, (item, _qty))| item.id == i)
        && bins.iter().enumerate().all(|(i, bin)| bin.id == i)
}

/// Every placed item inside the bin and no two placed items overlapping, up to the tolerance
pub fn layout_is_feasible(layout: &Layout, kernel: &dyn GeometryKernel, tol: Tolerance) -> bool {
    let placed = layout.placed_items().values().collect_vec();
    for pi in placed.iter() {
        match kernel.contains(&layout.bin.shape_int, &pi.shape, tol) {
            Ok(true) => {}
            Ok(false) => {
                error!("item {} (copy {}) is not contained in its bin", pi.item_id, pi.copy);
                return false;
            }
            Err(e) => {
                error!("containment check failed: {e}");
                return false;
            }
        }
    }
    for (a, b) in placed.iter().tuple_combinations() {
        match kernel.intersects(&a.shape, &b.shape, tol) {
            Ok(false) => {}
            Ok(true) => {
                error!(
                    "items {} (copy {}) and {} (copy {}) overlap",
                    a.item_id, a.copy, b.item_id, b.copy
                );
                return false;
            }
            Err(e) => {
                error!("intersection check failed: {e}");
                return false;
            }
        }
    }
    true
}
