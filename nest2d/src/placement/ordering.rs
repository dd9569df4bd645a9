use std::cmp::Reverse;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::config::ItemOrdering;
use crate::entities::{ItemCopy, NestInstance};

/// Order in which the copies are placed in the baseline pass
pub fn initial_order(instance: &NestInstance, ordering: ItemOrdering) -> Vec<ItemCopy> {
    let copies = instance.copies();
    match ordering {
        ItemOrdering::Input => copies,
        ItemOrdering::DescendingArea => copies
            .into_iter()
            .sorted_by_key(|c| Reverse(OrderedFloat(instance.item(c.item_id).area())))
            .collect(),
        ItemOrdering::Priority => copies
            .into_iter()
            .sorted_by_key(|c| {
                let item = instance.item(c.item_id);
                (Reverse(item.priority), Reverse(OrderedFloat(item.area())))
            })
            .collect(),
    }
}

/// Random-key decoding: indices of `keys` sorted by key, ties broken by index
pub fn order_from_keys(keys: &[f64]) -> Vec<usize> {
    (0..keys.len())
        .sorted_by_key(|&i| (OrderedFloat(keys[i]), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_decode_to_a_stable_permutation() {
        assert_eq!(order_from_keys(&[0.7, 0.1, 0.7, 0.3]), vec![1, 3, 0, 2]);
        assert!(order_from_keys(&[]).is_empty());
    }
}
