use log::{debug, warn};

use crate::config::{BinReusePolicy, NestConfig, OverflowPolicy};
use crate::entities::{BinStats, Item, ItemCopy, Layout, NestInstance, PlacementFailure};
use crate::error::NestError;
use crate::placement::PlacementStrategy;
use crate::util::assertions;

/// Outcome of the insertion of a single item copy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// Placed in the bin with this index (in opening order)
    Placed(usize),
    Rejected(PlacementFailure),
}

/// Opens bins on demand and places item copies in them, for a single placement pass.
///
/// Bins are only ever opened, never closed. Every copy is first offered to the open bins
/// allowed by the [`BinReusePolicy`], a new bin is only opened when none of them can hold it.
#[derive(Debug)]
pub struct BinManager<'a> {
    strategy: &'a PlacementStrategy<'a>,
    reuse: BinReusePolicy,
    overflow: OverflowPolicy,
    max_bins: Option<usize>,
    n_rotation_samples: usize,
    layouts: Vec<Layout>,
    /// Number of opened bins per bin type
    n_opened: Vec<usize>,
}

impl<'a> BinManager<'a> {
    pub fn new(strategy: &'a PlacementStrategy<'a>, config: &NestConfig) -> Self {
        BinManager {
            strategy,
            reuse: config.bin_reuse,
            overflow: config.overflow,
            max_bins: config.max_bins,
            n_rotation_samples: config.continuous_rotation_samples,
            layouts: vec![],
            n_opened: vec![0; strategy.instance.bins.len()],
        }
    }

    fn instance(&self) -> &'a NestInstance {
        self.strategy.instance
    }

    /// Places `copy` in an open bin, or in a newly opened one.
    ///
    /// `preferred_rotation` restricts the rotations tried in open bins.
    /// A new bin tries it first and falls back to every allowed rotation.
    /// Fails only on [`NestError::CapacityExceeded`] and kernel errors.
    pub fn insert(
        &mut self,
        copy: ItemCopy,
        preferred_rotation: Option<f64>,
    ) -> Result<Insertion, NestError> {
        let item = self.instance().item(copy.item_id);
        let all_rotations = item.allowed_rotation.candidates(self.n_rotation_samples);
        let restricted = match preferred_rotation {
            Some(r) => vec![r],
            None => all_rotations.clone(),
        };

        let open = match self.reuse {
            BinReusePolicy::FirstFit => 0..self.layouts.len(),
            BinReusePolicy::NextFit => self.layouts.len().saturating_sub(1)..self.layouts.len(),
        };
        for bin_idx in open {
            let layout = &self.layouts[bin_idx];
            if let Some(dt) = self.strategy.find_placement(layout, item, &restricted)? {
                self.layouts[bin_idx].place_item(item, copy.copy, dt);
                debug_assert!(assertions::layout_is_feasible(
                    &self.layouts[bin_idx],
                    self.strategy.engine.kernel(),
                    self.strategy.engine.tol()
                ));
                return Ok(Insertion::Placed(bin_idx));
            }
        }

        //can the item be placed in any bin at all?
        let mut fitting_types = vec![];
        for bin in &self.instance().bins {
            if self.strategy.fits_empty_bin(item, bin.id, &all_rotations)? {
                fitting_types.push(bin.id);
            }
        }
        if fitting_types.is_empty() {
            warn!("[BIN] item {} does not fit in any empty bin", item.ext_id);
            return Ok(Insertion::Rejected(PlacementFailure::ExceedsBin));
        }
        if self.overflow == OverflowPolicy::Reject && !self.layouts.is_empty() {
            return Ok(Insertion::Rejected(PlacementFailure::NoFit));
        }
        let Some(bin_id) = fitting_types
            .into_iter()
            .find(|&id| self.has_stock(id))
        else {
            return Ok(Insertion::Rejected(PlacementFailure::NoFit));
        };
        match self.max_bins {
            Some(max_bins) if self.layouts.len() >= max_bins => {
                warn!("[BIN] bin limit of {max_bins} reached");
                return Err(NestError::CapacityExceeded { max_bins });
            }
            _ => {}
        }

        self.open_and_place(bin_id, item, copy, &restricted, &all_rotations)
    }

    fn open_and_place(
        &mut self,
        bin_id: usize,
        item: &Item,
        copy: ItemCopy,
        preferred: &[f64],
        fallback: &[f64],
    ) -> Result<Insertion, NestError> {
        let mut layout = Layout::new(self.instance().bin(bin_id).clone());
        let placement = match self.strategy.find_placement(&layout, item, preferred)? {
            Some(dt) => Some(dt),
            None => self.strategy.find_placement(&layout, item, fallback)?,
        };
        let Some(dt) = placement else {
            return Ok(Insertion::Rejected(PlacementFailure::NoFit));
        };
        layout.place_item(item, copy.copy, dt);
        self.layouts.push(layout);
        self.n_opened[bin_id] += 1;
        debug!(
            "[BIN] opened bin #{} of type {} for item {}",
            self.layouts.len() - 1,
            self.instance().bin(bin_id).ext_id,
            item.ext_id
        );
        Ok(Insertion::Placed(self.layouts.len() - 1))
    }

    fn has_stock(&self, bin_id: usize) -> bool {
        match self.instance().bin(bin_id).stock {
            Some(stock) => self.n_opened[bin_id] < stock,
            None => true,
        }
    }

    /// Open bins, in opening order
    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn into_layouts(self) -> Vec<Layout> {
        self.layouts
    }

    pub fn bin_stats(&self) -> Vec<BinStats> {
        bin_stats(&self.layouts, self.instance())
    }
}

/// Utilization of every layout, based on the original item and bin shapes
pub fn bin_stats(layouts: &[Layout], instance: &NestInstance) -> Vec<BinStats> {
    layouts
        .iter()
        .enumerate()
        .map(|(bin_idx, l)| {
            let placed_area = l.placed_item_area(instance);
            BinStats {
                bin_idx,
                bin_id: l.bin.ext_id,
                n_items: l.placed_items().len(),
                placed_area,
                bin_area: l.bin.area(),
                utilization: l.utilization(instance),
            }
        })
        .collect()
}
