use std::time::Instant;

use itertools::Itertools;
use log::{debug, error};

use crate::bin_manager::{BinManager, Insertion, bin_stats};
use crate::config::NestConfig;
use crate::entities::{
    ItemCopy, Layout, NestInstance, NestingSolution, PlacementFailure, PlacementOutcome,
    PlacementResult,
};
use crate::error::NestError;
use crate::io::import::int_to_ext_transformation;
use crate::orchestrator::fitness;
use crate::placement::PlacementStrategy;

/// Read-only state shared by every placement pass of a run
#[derive(Debug)]
pub struct PassContext<'a> {
    pub instance: &'a NestInstance,
    pub strategy: &'a PlacementStrategy<'a>,
    pub config: &'a NestConfig,
}

#[derive(Debug)]
pub struct PassOutcome {
    pub solution: NestingSolution,
    pub layouts: Vec<Layout>,
    /// The fatal error that ended the pass early, if any
    pub error: Option<NestError>,
}

impl PassContext<'_> {
    /// Places every copy of `plan` in order, each with an optional preferred rotation.
    ///
    /// Per-item failures are recorded and the pass moves on.
    /// A fatal error stops the pass: the copies after it are marked [`PlacementFailure::Skipped`].
    pub fn run_pass(&self, plan: &[(ItemCopy, Option<f64>)]) -> PassOutcome {
        let mut manager = BinManager::new(self.strategy, self.config);
        let mut placed: Vec<(ItemCopy, usize)> = vec![];
        let mut unplaced: Vec<(ItemCopy, PlacementFailure)> = vec![];
        let mut fatal = None;

        for (i, &(copy, rotation)) in plan.iter().enumerate() {
            match manager.insert(copy, rotation) {
                Ok(Insertion::Placed(bin_idx)) => placed.push((copy, bin_idx)),
                Ok(Insertion::Rejected(failure)) => unplaced.push((copy, failure)),
                Err(e) => {
                    error!("[PASS] stopped at copy {} of {}: {}", i, plan.len(), e);
                    unplaced.push((copy, PlacementFailure::NoFit));
                    unplaced.extend(plan[i + 1..].iter().map(|(c, _)| (*c, PlacementFailure::Skipped)));
                    fatal = Some(e);
                    break;
                }
            }
        }

        let layouts = manager.into_layouts();
        let n_no_fit = unplaced
            .iter()
            .filter(|(_, f)| *f == PlacementFailure::NoFit)
            .count();
        let fitness = fitness(n_no_fit, &layouts);
        let placements = placed
            .iter()
            .filter_map(|&(copy, bin_idx)| self.placed_result(&layouts, copy, bin_idx))
            .chain(
                unplaced
                    .iter()
                    .map(|&(copy, failure)| self.unplaced_result(copy, failure)),
            )
            .collect_vec();
        debug!(
            "[PASS] {}/{} copies placed in {} bins, fitness: {:.6}",
            placed.len(),
            plan.len(),
            layouts.len(),
            fitness
        );

        PassOutcome {
            solution: NestingSolution {
                placements,
                bins: bin_stats(&layouts, self.instance),
                fitness,
                time_stamp: Instant::now(),
            },
            layouts,
            error: fatal,
        }
    }

    fn placed_result(&self, layouts: &[Layout], copy: ItemCopy, bin_idx: usize) -> Option<PlacementResult> {
        let item = self.instance.item(copy.item_id);
        let pi = layouts[bin_idx]
            .placed_items()
            .values()
            .find(|pi| pi.item_id == copy.item_id && pi.copy == copy.copy)?;
        Some(PlacementResult {
            item_id: item.ext_id,
            copy: copy.copy,
            outcome: PlacementOutcome::Placed {
                bin_idx,
                transform: int_to_ext_transformation(&pi.d_transf, &item.shape_orig.pre_transform),
            },
        })
    }

    pub fn unplaced_result(&self, copy: ItemCopy, failure: PlacementFailure) -> PlacementResult {
        PlacementResult {
            item_id: self.instance.item(copy.item_id).ext_id,
            copy: copy.copy,
            outcome: PlacementOutcome::Unplaced(failure),
        }
    }
}
