use std::time::Instant;

use crate::entities::{BinStats, PlacementResult};
use crate::io::ext_repr::{ExtBinStats, ExtNestSolution, ExtPlacement, ExtRunStatus};
use crate::orchestrator::{NestingOutcome, RunStatus};

/// Converts the outcome of a run into its external representation.
///
/// * `epoch` - The instant the run was started, used to compute the run time.
pub fn export_solution(outcome: &NestingOutcome, epoch: Instant) -> ExtNestSolution {
    let (status, error) = match &outcome.status {
        RunStatus::Complete => (ExtRunStatus::Complete, None),
        RunStatus::Cancelled => (ExtRunStatus::Cancelled, None),
        RunStatus::Failed(e) => (ExtRunStatus::Failed, Some(e.to_string())),
    };
    let solution = &outcome.solution;
    ExtNestSolution {
        status,
        error,
        placements: solution.placements.iter().map(export_placement).collect(),
        bins: solution.bins.iter().map(export_bin_stats).collect(),
        fitness: solution.fitness,
        density: solution.density(),
        run_time_ms: solution
            .time_stamp
            .saturating_duration_since(epoch)
            .as_millis() as u64,
    }
}

pub fn export_placement(result: &PlacementResult) -> ExtPlacement {
    ExtPlacement {
        item_id: result.item_id,
        copy: result.copy,
        bin_idx: result.bin_idx(),
        transformation: result.transform().map(Into::into),
        failure: result.failure(),
    }
}

fn export_bin_stats(stats: &BinStats) -> ExtBinStats {
    ExtBinStats {
        bin_idx: stats.bin_idx,
        bin_id: stats.bin_id,
        n_items: stats.n_items,
        placed_area: stats.placed_area,
        bin_area: stats.bin_area,
        utilization: stats.utilization,
    }
}
