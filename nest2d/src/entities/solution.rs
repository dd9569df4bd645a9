use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::geometry::DTransformation;

/// Why an item copy ended up without a placement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementFailure {
    /// No open bin had room and no new bin could be opened
    NoFit,
    /// The item does not fit in an empty bin of any type
    ExceedsBin,
    /// The item's input polygon was rejected
    DegenerateGeometry,
    /// The run ended (cancelled or capacity exceeded) before the item was attempted
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlacementOutcome {
    Placed {
        /// Index of the bin (in opening order) the item was placed in
        bin_idx: usize,
        /// Maps the item as defined in the input onto its placed position
        transform: DTransformation,
    },
    Unplaced(PlacementFailure),
}

/// Result of the placement of a single item copy
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementResult {
    /// Identifier of the item in the input
    pub item_id: u64,
    pub copy: usize,
    pub outcome: PlacementOutcome,
}

impl PlacementResult {
    pub fn is_feasible(&self) -> bool {
        matches!(self.outcome, PlacementOutcome::Placed { .. })
    }

    pub fn bin_idx(&self) -> Option<usize> {
        match self.outcome {
            PlacementOutcome::Placed { bin_idx, .. } => Some(bin_idx),
            PlacementOutcome::Unplaced(_) => None,
        }
    }

    pub fn transform(&self) -> Option<DTransformation> {
        match self.outcome {
            PlacementOutcome::Placed { transform, .. } => Some(transform),
            PlacementOutcome::Unplaced(_) => None,
        }
    }

    pub fn failure(&self) -> Option<PlacementFailure> {
        match self.outcome {
            PlacementOutcome::Placed { .. } => None,
            PlacementOutcome::Unplaced(f) => Some(f),
        }
    }
}

/// Usage statistics of a single opened bin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinStats {
    /// Index of the bin in opening order
    pub bin_idx: usize,
    /// Identifier of the bin type in the input
    pub bin_id: u64,
    pub n_items: usize,
    pub placed_area: f64,
    pub bin_area: f64,
    /// `placed_area / bin_area`
    pub utilization: f64,
}

/// Outcome of a placement pass: every item copy's result plus per-bin statistics
#[derive(Clone, Debug)]
pub struct NestingSolution {
    /// Placed copies in order of placement, followed by the unplaced ones
    pub placements: Vec<PlacementResult>,
    pub bins: Vec<BinStats>,
    /// Objective value of the pass that produced this solution, lower is better
    pub fitness: f64,
    /// Instant the solution was created
    pub time_stamp: Instant,
}

impl NestingSolution {
    pub fn empty() -> Self {
        NestingSolution {
            placements: vec![],
            bins: vec![],
            fitness: 0.0,
            time_stamp: Instant::now(),
        }
    }

    pub fn n_placed(&self) -> usize {
        self.placements.iter().filter(|p| p.is_feasible()).count()
    }

    pub fn unplaced(&self) -> impl Iterator<Item = &PlacementResult> {
        self.placements.iter().filter(|p| !p.is_feasible())
    }

    /// Total placed area divided by total area of the opened bins
    pub fn density(&self) -> f64 {
        let bin_area: f64 = self.bins.iter().map(|b| b.bin_area).sum();
        let placed_area: f64 = self.bins.iter().map(|b| b.placed_area).sum();
        match bin_area > 0.0 {
            true => placed_area / bin_area,
            false => 0.0,
        }
    }
}
