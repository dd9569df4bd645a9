use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::error::NestError;
use crate::geometry::geo_enums::RotationRange;

/// Configuration of a nesting run, read-only once the run starts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NestConfig {
    /// Rotations tried for items that do not define their own
    pub allowed_rotations: RotationRange,
    /// Minimum distance between two placed items
    pub spacing: f64,
    pub placement_heuristic: PlacementHeuristic,
    /// Order in which items are placed in the baseline pass
    pub ordering: ItemOrdering,
    /// Backend used by [`Nester::with_default_backends`](crate::orchestrator::Nester::with_default_backends)
    pub optimizer: OptimizerKind,
    pub optimizer_budget: OptimizerBudget,
    pub threading_mode: ThreadingMode,
    pub bin_reuse: BinReusePolicy,
    pub overflow: OverflowPolicy,
    /// Upper bound on the number of bins, exceeding it is fatal. Unbounded if undefined
    pub max_bins: Option<usize>,
    /// Tolerance relative to the largest bin diameter
    pub epsilon: f64,
    /// Number of evenly spaced angles tried for [`RotationRange::Continuous`]
    pub continuous_rotation_samples: usize,
    /// Seed for the PRNG. If undefined, the optimizer will run in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            allowed_rotations: RotationRange::Discrete(vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2]),
            spacing: 0.0,
            placement_heuristic: PlacementHeuristic::BottomLeft,
            ordering: ItemOrdering::Priority,
            optimizer: OptimizerKind::DifferentialEvolution,
            optimizer_budget: OptimizerBudget::Disabled,
            threading_mode: ThreadingMode::Parallel { n_threads: 0 },
            bin_reuse: BinReusePolicy::FirstFit,
            overflow: OverflowPolicy::OpenNewBin,
            max_bins: None,
            epsilon: 1e-6,
            continuous_rotation_samples: 8,
            prng_seed: Some(0),
        }
    }
}

impl NestConfig {
    /// Rejects every configuration that cannot be run, before any geometry work is done.
    pub fn validate(&self) -> Result<(), NestError> {
        let fail = |msg: String| Err(NestError::Configuration(msg));
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return fail(format!("spacing must be finite and >= 0, got {}", self.spacing));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return fail(format!("epsilon must be > 0, got {}", self.epsilon));
        }
        if self.max_bins == Some(0) {
            return fail("max_bins must be at least 1".into());
        }
        validate_rotations(&self.allowed_rotations)?;
        if self.continuous_rotation_samples == 0 {
            return fail("continuous_rotation_samples must be at least 1".into());
        }
        match self.optimizer_budget {
            OptimizerBudget::Iterations(0) => fail("iteration budget must be at least 1".into()),
            OptimizerBudget::TimeLimitMs(0) => fail("time budget must be at least 1 ms".into()),
            _ => Ok(()),
        }
    }
}

/// Checks that a rotation set can be sampled
pub fn validate_rotations(rotations: &RotationRange) -> Result<(), NestError> {
    match rotations {
        RotationRange::Discrete(angles) if angles.is_empty() => Err(NestError::Configuration(
            "discrete rotation set is empty".into(),
        )),
        RotationRange::Discrete(angles) if angles.iter().any(|a| !a.is_finite()) => Err(
            NestError::Configuration(format!("non-finite rotation in {angles:?}")),
        ),
        _ => Ok(()),
    }
}

/// Criterion used to choose between the feasible positions of an item
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementHeuristic {
    /// Leftmost, then bottommost
    #[default]
    BottomLeft,
    /// Smallest bounding box of all items in the bin
    MinBoundingBox,
    /// Pile of items as close as possible to the center of the bin
    Centered,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrdering {
    DescendingArea,
    /// Descending priority, then descending area
    #[default]
    Priority,
    /// As given in the input
    Input,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    NelderMead,
    #[default]
    DifferentialEvolution,
}

/// Budget for refinement passes on top of the baseline pass
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerBudget {
    /// Only the baseline pass is run
    #[default]
    Disabled,
    /// Maximum number of placement trials
    Iterations(usize),
    /// Wall-clock limit in milliseconds
    TimeLimitMs(u64),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingMode {
    Sequential,
    /// `n_threads == 0` lets rayon decide
    Parallel { n_threads: usize },
}

impl Default for ThreadingMode {
    fn default() -> Self {
        ThreadingMode::Parallel { n_threads: 0 }
    }
}

/// Which open bins are tried before a new one is opened
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinReusePolicy {
    /// Every open bin, in opening order
    #[default]
    FirstFit,
    /// Only the most recently opened bin
    NextFit,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    #[default]
    OpenNewBin,
    /// Never open more than one bin
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_is_valid() {
        assert!(NestConfig::default().validate().is_ok());
    }

    #[test_case(NestConfig { spacing: -1.0, ..Default::default() }; "negative spacing")]
    #[test_case(NestConfig { spacing: f64::NAN, ..Default::default() }; "nan spacing")]
    #[test_case(NestConfig { epsilon: 0.0, ..Default::default() }; "zero epsilon")]
    #[test_case(NestConfig { max_bins: Some(0), ..Default::default() }; "zero max bins")]
    #[test_case(NestConfig { allowed_rotations: RotationRange::Discrete(vec![]), ..Default::default() }; "empty rotations")]
    #[test_case(NestConfig { continuous_rotation_samples: 0, ..Default::default() }; "zero samples")]
    #[test_case(NestConfig { optimizer_budget: OptimizerBudget::Iterations(0), ..Default::default() }; "zero iterations")]
    #[test_case(NestConfig { optimizer_budget: OptimizerBudget::TimeLimitMs(0), ..Default::default() }; "zero time")]
    fn invalid_configs_are_rejected(config: NestConfig) {
        assert!(matches!(config.validate(), Err(NestError::Configuration(_))));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: NestConfig =
            serde_json::from_str(r#"{"spacing": 2.0, "optimizer_budget": {"Iterations": 50}}"#)
                .unwrap();
        assert_eq!(config.spacing, 2.0);
        assert_eq!(config.optimizer_budget, OptimizerBudget::Iterations(50));
        assert_eq!(config.ordering, ItemOrdering::Priority);
    }
}
