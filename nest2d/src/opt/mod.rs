//! Bounded black-box minimization.
//!
//! The orchestrator only depends on [`Optimizer`] and [`Objective`]: backends can be swapped
//! without touching the placement code.

use std::fmt::Debug;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::util::FPA;

mod differential_evolution;
mod nelder_mead;

#[doc(inline)]
pub use differential_evolution::DifferentialEvolution;
#[doc(inline)]
pub use nelder_mead::NelderMead;

/// Scalar function to be minimized
pub trait Objective: Sync {
    fn evaluate(&self, x: &[f64]) -> f64;

    /// Evaluates several vectors, results in the same order.
    /// Implementations may evaluate concurrently.
    fn evaluate_batch(&self, xs: &[Vec<f64>]) -> Vec<f64> {
        xs.iter().map(|x| self.evaluate(x)).collect()
    }

    /// Whether the optimizer should stop as soon as possible
    fn interrupted(&self) -> bool {
        false
    }
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Minimizes an [`Objective`] over a box of [`Bounds`]
pub trait Optimizer: Send + Sync + Debug {
    /// Minimizes starting from `x0` (if any), always returns the best vector evaluated
    fn minimize_from(
        &self,
        objective: &dyn Objective,
        bounds: &[Bounds],
        x0: Option<&[f64]>,
        budget: &Budget,
    ) -> OptimizationResult;

    fn minimize(
        &self,
        objective: &dyn Objective,
        bounds: &[Bounds],
        budget: &Budget,
    ) -> OptimizationResult {
        self.minimize_from(objective, bounds, None, budget)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub fn new(lo: f64, hi: f64) -> Self {
        debug_assert!(lo <= hi);
        Bounds { lo, hi }
    }

    pub fn unit() -> Self {
        Bounds { lo: 0.0, hi: 1.0 }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.lo, self.hi)
    }

    pub fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// When an optimizer has to stop, whichever comes first
#[derive(Debug, Clone, Copy, Default)]
pub struct Budget {
    /// Maximum number of objective evaluations
    pub max_evaluations: Option<usize>,
    pub deadline: Option<Instant>,
}

impl Budget {
    pub fn evaluations(n: usize) -> Self {
        Budget {
            max_evaluations: Some(n),
            deadline: None,
        }
    }

    pub fn until(deadline: Instant) -> Self {
        Budget {
            max_evaluations: None,
            deadline: Some(deadline),
        }
    }

    /// Number of evaluations still allowed, `usize::MAX` if unbounded
    pub fn remaining(&self, n_evaluations: usize) -> usize {
        self.max_evaluations
            .map_or(usize::MAX, |max| max.saturating_sub(n_evaluations))
    }

    /// Why the optimizer should stop now, if it should
    pub fn exhausted(&self, n_evaluations: usize, objective: &dyn Objective) -> Option<Termination> {
        if objective.interrupted() {
            Some(Termination::Interrupted)
        } else if self.remaining(n_evaluations) == 0 {
            Some(Termination::IterationBudget)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(Termination::TimeBudget)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Converged,
    IterationBudget,
    /// Not a failure: the best vector so far is still returned
    TimeBudget,
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub best: Vec<f64>,
    pub best_value: f64,
    pub n_evaluations: usize,
    pub termination: Termination,
}

/// Keeps track of the best vector evaluated so far.
///
/// A strictly lower value replaces the best, (approximately) equal values keep the earlier one.
#[derive(Debug, Clone)]
pub struct BestTracker {
    best: Option<(Vec<f64>, f64)>,
    n_evaluations: usize,
}

impl BestTracker {
    pub fn new() -> Self {
        BestTracker {
            best: None,
            n_evaluations: 0,
        }
    }

    /// Registers an evaluation, returns whether it is the new best
    pub fn observe(&mut self, x: &[f64], value: f64) -> bool {
        self.n_evaluations += 1;
        let improves = match &self.best {
            None => true,
            Some((_, best)) => !value.is_nan() && (best.is_nan() || FPA(value) < FPA(*best)),
        };
        if improves {
            self.best = Some((x.to_vec(), value));
        }
        improves
    }

    pub fn n_evaluations(&self) -> usize {
        self.n_evaluations
    }

    pub fn best_value(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |(_, v)| *v)
    }

    pub fn finish(self, fallback: Vec<f64>, termination: Termination) -> OptimizationResult {
        let (best, best_value) = self.best.unwrap_or((fallback, f64::INFINITY));
        OptimizationResult {
            best,
            best_value,
            n_evaluations: self.n_evaluations,
            termination,
        }
    }
}

impl Default for BestTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shifted sphere with its minimum (0) at `(0.3, 0.3, ...)`
    pub fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| (v - 0.3).powi(2)).sum()
    }

    #[test]
    fn ties_keep_the_earliest() {
        let mut t = BestTracker::new();
        assert!(t.observe(&[1.0], 2.0));
        assert!(!t.observe(&[2.0], 2.0));
        assert!(t.observe(&[3.0], 1.0));
        assert!(!t.observe(&[4.0], f64::NAN));
        let r = t.finish(vec![], Termination::Converged);
        assert_eq!(r.best, vec![3.0]);
        assert_eq!(r.n_evaluations, 4);
    }

    #[test]
    fn closures_are_objectives() {
        let f = |x: &[f64]| x[0] * 2.0;
        let obj: &dyn Objective = &f;
        assert_eq!(obj.evaluate_batch(&[vec![1.0], vec![2.0]]), vec![2.0, 4.0]);
        assert!(!obj.interrupted());
    }

    #[test]
    fn budget_exhaustion() {
        let f = |_: &[f64]| 0.0;
        assert_eq!(Budget::evaluations(3).exhausted(3, &f), Some(Termination::IterationBudget));
        assert_eq!(Budget::evaluations(3).exhausted(2, &f), None);
        let past = Budget::until(Instant::now());
        assert_eq!(past.exhausted(0, &f), Some(Termination::TimeBudget));
    }
}
