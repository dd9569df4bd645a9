use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use itertools::Itertools;
use log::{debug, warn};

use crate::entities::{ItemCopy, Layout, NestingSolution};
use crate::error::NestError;
use crate::opt::Objective;
use crate::orchestrator::{CancellationToken, PassContext};
use crate::placement::order_from_keys;
use crate::util::{Executor, FPA};

/// Penalty per item copy that could not be placed while it fits in an empty bin
const NO_FIT_PENALTY: f64 = 1000.0;

/// Fitness of a pass, lower is better.
///
/// Dominated by the number of unplaced copies, then the number of bins,
/// then how compact the last bin is.
pub fn fitness(n_no_fit: usize, layouts: &[Layout]) -> f64 {
    let Some(last) = layouts.last() else {
        return NO_FIT_PENALTY * n_no_fit as f64;
    };
    let compactness = last
        .pile_bbox()
        .map_or(0.0, |pile| pile.area() / last.bin.area());
    NO_FIT_PENALTY * n_no_fit as f64 + (layouts.len() - 1) as f64 + compactness
}

/// The best solution of a run so far, with the index of the trial that produced it
pub type BestSolution = Mutex<(usize, NestingSolution)>;

/// [`Objective`] that decodes a vector into a placement plan and runs a pass for it.
///
/// The first half of the vector holds one order key per item copy, the second half one
/// rotation gene per copy. Trials are numbered in evaluation order (the baseline pass is 0),
/// which breaks ties between equally fit solutions.
pub struct PassObjective<'a> {
    ctx: &'a PassContext<'a>,
    copies: Vec<ItemCopy>,
    executor: &'a Executor,
    cancel: &'a CancellationToken,
    best: &'a BestSolution,
    on_improvement: Option<&'a (dyn Fn(&NestingSolution) + Send + Sync)>,
    n_trials: AtomicUsize,
}

impl<'a> PassObjective<'a> {
    pub fn new(
        ctx: &'a PassContext<'a>,
        executor: &'a Executor,
        cancel: &'a CancellationToken,
        best: &'a BestSolution,
        on_improvement: Option<&'a (dyn Fn(&NestingSolution) + Send + Sync)>,
    ) -> Self {
        PassObjective {
            ctx,
            copies: ctx.instance.copies(),
            executor,
            cancel,
            best,
            on_improvement,
            n_trials: AtomicUsize::new(0),
        }
    }

    /// Number of parameters of the encoding
    pub fn dimension(&self) -> usize {
        2 * self.copies.len()
    }

    /// Encodes an order of the copies (rotation genes at 0)
    pub fn encode(&self, order: &[ItemCopy]) -> Vec<f64> {
        let n = self.copies.len();
        let mut x = vec![0.0; 2 * n];
        for (pos, copy) in order.iter().enumerate() {
            if let Some(i) = self.copies.iter().position(|c| c == copy) {
                x[i] = (pos as f64 + 0.5) / n as f64;
            }
        }
        x
    }

    /// Placement plan encoded by `x`
    pub fn decode(&self, x: &[f64]) -> Vec<(ItemCopy, Option<f64>)> {
        let n = self.copies.len();
        let n_samples = self.ctx.config.continuous_rotation_samples;
        order_from_keys(&x[..n])
            .into_iter()
            .map(|i| {
                let copy = self.copies[i];
                let range = &self.ctx.instance.item(copy.item_id).allowed_rotation;
                let rotation = match range.is_fixed() {
                    true => None,
                    false => Some(range.from_gene(x[n + i], n_samples)),
                };
                (copy, rotation)
            })
            .collect_vec()
    }

    pub fn n_trials(&self) -> usize {
        self.n_trials.load(Ordering::SeqCst)
    }

    fn run_trial(&self, trial_idx: usize, x: &[f64]) -> f64 {
        if self.cancel.is_cancelled() {
            return f64::INFINITY;
        }
        let outcome = self.ctx.run_pass(&self.decode(x));
        let fitness = match &outcome.error {
            None => outcome.solution.fitness,
            Some(NestError::CapacityExceeded { .. }) => f64::INFINITY,
            Some(e) => {
                warn!("[OPT] trial {trial_idx} failed: {e}");
                f64::INFINITY
            }
        };
        if fitness.is_finite() {
            self.offer(trial_idx, outcome.solution);
        }
        fitness
    }

    /// Replaces the best solution if `solution` is fitter, or equally fit and found earlier
    fn offer(&self, trial_idx: usize, solution: NestingSolution) {
        let mut best = self.best.lock().unwrap_or_else(|e| e.into_inner());
        let (best_idx, best_sol) = &*best;
        let (f, best_f) = (FPA(solution.fitness), FPA(best_sol.fitness));
        let improves = f < best_f || (f == best_f && trial_idx < *best_idx);
        if improves {
            debug!(
                "[OPT] trial {} improved fitness: {:.6} -> {:.6}",
                trial_idx, best_sol.fitness, solution.fitness
            );
            if let Some(callback) = self.on_improvement {
                callback(&solution);
            }
            *best = (trial_idx, solution);
        }
    }
}

impl Objective for PassObjective<'_> {
    fn evaluate(&self, x: &[f64]) -> f64 {
        let trial_idx = self.n_trials.fetch_add(1, Ordering::SeqCst) + 1;
        self.run_trial(trial_idx, x)
    }

    fn evaluate_batch(&self, xs: &[Vec<f64>]) -> Vec<f64> {
        let first = self.n_trials.fetch_add(xs.len(), Ordering::SeqCst) + 1;
        let jobs = xs.iter().enumerate().map(|(i, x)| (first + i, x)).collect_vec();
        self.executor.map(&jobs, |(trial_idx, x)| self.run_trial(*trial_idx, x))
    }

    fn interrupted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
