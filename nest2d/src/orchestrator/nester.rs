use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{info, warn};
use thousands::Separable;

use crate::config::{NestConfig, OptimizerBudget, OptimizerKind};
use crate::entities::{NestingSolution, PlacementFailure, PlacementOutcome, PlacementResult};
use crate::error::NestError;
use crate::io::ext_repr::ExtNestInput;
use crate::io::import::{Importer, RejectedItem};
use crate::kernel::{GeoKernel, GeometryKernel, Tolerance};
use crate::nfp::NfpEngine;
use crate::opt::{Bounds, Budget, DifferentialEvolution, NelderMead, Optimizer};
use crate::orchestrator::{CancellationToken, PassContext, PassObjective};
use crate::placement::{PlacementStrategy, Scorer, initial_order};
use crate::util::Executor;

/// Terminal state of a nesting run
#[derive(Clone, Debug, PartialEq)]
pub enum RunStatus {
    /// Every item copy was placed or has a failure reason
    Complete,
    /// The cancellation token was set, the solution is the best one found before that
    Cancelled,
    Failed(NestError),
}

#[derive(Clone, Debug)]
pub struct NestingOutcome {
    pub status: RunStatus,
    pub solution: NestingSolution,
    /// Number of placement passes started, baseline included
    pub n_passes: usize,
}

pub type ImprovementCallback = Box<dyn Fn(&NestingSolution) + Send + Sync>;

/// Drives a nesting run from the external input to the best solution found.
///
/// The geometry kernel and the optimizer are injected, nothing in a run depends on global state.
pub struct Nester {
    config: NestConfig,
    kernel: Arc<dyn GeometryKernel>,
    optimizer: Arc<dyn Optimizer>,
    on_improvement: Option<ImprovementCallback>,
}

impl Nester {
    pub fn new(
        config: NestConfig,
        kernel: Arc<dyn GeometryKernel>,
        optimizer: Arc<dyn Optimizer>,
    ) -> Self {
        Nester {
            config,
            kernel,
            optimizer,
            on_improvement: None,
        }
    }

    /// [`GeoKernel`] and the optimizer selected by [`NestConfig::optimizer`]
    pub fn with_default_backends(config: NestConfig) -> Self {
        let optimizer: Arc<dyn Optimizer> = match config.optimizer {
            OptimizerKind::NelderMead => Arc::new(NelderMead::default()),
            OptimizerKind::DifferentialEvolution => {
                Arc::new(DifferentialEvolution::new(config.prng_seed))
            }
        };
        Nester::new(config, Arc::new(GeoKernel::new()), optimizer)
    }

    /// Registers a function called with every solution that improves on the best so far
    pub fn with_improvement_callback(
        mut self,
        callback: impl Fn(&NestingSolution) + Send + Sync + 'static,
    ) -> Self {
        self.on_improvement = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &NestConfig {
        &self.config
    }

    /// Nests `input`, polling `cancel` before every pass.
    ///
    /// Never panics on bad input: configuration problems end the run as [`RunStatus::Failed`]
    /// before any geometry work, all other failures still come with the best partial solution.
    pub fn run(&self, input: &ExtNestInput, cancel: &CancellationToken) -> NestingOutcome {
        let start = Instant::now();
        info!(
            "[NEST] run started: {} item types, {} bin types",
            input.items.len(),
            input.bins.len()
        );
        let failed = |e: NestError| {
            warn!("[NEST] run failed: {e}");
            NestingOutcome {
                status: RunStatus::Failed(e),
                solution: NestingSolution::empty(),
                n_passes: 0,
            }
        };

        if let Err(e) = self.config.validate() {
            return failed(e);
        }
        let executor = match Executor::new(self.config.threading_mode) {
            Ok(executor) => executor,
            Err(e) => return failed(e),
        };
        let importer = Importer::new(self.kernel.as_ref(), &self.config);
        let (instance, rejected) = match importer.import_instance(input) {
            Ok(imported) => imported,
            Err(e) => return failed(e),
        };
        let degenerate = degenerate_results(&rejected);

        let l = instance.characteristic_length();
        let engine = NfpEngine::new(
            self.kernel.clone(),
            Tolerance::new(self.config.epsilon, l),
        );
        let scorer = Scorer::new(self.config.placement_heuristic, l, self.config.epsilon);
        let strategy = PlacementStrategy::new(&engine, &instance, scorer, &executor);
        let ctx = PassContext {
            instance: &instance,
            strategy: &strategy,
            config: &self.config,
        };

        let baseline_order = initial_order(&instance, self.config.ordering);
        if cancel.is_cancelled() {
            let mut solution = NestingSolution::empty();
            solution.placements = baseline_order
                .iter()
                .map(|c| ctx.unplaced_result(*c, PlacementFailure::Skipped))
                .chain(degenerate)
                .collect();
            info!("[NEST] run cancelled before the first pass");
            return NestingOutcome {
                status: RunStatus::Cancelled,
                solution,
                n_passes: 0,
            };
        }

        let plan = baseline_order.iter().map(|c| (*c, None)).collect_vec();
        let baseline = ctx.run_pass(&plan);
        if let Some(e) = baseline.error {
            warn!("[NEST] baseline pass failed: {e}");
            let mut solution = baseline.solution;
            solution.placements.extend(degenerate);
            return NestingOutcome {
                status: RunStatus::Failed(e),
                solution,
                n_passes: 1,
            };
        }
        if let Some(callback) = &self.on_improvement {
            callback(&baseline.solution);
        }

        let best = Mutex::new((0, baseline.solution));
        let mut n_passes = 1;
        if let Some(budget) = self.optimizer_budget(start) {
            let objective = PassObjective::new(
                &ctx,
                &executor,
                cancel,
                &best,
                self.on_improvement.as_deref(),
            );
            if objective.dimension() > 0 {
                let bounds = vec![Bounds::unit(); objective.dimension()];
                let x0 = objective.encode(&baseline_order);
                let result =
                    self.optimizer
                        .minimize_from(&objective, &bounds, Some(&x0), &budget);
                n_passes += objective.n_trials();
                info!(
                    "[OPT] {:?} after {} trials, best trial fitness: {:.6}",
                    result.termination,
                    result.n_evaluations.separate_with_commas(),
                    result.best_value
                );
            }
        }
        let (best_trial, mut solution) = best.into_inner().unwrap_or_else(|e| e.into_inner());
        solution.placements.extend(degenerate);

        let status = match cancel.is_cancelled() {
            true => RunStatus::Cancelled,
            false => RunStatus::Complete,
        };
        engine.log_cache_stats();
        info!(
            "[NEST] run finished in {:.3}ms: {:?}, {} passes, best from pass {}",
            start.elapsed().as_secs_f64() * 1000.0,
            status,
            n_passes.separate_with_commas(),
            best_trial
        );
        info!(
            "[NEST] {}/{} copies placed in {} bins with a density of {:.3}%, fitness: {:.6}",
            solution.n_placed(),
            solution.placements.len(),
            solution.bins.len(),
            solution.density() * 100.0,
            solution.fitness
        );

        NestingOutcome {
            status,
            solution,
            n_passes,
        }
    }

    fn optimizer_budget(&self, start: Instant) -> Option<Budget> {
        match self.config.optimizer_budget {
            OptimizerBudget::Disabled => None,
            OptimizerBudget::Iterations(n) => Some(Budget::evaluations(n)),
            OptimizerBudget::TimeLimitMs(ms) => {
                Some(Budget::until(start + Duration::from_millis(ms)))
            }
        }
    }
}

/// One [`PlacementFailure::DegenerateGeometry`] result per copy of every rejected item
fn degenerate_results(rejected: &[RejectedItem]) -> Vec<PlacementResult> {
    rejected
        .iter()
        .flat_map(|r| {
            (0..r.quantity).map(|copy| PlacementResult {
                item_id: r.ext_id,
                copy,
                outcome: PlacementOutcome::Unplaced(PlacementFailure::DegenerateGeometry),
            })
        })
        .collect()
}
