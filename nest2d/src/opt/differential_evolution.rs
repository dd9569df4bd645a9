use itertools::Itertools;
use log::debug;
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};

use crate::opt::{BestTracker, Bounds, Budget, Objective, OptimizationResult, Optimizer, Termination};
use crate::util::FPA;

/// DE/rand/1/bin differential evolution.
///
/// Every generation is evaluated as one batch through [`Objective::evaluate_batch`],
/// which lets the objective run its trials in parallel.
#[derive(Debug, Clone, Copy)]
pub struct DifferentialEvolution {
    /// Differential weight
    pub f: f64,
    /// Crossover probability
    pub cr: f64,
    pub min_population: usize,
    pub max_population: usize,
    /// Seed for the PRNG. If undefined, the optimizer will run in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
}

impl DifferentialEvolution {
    pub fn new(prng_seed: Option<u64>) -> Self {
        DifferentialEvolution {
            prng_seed,
            ..Default::default()
        }
    }

    fn population_size(&self, dim: usize) -> usize {
        (2 * dim).max(self.min_population).min(self.max_population)
    }
}

impl Default for DifferentialEvolution {
    fn default() -> Self {
        DifferentialEvolution {
            f: 0.5,
            cr: 0.9,
            min_population: 10,
            max_population: 40,
            prng_seed: Some(0),
        }
    }
}

impl Optimizer for DifferentialEvolution {
    fn minimize_from(
        &self,
        objective: &dyn Objective,
        bounds: &[Bounds],
        x0: Option<&[f64]>,
        budget: &Budget,
    ) -> OptimizationResult {
        let mut rng = match self.prng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let dim = bounds.len();
        let pop_size = self.population_size(dim);
        let mut tracker = BestTracker::new();
        let fallback = match x0 {
            Some(x0) => x0.to_vec(),
            None => bounds.iter().map(|b| b.center()).collect(),
        };

        let mut population = (0..pop_size)
            .map(|i| match (i, x0) {
                (0, Some(x0)) => x0.iter().zip(bounds).map(|(v, b)| b.clamp(*v)).collect(),
                _ => bounds
                    .iter()
                    .map(|b| b.lo + rng.random::<f64>() * b.width())
                    .collect_vec(),
            })
            .collect_vec();

        let Some(mut values) = evaluate(objective, &mut population, budget, &mut tracker) else {
            let termination = exhausted_reason(budget, &tracker, objective);
            return tracker.finish(fallback, termination);
        };
        let mut generation = 0;

        let termination = loop {
            if let Some(t) = budget.exhausted(tracker.n_evaluations(), objective) {
                break t;
            }
            if dim == 0 || converged(&values) {
                break Termination::Converged;
            }

            let mut trials = (0..population.len())
                .map(|i| self.trial_vector(i, &population, bounds, &mut rng))
                .collect_vec();
            let Some(trial_values) = evaluate(objective, &mut trials, budget, &mut tracker) else {
                break exhausted_reason(budget, &tracker, objective);
            };
            //only a prefix of the trials might have been evaluated
            for (i, (trial, value)) in trials.into_iter().zip(trial_values).enumerate() {
                if FPA(value) <= FPA(values[i]) {
                    population[i] = trial;
                    values[i] = value;
                }
            }
            generation += 1;
            debug!(
                "[OPT] DE generation {}: best {:.6} ({} evaluations)",
                generation,
                tracker.best_value(),
                tracker.n_evaluations()
            );
        };

        debug!(
            "[OPT] differential evolution stopped ({:?}) after {} generations",
            termination, generation
        );
        tracker.finish(fallback, termination)
    }
}

impl DifferentialEvolution {
    fn trial_vector(
        &self,
        target: usize,
        population: &[Vec<f64>],
        bounds: &[Bounds],
        rng: &mut SmallRng,
    ) -> Vec<f64> {
        let n = population.len();
        let mut pick = |exclude: &[usize]| loop {
            let c = rng.random_range(0..n);
            if !exclude.contains(&c) || n <= exclude.len() {
                return c;
            }
        };
        let a = pick(&[target]);
        let b = pick(&[target, a]);
        let c = pick(&[target, a, b]);
        let dim = bounds.len();
        let j_rand = rng.random_range(0..dim);
        (0..dim)
            .map(|j| {
                let cross = j == j_rand || rng.random::<f64>() < self.cr;
                match cross {
                    true => {
                        let v = population[a][j] + self.f * (population[b][j] - population[c][j]);
                        bounds[j].clamp(v)
                    }
                    false => population[target][j],
                }
            })
            .collect()
    }
}

/// Evaluates as many vectors as the budget allows, registering each in the tracker.
/// `None` if not a single vector could be evaluated.
/// The unevaluated tail of `xs` is dropped.
fn evaluate(
    objective: &dyn Objective,
    xs: &mut Vec<Vec<f64>>,
    budget: &Budget,
    tracker: &mut BestTracker,
) -> Option<Vec<f64>> {
    if budget.exhausted(tracker.n_evaluations(), objective).is_some() {
        return None;
    }
    xs.truncate(budget.remaining(tracker.n_evaluations()));
    let values = objective.evaluate_batch(xs);
    for (x, v) in xs.iter().zip(&values) {
        tracker.observe(x, *v);
    }
    Some(values)
}

fn exhausted_reason(budget: &Budget, tracker: &BestTracker, objective: &dyn Objective) -> Termination {
    budget
        .exhausted(tracker.n_evaluations(), objective)
        .unwrap_or(Termination::IterationBudget)
}

fn converged(values: &[f64]) -> bool {
    match values.iter().minmax_by(|a, b| a.total_cmp(b)).into_option() {
        Some((min, max)) => FPA(*min) == FPA(*max),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::tests::sphere;

    #[test]
    fn finds_minimum_of_sphere() {
        let bounds = vec![Bounds::unit(); 3];
        let res = DifferentialEvolution::new(Some(42)).minimize(&sphere, &bounds, &Budget::evaluations(3_000));
        assert!(res.best_value < 1e-4, "{res:?}");
    }

    #[test]
    fn same_seed_same_result() {
        let bounds = vec![Bounds::unit(); 4];
        let budget = Budget::evaluations(200);
        let a = DifferentialEvolution::new(Some(7)).minimize(&sphere, &bounds, &budget);
        let b = DifferentialEvolution::new(Some(7)).minimize(&sphere, &bounds, &budget);
        assert_eq!(a.best, b.best);
        assert_eq!(a.n_evaluations, 200);
    }

    #[test]
    fn starting_point_is_evaluated_first() {
        let bounds = vec![Bounds::unit(); 2];
        let x0 = [0.3, 0.3];
        let res = DifferentialEvolution::default().minimize_from(&sphere, &bounds, Some(&x0), &Budget::evaluations(1));
        assert_eq!(res.best, x0.to_vec());
        assert_eq!(res.termination, Termination::IterationBudget);
    }

    #[test]
    fn interrupted_objective_stops_immediately() {
        struct Stopped;
        impl Objective for Stopped {
            fn evaluate(&self, _: &[f64]) -> f64 {
                0.0
            }
            fn interrupted(&self) -> bool {
                true
            }
        }
        let res = DifferentialEvolution::default().minimize(&Stopped, &[Bounds::unit()], &Budget::default());
        assert_eq!(res.n_evaluations, 0);
        assert_eq!(res.termination, Termination::Interrupted);
    }
}
