use itertools::Itertools;
use log::debug;
use ordered_float::OrderedFloat;

use crate::opt::{BestTracker, Bounds, Budget, Objective, OptimizationResult, Optimizer, Termination};

/// Downhill simplex method, every vertex clamped to the bounds.
///
/// Deterministic: identical objectives and starting points produce identical results.
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    /// Size of the initial simplex, as a fraction of the width of each bound
    pub initial_step: f64,
    /// Converged once the values in the simplex are this close together
    pub f_tol: f64,
    /// Converged once the simplex is this small (relative to the bounds)
    pub x_tol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        NelderMead {
            initial_step: 0.25,
            f_tol: 1e-9,
            x_tol: 1e-6,
        }
    }
}

const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Bookkeeping of a single run: evaluations are counted and checked against the budget
struct Run<'a> {
    objective: &'a dyn Objective,
    bounds: &'a [Bounds],
    budget: &'a Budget,
    tracker: BestTracker,
}

impl Run<'_> {
    /// Fails with the reason to stop once the budget is exhausted
    fn eval(&mut self, x: &mut Vec<f64>) -> Result<f64, Termination> {
        if let Some(t) = self.budget.exhausted(self.tracker.n_evaluations(), self.objective) {
            return Err(t);
        }
        x.iter_mut()
            .zip(self.bounds)
            .for_each(|(v, b)| *v = b.clamp(*v));
        let value = self.objective.evaluate(x);
        self.tracker.observe(x, value);
        Ok(value)
    }
}

impl Optimizer for NelderMead {
    fn minimize_from(
        &self,
        objective: &dyn Objective,
        bounds: &[Bounds],
        x0: Option<&[f64]>,
        budget: &Budget,
    ) -> OptimizationResult {
        let start = match x0 {
            Some(x0) => x0.to_vec(),
            None => bounds.iter().map(|b| b.center()).collect_vec(),
        };
        let mut run = Run {
            objective,
            bounds,
            budget,
            tracker: BestTracker::new(),
        };
        let termination = self.simplex_search(&mut run, start.clone());
        debug!(
            "[OPT] nelder-mead stopped ({:?}) after {} evaluations, best: {:.6}",
            termination,
            run.tracker.n_evaluations(),
            run.tracker.best_value()
        );
        run.tracker.finish(start, termination)
    }
}

impl NelderMead {
    fn simplex_search(&self, run: &mut Run<'_>, start: Vec<f64>) -> Termination {
        let n = start.len();
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        let mut first = start;
        match run.eval(&mut first) {
            Ok(v) => simplex.push((first.clone(), v)),
            Err(t) => return t,
        }
        if n == 0 {
            return Termination::Converged;
        }
        for i in 0..n {
            let mut x = first.clone();
            let b = run.bounds[i];
            let step = self.initial_step * b.width();
            //step towards the side with the most room
            x[i] = match x[i] + step <= b.hi {
                true => x[i] + step,
                false => x[i] - step,
            };
            match run.eval(&mut x) {
                Ok(v) => simplex.push((x, v)),
                Err(t) => return t,
            }
        }

        loop {
            simplex.sort_by_key(|(_, v)| OrderedFloat(*v));
            if self.converged(&simplex, run.bounds) {
                return Termination::Converged;
            }
            let (worst, f_worst) = simplex[n].clone();
            let f_best = simplex[0].1;
            let f_second_worst = simplex[n - 1].1;
            let centroid = (0..n)
                .map(|d| simplex[..n].iter().map(|(x, _)| x[d]).sum::<f64>() / n as f64)
                .collect_vec();
            let along = |t: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&worst)
                    .map(|(c, w)| c + t * (c - w))
                    .collect()
            };

            let mut reflected = along(ALPHA);
            let f_r = match run.eval(&mut reflected) {
                Ok(v) => v,
                Err(t) => return t,
            };
            if f_r < f_best {
                let mut expanded = along(GAMMA);
                let f_e = match run.eval(&mut expanded) {
                    Ok(v) => v,
                    Err(t) => return t,
                };
                simplex[n] = match f_e < f_r {
                    true => (expanded, f_e),
                    false => (reflected, f_r),
                };
                continue;
            }
            if f_r < f_second_worst {
                simplex[n] = (reflected, f_r);
                continue;
            }
            let mut contracted = match f_r < f_worst {
                true => along(RHO),
                false => along(-RHO),
            };
            let f_c = match run.eval(&mut contracted) {
                Ok(v) => v,
                Err(t) => return t,
            };
            if f_c < f_worst.min(f_r) {
                simplex[n] = (contracted, f_c);
                continue;
            }
            //shrink towards the best vertex
            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let mut x = best
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, v)| b + SIGMA * (v - b))
                    .collect_vec();
                match run.eval(&mut x) {
                    Ok(v) => *vertex = (x, v),
                    Err(t) => return t,
                }
            }
        }
    }

    fn converged(&self, simplex: &[(Vec<f64>, f64)], bounds: &[Bounds]) -> bool {
        let (f_min, f_max) = (simplex[0].1, simplex[simplex.len() - 1].1);
        if (f_max - f_min).abs() <= self.f_tol {
            return true;
        }
        let best = &simplex[0].0;
        simplex.iter().skip(1).all(|(x, _)| {
            x.iter()
                .zip(best)
                .zip(bounds)
                .all(|((a, b), bd)| (a - b).abs() <= self.x_tol * bd.width().max(f64::EPSILON))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::tests::sphere;

    #[test]
    fn finds_minimum_of_sphere() {
        let bounds = vec![Bounds::unit(); 3];
        let res = NelderMead::default().minimize(&sphere, &bounds, &Budget::evaluations(2_000));
        assert!(res.best_value < 1e-6, "{res:?}");
        assert!(res.best.iter().all(|v| (v - 0.3).abs() < 1e-2));
    }

    #[test]
    fn respects_bounds() {
        let f = |x: &[f64]| x[0] + x[1];
        let bounds = vec![Bounds::new(0.5, 1.0), Bounds::new(-1.0, 1.0)];
        let res = NelderMead::default().minimize(&f, &bounds, &Budget::evaluations(500));
        assert!(res.best[0] >= 0.5 && res.best[1] >= -1.0);
        assert!(res.best_value < 0.75);
    }

    #[test]
    fn evaluation_budget_is_hard() {
        let bounds = vec![Bounds::unit(); 4];
        let res = NelderMead::default().minimize(&sphere, &bounds, &Budget::evaluations(7));
        assert_eq!(res.n_evaluations, 7);
        assert_eq!(res.termination, Termination::IterationBudget);
    }

    #[test]
    fn is_deterministic() {
        let bounds = vec![Bounds::unit(); 2];
        let a = NelderMead::default().minimize(&sphere, &bounds, &Budget::evaluations(50));
        let b = NelderMead::default().minimize(&sphere, &bounds, &Budget::evaluations(50));
        assert_eq!(a.best, b.best);
    }
}
