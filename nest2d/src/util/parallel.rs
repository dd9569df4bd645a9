use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::ThreadingMode;
use crate::error::NestError;

/// Runs batches of independent jobs, either on the calling thread or on a dedicated rayon pool.
///
/// Results are always returned in input order.
#[derive(Debug)]
pub struct Executor {
    pool: Option<ThreadPool>,
}

impl Executor {
    pub fn new(mode: ThreadingMode) -> Result<Self, NestError> {
        let pool = match mode {
            ThreadingMode::Sequential => None,
            ThreadingMode::Parallel { n_threads } => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n_threads)
                    .thread_name(|i| format!("nest2d-worker-{i}"))
                    .build()
                    .map_err(|e| NestError::ThreadPool(e.to_string()))?,
            ),
        };
        Ok(Executor { pool })
    }

    pub fn sequential() -> Self {
        Executor { pool: None }
    }

    pub fn n_threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    pub fn map<T, R, F>(&self, jobs: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) if jobs.len() > 1 => pool.install(|| jobs.par_iter().map(f).collect()),
            _ => jobs.iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_map_keeps_order() {
        let exec = Executor::new(ThreadingMode::Parallel { n_threads: 3 }).unwrap();
        let jobs = (0..100).collect::<Vec<u64>>();
        assert_eq!(exec.map(&jobs, |j| j * j), jobs.iter().map(|j| j * j).collect::<Vec<_>>());
        assert_eq!(exec.n_threads(), 3);
    }

    #[test]
    fn sequential_runs_inline() {
        let exec = Executor::new(ThreadingMode::Sequential).unwrap();
        assert_eq!(exec.n_threads(), 1);
        assert_eq!(exec.map(&[1, 2, 3], |j| j + 1), vec![2, 3, 4]);
    }
}
