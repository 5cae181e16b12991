//! Stochastic workload generation.
//!
//! Tasks arrive as a Poisson process: inter-arrival times are drawn
//! i.i.d. from an exponential distribution with mean `1/λ`, and task
//! sizes are drawn uniformly from `[MIN_TASK_SIZE, MAX_TASK_SIZE]`.
//! The first arrival at or past the horizon ends the stream and is
//! discarded, so output is finite and time-ordered by construction.
//!
//! # Usage
//!
//! ```
//! use lb_sim::workload::WorkloadGenerator;
//!
//! let tasks: Vec<_> = WorkloadGenerator::seeded(0.5, 100.0, 0).unwrap().collect();
//! assert!(tasks.windows(2).all(|w| w[0].arrival <= w[1].arrival));
//! ```

use std::iter::FusedIterator;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::error::SimError;
use crate::models::Task;

/// Smallest task size in work units.
pub const MIN_TASK_SIZE: u32 = 10;
/// Largest task size in work units.
pub const MAX_TASK_SIZE: u32 = 200;

/// Lazy, finite task stream.
///
/// Restartable: two generators built from the same rate, horizon and
/// seed yield identical sequences. Per task, the inter-arrival draw
/// happens before the size draw.
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    inter_arrival: Exp<f64>,
    horizon: f64,
    clock: f64,
    next_id: u64,
    exhausted: bool,
    rng: SmallRng,
}

impl WorkloadGenerator {
    /// Creates a generator drawing from `rng`.
    ///
    /// # Errors
    /// `SimError::Distribution` if `arrival_rate` is not strictly
    /// positive and finite.
    pub fn new(arrival_rate: f64, horizon: f64, rng: SmallRng) -> Result<Self, SimError> {
        if !(arrival_rate.is_finite() && arrival_rate > 0.0) {
            return Err(SimError::Distribution(format!(
                "arrival rate must be > 0, got {arrival_rate}"
            )));
        }
        let inter_arrival =
            Exp::new(arrival_rate).map_err(|e| SimError::Distribution(e.to_string()))?;

        Ok(Self {
            inter_arrival,
            horizon,
            clock: 0.0,
            next_id: 0,
            exhausted: false,
            rng,
        })
    }

    /// Creates a generator with its own RNG seeded from `seed`.
    pub fn seeded(arrival_rate: f64, horizon: f64, seed: u64) -> Result<Self, SimError> {
        Self::new(arrival_rate, horizon, SmallRng::seed_from_u64(seed))
    }

    /// Whether the stream has ended.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Iterator for WorkloadGenerator {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        if self.exhausted {
            return None;
        }

        self.clock += self.inter_arrival.sample(&mut self.rng);
        if self.clock >= self.horizon {
            self.exhausted = true;
            return None;
        }

        let size = self.rng.random_range(MIN_TASK_SIZE..=MAX_TASK_SIZE);
        let task = Task::new(self.next_id, self.clock, size);
        self.next_id += 1;
        Some(task)
    }
}

impl FusedIterator for WorkloadGenerator {}
