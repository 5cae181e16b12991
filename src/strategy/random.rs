//! Uniform random assignment.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::AssignmentStrategy;
use crate::models::{ResourcePool, Task};

/// Assigns each task independently and uniformly at random.
///
/// Owns its random source, so runs are reproducible per seed and
/// independent of any other strategy instance.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: SmallRng,
}

impl RandomStrategy {
    /// Creates a strategy with its own RNG seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl AssignmentStrategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "Random"
    }

    /// # Panics
    /// If `pool` is empty and `batch` is not.
    fn assign_batch(&mut self, batch: Vec<Task>, pool: &mut ResourcePool, current_time: f64) {
        let n = pool.len();
        for task in batch {
            let index = self.rng.random_range(0..n);
            pool.assign(task, index, current_time);
        }
    }
}
