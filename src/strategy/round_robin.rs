//! Cyclic assignment.

use super::AssignmentStrategy;
use crate::models::{ResourcePool, Task};

/// Assigns the i-th task ever submitted to resource `i mod N`.
///
/// The counter persists across calls, so fairness holds over the whole
/// run rather than per batch.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    counter: u64,
}

impl RoundRobin {
    /// Creates a strategy starting at resource 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks assigned so far.
    pub fn assigned(&self) -> u64 {
        self.counter
    }
}

impl AssignmentStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        "RoundRobin"
    }

    /// # Panics
    /// If `pool` is empty and `batch` is not.
    fn assign_batch(&mut self, batch: Vec<Task>, pool: &mut ResourcePool, current_time: f64) {
        let n = pool.len() as u64;
        for task in batch {
            let index = (self.counter % n) as usize;
            self.counter += 1;
            pool.assign(task, index, current_time);
        }
    }
}
