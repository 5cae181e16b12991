//! PSO batch assignment.
//!
//! Collects waiting tasks into periodic batches and assigns each batch
//! using the particle swarm optimizer in [`swarm`].

mod swarm;

pub use swarm::{fitness, ParticleSwarm, PsoConfig, SwarmOutcome, UpdateMode};

use tracing::debug;

use super::AssignmentStrategy;
use crate::models::{ResourcePool, Task};

/// Batched strategy that balances estimated load with PSO.
///
/// Heuristic: no optimality guarantee, deterministic for a fixed seed
/// and swarm configuration.
#[derive(Debug, Clone)]
pub struct ParticleSwarmStrategy {
    swarm: ParticleSwarm,
    batches: usize,
}

impl ParticleSwarmStrategy {
    /// Creates a strategy whose swarm RNG is seeded from `seed`.
    pub fn new(config: PsoConfig, seed: u64) -> Self {
        Self {
            swarm: ParticleSwarm::new(config, seed),
            batches: 0,
        }
    }

    /// Number of non-empty batches assigned so far.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl AssignmentStrategy for ParticleSwarmStrategy {
    fn name(&self) -> &'static str {
        "PSO"
    }

    fn is_batched(&self) -> bool {
        true
    }

    fn assign_batch(&mut self, batch: Vec<Task>, pool: &mut ResourcePool, current_time: f64) {
        if batch.is_empty() {
            return;
        }

        let sizes: Vec<f64> = batch.iter().map(Task::work).collect();
        let rates = pool.rates();
        let outcome = self.swarm.optimize(&sizes, &rates);
        self.batches += 1;

        debug!(
            time = current_time,
            batch = batch.len(),
            initial_fitness = outcome.initial_best_fitness,
            fitness = outcome.best_fitness,
            "pso batch assigned"
        );

        for (task, index) in batch.into_iter().zip(outcome.assignment) {
            pool.assign(task, index, current_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(sizes: &[u32]) -> Vec<Task> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| Task::new(i as u64, i as f64 * 0.5, s))
            .collect()
    }

    #[test]
    fn test_assigns_every_task_once() {
        let mut pool = ResourcePool::with_rates(&[11.0, 24.0, 17.5]).unwrap();
        let mut pso = ParticleSwarmStrategy::new(PsoConfig::default(), 42);
        pso.assign_batch(batch(&[100, 20, 180, 75, 60, 10, 130]), &mut pool, 5.0);

        assert_eq!(pool.queued_tasks(), 7);
        assert_eq!(pso.batches(), 1);
        for r in pool.iter() {
            for t in &r.queue {
                assert_eq!(t.assigned_resource, Some(r.id));
                assert_eq!(t.start, Some(t.arrival.max(5.0)));
            }
        }
    }

    #[test]
    fn test_batch_order_preserved_per_resource() {
        let mut pool = ResourcePool::with_rates(&[15.0, 15.0]).unwrap();
        let mut pso = ParticleSwarmStrategy::new(PsoConfig::default(), 0);
        pso.assign_batch(batch(&[50, 60, 70, 80, 90, 100]), &mut pool, 3.0);

        for r in pool.iter() {
            let ids: Vec<u64> = r.queue.iter().map(|t| t.id).collect();
            assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_single_resource_takes_all() {
        let mut pool = ResourcePool::with_rates(&[20.0]).unwrap();
        let mut pso = ParticleSwarmStrategy::new(PsoConfig::default(), 0);
        pso.assign_batch(batch(&[10, 20, 30]), &mut pool, 0.0);

        assert_eq!(pool.get(0).unwrap().queue_len(), 3);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut pool = ResourcePool::with_rates(&[20.0, 10.0]).unwrap();
        let mut pso = ParticleSwarmStrategy::new(PsoConfig::default(), 0);
        pso.assign_batch(Vec::new(), &mut pool, 0.0);

        assert_eq!(pool.queued_tasks(), 0);
        assert_eq!(pso.batches(), 0);
    }
}
