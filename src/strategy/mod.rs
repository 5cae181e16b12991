//! Assignment strategies.
//!
//! A strategy takes an ordered batch of waiting tasks and places each one
//! on exactly one resource of the live pool. The engine owns the waiting
//! pool and the resource queues; a strategy receives the batch by value
//! and the pool by mutable reference for the duration of one call, so it
//! cannot hold on to either across calls.
//!
//! # Variants
//!
//! - [`RoundRobin`]: cyclic counter that persists across calls
//! - [`RandomStrategy`]: uniform independent choice per task
//! - [`ParticleSwarmStrategy`]: PSO search minimizing load imbalance,
//!   invoked periodically on accumulated batches
//!
//! # Usage
//!
//! ```
//! use lb_sim::models::{ResourcePool, Task};
//! use lb_sim::strategy::{AssignmentStrategy, RoundRobin};
//!
//! let mut pool = ResourcePool::with_rates(&[10.0, 20.0]).unwrap();
//! let mut rr = RoundRobin::new();
//! rr.assign_batch(vec![Task::new(0, 0.0, 50), Task::new(1, 0.0, 50)], &mut pool, 0.0);
//! assert_eq!(pool.get(1).unwrap().queue_len(), 1);
//! ```

mod pso;
mod random;
mod round_robin;

pub use pso::{
    fitness, ParticleSwarm, ParticleSwarmStrategy, PsoConfig, SwarmOutcome, UpdateMode,
};
pub use random::RandomStrategy;
pub use round_robin::RoundRobin;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::models::{ResourcePool, Task};

/// Places waiting tasks onto resources.
///
/// Implementations must assign every task in `batch` to exactly one
/// resource via [`ResourcePool::assign`], which sets the task's
/// resource and its start time to `max(arrival, current_time)`. An
/// empty batch is a no-op. The pool is never empty when the engine
/// calls this.
pub trait AssignmentStrategy: Send + fmt::Debug {
    /// Strategy name (e.g., "RoundRobin", "PSO").
    fn name(&self) -> &'static str;

    /// Whether the engine should invoke this strategy only at periodic
    /// batch deadlines instead of whenever tasks are waiting.
    fn is_batched(&self) -> bool {
        false
    }

    /// Assigns every task in `batch`, in order.
    ///
    /// # Panics
    /// Implementations may panic if `pool` is empty and `batch` is not.
    fn assign_batch(&mut self, batch: Vec<Task>, pool: &mut ResourcePool, current_time: f64);
}

impl<S: AssignmentStrategy + ?Sized> AssignmentStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_batched(&self) -> bool {
        (**self).is_batched()
    }

    fn assign_batch(&mut self, batch: Vec<Task>, pool: &mut ResourcePool, current_time: f64) {
        (**self).assign_batch(batch, pool, current_time)
    }
}

/// Built-in strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Cyclic assignment.
    RoundRobin,
    /// Uniform random assignment.
    Random,
    /// Periodic PSO batch assignment.
    ParticleSwarm,
}

impl StrategyKind {
    /// All built-in strategies, batched strategy first.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::ParticleSwarm,
        StrategyKind::RoundRobin,
        StrategyKind::Random,
    ];

    /// Builds the strategy. `seed` feeds strategy-owned randomness;
    /// PSO uses [`PsoConfig::default`].
    pub fn build(self, seed: u64) -> Box<dyn AssignmentStrategy> {
        match self {
            StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
            StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
            StrategyKind::ParticleSwarm => {
                Box::new(ParticleSwarmStrategy::new(PsoConfig::default(), seed))
            }
        }
    }

    /// Builds the strategy with an explicit PSO configuration.
    ///
    /// # Errors
    /// `SimError::InvalidConfig` if `pso` has a non-finite coefficient,
    /// whichever kind is built.
    pub fn build_with(
        self,
        seed: u64,
        pso: &PsoConfig,
    ) -> Result<Box<dyn AssignmentStrategy>, SimError> {
        pso.validate()?;
        Ok(match self {
            StrategyKind::ParticleSwarm => {
                Box::new(ParticleSwarmStrategy::new(pso.clone(), seed))
            }
            other => other.build(seed),
        })
    }

    /// Display label used in result tables.
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::RoundRobin => "RoundRobin",
            StrategyKind::Random => "Random",
            StrategyKind::ParticleSwarm => "PSO",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}' (expected round-robin, random, or pso)")]
pub struct ParseStrategyKindError(String);

impl FromStr for StrategyKind {
    type Err = ParseStrategyKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "round-robin" | "roundrobin" | "rr" => Ok(StrategyKind::RoundRobin),
            "random" => Ok(StrategyKind::Random),
            "pso" | "particle-swarm" | "particleswarm" => Ok(StrategyKind::ParticleSwarm),
            _ => Err(ParseStrategyKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_kind() {
        for kind in StrategyKind::ALL {
            let strategy = kind.build(0);
            assert_eq!(strategy.name(), kind.label());
            assert_eq!(strategy.is_batched(), kind == StrategyKind::ParticleSwarm);
        }
    }

    #[test]
    fn test_build_with_checks_swarm_config() {
        let pso = PsoConfig::default().with_particles(5);
        let strategy = StrategyKind::ParticleSwarm.build_with(1, &pso).unwrap();
        assert_eq!(strategy.name(), "PSO");

        let bad = PsoConfig::default().with_coefficients(f64::INFINITY, 1.0, 1.0);
        for kind in StrategyKind::ALL {
            let err = kind.build_with(1, &bad).unwrap_err();
            assert!(matches!(err, SimError::InvalidConfig(_)));
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("RoundRobin".parse::<StrategyKind>(), Ok(StrategyKind::RoundRobin));
        assert_eq!("round_robin".parse::<StrategyKind>(), Ok(StrategyKind::RoundRobin));
        assert_eq!("rr".parse::<StrategyKind>(), Ok(StrategyKind::RoundRobin));
        assert_eq!("Random".parse::<StrategyKind>(), Ok(StrategyKind::Random));
        assert_eq!("PSO".parse::<StrategyKind>(), Ok(StrategyKind::ParticleSwarm));
        assert!("fifo".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&StrategyKind::ParticleSwarm).unwrap();
        assert_eq!(json, "\"particle-swarm\"");
        let kind: StrategyKind = serde_json::from_str("\"round-robin\"").unwrap();
        assert_eq!(kind, StrategyKind::RoundRobin);
    }

    #[test]
    fn test_boxed_strategy_delegates() {
        let mut pool = ResourcePool::with_rates(&[10.0, 10.0]).unwrap();
        let mut boxed: Box<dyn AssignmentStrategy> = Box::new(RoundRobin::new());
        boxed.assign_batch(vec![Task::new(0, 0.0, 10)], &mut pool, 0.0);
        assert_eq!(pool.queued_tasks(), 1);
    }
}
