//! Load-balancing simulator for heterogeneous resource pools.
//!
//! Models a pool of processing units with different rates serving a
//! stochastic stream of tasks under a pluggable assignment strategy, to
//! compare latency, throughput, and utilization across strategies.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `Resource`, `ResourcePool`
//! - **`workload`**: Poisson arrivals with uniform task sizes
//! - **`strategy`**: `AssignmentStrategy` and its variants: round robin,
//!   random, and particle swarm batch assignment
//! - **`simulation`**: Time-stepped engine with analytic post-horizon drain
//! - **`metrics`**: Response time, makespan, throughput, utilization
//! - **`validation`**: Configuration checks
//! - **`report`**: Result sinks and cross-strategy comparison
//!
//! # Determinism
//!
//! Every random source is an explicit seeded RNG owned by the component
//! that draws from it. Identical seeds and parameters give identical
//! results.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"

pub mod error;
pub mod metrics;
pub mod models;
pub mod report;
pub mod simulation;
pub mod strategy;
pub mod validation;
pub mod workload;

pub use error::SimError;
pub use metrics::MetricsRecord;
pub use simulation::{Simulation, SimulationConfig};
pub use strategy::{AssignmentStrategy, StrategyKind};
