//! Discrete-time simulation of a resource pool under an assignment
//! strategy.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────── tick (clock ≤ horizon) ─────────────┐
//! │ Admitting → Dispatching → Processing → clock+dt │
//! └─────────────────────────────────────────────────┘
//!                        ↓
//!                    Draining → Terminal
//! ```
//!
//! Dispatching finishes before Processing starts within a tick. The
//! engine is single-threaded and fully deterministic for a given seed.
//!
//! # References
//!
//! - Law (2015), "Simulation Modeling and Analysis", Ch. 1 (time-advance
//!   mechanisms)
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5

mod config;
mod engine;

pub use config::SimulationConfig;
pub use engine::{Phase, Simulation, SimulationReport};
