//! Discrete-time simulation engine.
//!
//! # Algorithm
//!
//! Each tick of length `dt`, while the clock has not passed the horizon:
//! 1. **Admitting**: move arrivals with `arrival <= clock` into the
//!    waiting pool.
//! 2. **Dispatching**: hand the whole waiting pool to the strategy.
//!    Immediate strategies are invoked whenever tasks wait; batched
//!    strategies only at batch deadlines, or once the workload is
//!    exhausted with tasks still waiting.
//! 3. **Processing**: advance every resource by one tick.
//!
//! After the tick loop, **Draining** completes queued work analytically:
//! each pass takes every non-empty resource in index order, adds the
//! exact time its head task needs to a running total, and completes that
//! task at `loop end + running total`.

use std::iter::Peekable;
use std::mem;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::SimulationConfig;
use crate::error::SimError;
use crate::metrics::{MetricsRecord, ResourceSummary};
use crate::models::{ResourcePool, Task};
use crate::strategy::{AssignmentStrategy, StrategyKind};
use crate::workload::WorkloadGenerator;

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Moving arrivals into the waiting pool.
    Admitting,
    /// Invoking the strategy.
    Dispatching,
    /// Advancing resources by one tick.
    Processing,
    /// Completing remaining queued work after the tick loop.
    Draining,
    /// All work completed; metrics are final.
    Terminal,
}

/// Full outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Strategy name.
    pub strategy: String,
    /// Summary statistics.
    pub metrics: MetricsRecord,
    /// Completed tasks in completion order.
    pub completed: Vec<Task>,
    /// Per-resource outcome.
    pub resources: Vec<ResourceSummary>,
    /// Total elapsed time `T`.
    pub elapsed: f64,
}

/// Time-stepped simulation of a resource pool under one strategy.
///
/// Owns the waiting pool, the resource pool, and the completed set.
/// Single use: [`run`](Self::run) consumes the engine.
///
/// # Example
///
/// ```
/// use lb_sim::simulation::{Simulation, SimulationConfig};
/// use lb_sim::strategy::RoundRobin;
///
/// let config = SimulationConfig::new(3, 100.0, 0.5, 10.0, 0);
/// let metrics = Simulation::new(config, Box::new(RoundRobin::new())).unwrap().run();
/// assert_eq!(metrics.tasks_submitted, metrics.tasks_completed);
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    strategy: Box<dyn AssignmentStrategy>,
    pool: ResourcePool,
    arrivals: Peekable<WorkloadGenerator>,
    submitted: usize,
    waiting: Vec<Task>,
    completed: Vec<Task>,
    clock: f64,
    next_batch: f64,
    drain_extra: f64,
    phase: Phase,
}

impl Simulation {
    /// Creates an engine whose resource rates are drawn from
    /// `config.rate_range`.
    ///
    /// One RNG is seeded from `config.seed`; it draws the resource rates
    /// in index order, then seeds the workload generator.
    ///
    /// # Errors
    /// `SimError::InvalidConfig` if any parameter is invalid.
    pub fn new(
        config: SimulationConfig,
        strategy: Box<dyn AssignmentStrategy>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let pool = ResourcePool::random(config.num_resources, config.rate_range(), &mut rng);
        let workload_rng = SmallRng::from_rng(&mut rng);
        Self::assemble(config, pool, strategy, workload_rng)
    }

    /// Creates an engine with explicit resource rates.
    ///
    /// `config.num_resources` is replaced by `rates.len()`. The workload
    /// RNG is derived from `config.seed` the same way as in
    /// [`new`](Self::new), without drawing rates first.
    ///
    /// # Errors
    /// `SimError::InvalidConfig` for invalid parameters (including empty
    /// `rates`), `SimError::InvalidResourceRate` for a rate ≤ 0.
    pub fn with_rates(
        mut config: SimulationConfig,
        rates: &[f64],
        strategy: Box<dyn AssignmentStrategy>,
    ) -> Result<Self, SimError> {
        config.num_resources = rates.len();
        config.validate()?;
        let pool = ResourcePool::with_rates(rates)?;
        let workload_rng = SmallRng::from_rng(&mut SmallRng::seed_from_u64(config.seed));
        Self::assemble(config, pool, strategy, workload_rng)
    }

    /// Creates an engine running a built-in strategy seeded with
    /// `config.seed`.
    pub fn from_kind(config: SimulationConfig, kind: StrategyKind) -> Result<Self, SimError> {
        let strategy = kind.build(config.seed);
        Self::new(config, strategy)
    }

    fn assemble(
        config: SimulationConfig,
        pool: ResourcePool,
        strategy: Box<dyn AssignmentStrategy>,
        workload_rng: SmallRng,
    ) -> Result<Self, SimError> {
        let arrivals =
            WorkloadGenerator::new(config.arrival_rate, config.horizon, workload_rng)?;
        Ok(Self {
            next_batch: config.batch_interval,
            config,
            strategy,
            pool,
            arrivals: arrivals.peekable(),
            submitted: 0,
            waiting: Vec::new(),
            completed: Vec::new(),
            clock: 0.0,
            drain_extra: 0.0,
            phase: Phase::Admitting,
        })
    }

    /// Current engine state.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current simulation clock (start of the next tick).
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Tasks admitted from the workload so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Tasks waiting for dispatch.
    pub fn waiting(&self) -> &[Task] {
        &self.waiting
    }

    /// Tasks completed so far.
    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    /// The resource pool.
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advances the state machine by one step and returns the new phase.
    ///
    /// A step is one full tick while the tick loop runs, the transition
    /// into draining, or the whole drain. Stepping a terminal engine is a
    /// no-op.
    pub fn step(&mut self) -> Phase {
        match self.phase {
            Phase::Terminal => {}
            Phase::Draining => {
                self.drain();
                self.phase = Phase::Terminal;
            }
            Phase::Admitting | Phase::Dispatching | Phase::Processing => {
                if self.ticking() {
                    self.tick();
                } else {
                    debug!(
                        clock = self.clock,
                        queued = self.pool.queued_tasks(),
                        "drain started"
                    );
                    self.phase = Phase::Draining;
                }
            }
        }
        self.phase
    }

    /// Runs to completion and returns the summary metrics.
    pub fn run(self) -> MetricsRecord {
        self.run_detailed().metrics
    }

    /// Runs to completion and returns the full report.
    pub fn run_detailed(mut self) -> SimulationReport {
        info!(
            strategy = self.strategy.name(),
            resources = self.pool.len(),
            horizon = self.config.horizon,
            arrival_rate = self.config.arrival_rate,
            seed = self.config.seed,
            "simulation started"
        );

        while self.step() != Phase::Terminal {}

        let elapsed = self.clock + self.drain_extra;
        let metrics =
            MetricsRecord::calculate(&self.completed, &self.pool, elapsed, self.submitted);

        info!(
            strategy = self.strategy.name(),
            submitted = metrics.tasks_submitted,
            completed = metrics.tasks_completed,
            avg_response_time = ?metrics.avg_response_time,
            utilization = ?metrics.utilization,
            elapsed,
            "simulation finished"
        );

        SimulationReport {
            strategy: self.strategy.name().to_string(),
            resources: self
                .pool
                .iter()
                .map(|r| ResourceSummary::from_resource(r, elapsed))
                .collect(),
            metrics,
            completed: self.completed,
            elapsed,
        }
    }

    /// Whether another tick is due.
    ///
    /// Ticks continue past the horizon only while arrivals before the
    /// horizon are still pending, which happens when the horizon is not
    /// a multiple of `dt`.
    fn ticking(&mut self) -> bool {
        self.clock <= self.config.horizon || self.arrivals.peek().is_some()
    }

    fn tick(&mut self) {
        self.phase = Phase::Admitting;
        self.admit();

        self.phase = Phase::Dispatching;
        self.dispatch();

        self.phase = Phase::Processing;
        self.process();

        self.clock += self.config.dt;
    }

    fn admit(&mut self) {
        let clock = self.clock;
        while let Some(task) = self.arrivals.next_if(|t| t.arrival <= clock) {
            self.submitted += 1;
            self.waiting.push(task);
        }
    }

    fn dispatch(&mut self) {
        let batched = self.strategy.is_batched();
        let due = if batched {
            let exhausted = self.arrivals.peek().is_none();
            self.clock >= self.next_batch || (exhausted && !self.waiting.is_empty())
        } else {
            !self.waiting.is_empty()
        };
        if !due {
            return;
        }

        let batch = mem::take(&mut self.waiting);
        debug!(
            time = self.clock,
            batch = batch.len(),
            strategy = self.strategy.name(),
            "dispatching"
        );
        self.strategy.assign_batch(batch, &mut self.pool, self.clock);

        if batched {
            self.next_batch += self.config.batch_interval;
        }
    }

    fn process(&mut self) {
        for task in self.pool.advance(self.clock, self.config.dt) {
            trace!(
                task = task.id,
                resource = ?task.assigned_resource,
                finish = ?task.finish,
                "task completed"
            );
            self.completed.push(task);
        }
    }

    fn drain(&mut self) {
        let base = self.clock;
        while self.pool.has_pending_work() {
            for resource in self.pool.resources_mut() {
                let Some(time_to_finish) = resource.head_time_to_finish() else {
                    continue;
                };
                self.drain_extra += time_to_finish;
                if let Some(task) = resource.complete_head(base + self.drain_extra) {
                    self.completed.push(task);
                }
            }
        }
        debug!(
            extra = self.drain_extra,
            completed = self.completed.len(),
            "drain finished"
        );
    }
}
