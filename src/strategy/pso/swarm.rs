//! Particle swarm optimizer for batch load balancing.
//!
//! # Encoding
//!
//! A candidate solution is a length-k vector holding one resource index
//! per task in the batch. Particles move in continuous space; after each
//! move, positions are rounded to the nearest integer (ties to even) and
//! clamped into `[0, N-1]`.
//!
//! # Fitness
//!
//! Population standard deviation across resources of estimated load,
//! where a resource's load is `Σ size / rate` over the tasks the
//! candidate puts on it. Lower is better.
//!
//! # Update Rule
//!
//! ```text
//! v ← w·v + c1·r1⊙(pbest − x) + c2·r2⊙(gbest − x)
//! x ← clamp(round(x + v), 0, N−1)
//! ```
//!
//! with fresh uniform vectors `r1`, `r2` per particle per iteration.
//!
//! # Reference
//! Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::SimError;
use crate::validation::validate_pso_config;

/// When personal and global bests are refreshed within an iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// Particles move one at a time; an improved global best is visible
    /// to the particles that move after it in the same iteration.
    #[default]
    Asynchronous,
    /// All particles move first, fitness is evaluated in parallel, then
    /// bests are refreshed in particle order.
    Synchronous,
}

/// Swarm parameters.
///
/// # Example
///
/// ```
/// use lb_sim::strategy::{PsoConfig, UpdateMode};
///
/// let config = PsoConfig::default()
///     .with_particles(10)
///     .with_iterations(20)
///     .with_update_mode(UpdateMode::Synchronous);
/// assert_eq!(config.particles, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
    /// Swarm size (default: 30).
    pub particles: usize,
    /// Iteration count (default: 60).
    pub iterations: usize,
    /// Inertia weight `w` (default: 0.5).
    pub inertia: f64,
    /// Cognitive coefficient `c1` (default: 1.0).
    pub cognitive: f64,
    /// Social coefficient `c2` (default: 1.0).
    pub social: f64,
    /// Per-component velocity bound. `None` leaves velocities unbounded.
    pub velocity_limit: Option<f64>,
    /// Best-update scheduling (default: asynchronous).
    pub update_mode: UpdateMode,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            particles: 30,
            iterations: 60,
            inertia: 0.5,
            cognitive: 1.0,
            social: 1.0,
            velocity_limit: None,
            update_mode: UpdateMode::Asynchronous,
        }
    }
}

impl PsoConfig {
    /// Sets the swarm size (at least 1).
    pub fn with_particles(mut self, particles: usize) -> Self {
        self.particles = particles.max(1);
        self
    }

    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets inertia, cognitive and social coefficients.
    pub fn with_coefficients(mut self, inertia: f64, cognitive: f64, social: f64) -> Self {
        self.inertia = inertia;
        self.cognitive = cognitive;
        self.social = social;
        self
    }

    /// Bounds each velocity component to `[-limit, limit]`.
    pub fn with_velocity_limit(mut self, limit: f64) -> Self {
        self.velocity_limit = Some(limit.abs());
        self
    }

    /// Sets the update mode.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// Checks that every coefficient is finite.
    ///
    /// # Errors
    /// `SimError::InvalidConfig` listing every bad parameter.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_pso_config(self).map_err(SimError::InvalidConfig)
    }
}

/// Result of one optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmOutcome {
    /// Best assignment found: resource index per task.
    pub assignment: Vec<usize>,
    /// Fitness of `assignment`.
    pub best_fitness: f64,
    /// Best fitness among the initial random positions.
    pub initial_best_fitness: f64,
    /// Global-best fitness after each iteration.
    pub history: Vec<f64>,
}

/// Load-imbalance fitness of an assignment.
///
/// `assignment[i]` is the resource for the task of size `sizes[i]`.
/// Returns the population standard deviation of per-resource
/// `Σ size / rate`.
///
/// # Panics
/// If an entry of `assignment` is not a valid index into `rates`.
pub fn fitness(assignment: &[usize], sizes: &[f64], rates: &[f64]) -> f64 {
    let mut loads = vec![0.0; rates.len()];
    for (&r, &size) in assignment.iter().zip(sizes) {
        loads[r] += size / rates[r];
    }
    std_dev(&loads)
}

fn position_fitness(position: &[f64], sizes: &[f64], rates: &[f64]) -> f64 {
    let mut loads = vec![0.0; rates.len()];
    for (&x, &size) in position.iter().zip(sizes) {
        let r = x as usize;
        loads[r] += size / rates[r];
    }
    std_dev(&loads)
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// First index of the minimum score.
fn argmin(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s < scores[best] {
            best = i;
        }
    }
    best
}

/// Seeded particle swarm optimizer.
///
/// Deterministic for a fixed seed, configuration, and call sequence.
/// The RNG advances across calls, so consecutive batches see different
/// initial swarms.
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    config: PsoConfig,
    rng: SmallRng,
}

impl ParticleSwarm {
    /// Creates an optimizer with its own RNG seeded from `seed`.
    ///
    /// `config` is taken as given. Run [`PsoConfig::validate`] first on
    /// untrusted input: a non-finite coefficient makes positions NaN,
    /// and every NaN position decodes to resource 0.
    pub fn new(config: PsoConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Swarm parameters.
    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    /// Searches for a balanced assignment of `sizes` onto `rates`.
    ///
    /// An empty `sizes` returns an empty assignment without consuming
    /// randomness.
    ///
    /// # Panics
    /// If `rates` is empty while `sizes` is not.
    pub fn optimize(&mut self, sizes: &[f64], rates: &[f64]) -> SwarmOutcome {
        let k = sizes.len();
        let n = rates.len();
        if k == 0 {
            let zero = fitness(&[], sizes, rates);
            return SwarmOutcome {
                assignment: Vec::new(),
                best_fitness: zero,
                initial_best_fitness: zero,
                history: Vec::new(),
            };
        }

        let particles = self.config.particles.max(1);
        let max_index = (n - 1) as f64;

        let mut positions: Vec<Vec<f64>> = (0..particles)
            .map(|_| (0..k).map(|_| self.rng.random_range(0..n) as f64).collect())
            .collect();
        let mut velocities = vec![vec![0.0; k]; particles];

        let mut personal_best = positions.clone();
        let mut personal_scores = self.evaluate_all(&positions, sizes, rates);

        let start = argmin(&personal_scores);
        let mut global_best = personal_best[start].clone();
        let mut global_score = personal_scores[start];
        let initial_best_fitness = global_score;

        let mut history = Vec::with_capacity(self.config.iterations);

        for iteration in 0..self.config.iterations {
            match self.config.update_mode {
                UpdateMode::Asynchronous => {
                    for i in 0..particles {
                        move_particle(
                            &mut self.rng,
                            &self.config,
                            &mut positions[i],
                            &mut velocities[i],
                            &personal_best[i],
                            &global_best,
                            max_index,
                        );
                        let score = position_fitness(&positions[i], sizes, rates);
                        if score < personal_scores[i] {
                            personal_best[i].copy_from_slice(&positions[i]);
                            personal_scores[i] = score;
                            if score < global_score {
                                global_best.copy_from_slice(&positions[i]);
                                global_score = score;
                            }
                        }
                    }
                }
                UpdateMode::Synchronous => {
                    for i in 0..particles {
                        move_particle(
                            &mut self.rng,
                            &self.config,
                            &mut positions[i],
                            &mut velocities[i],
                            &personal_best[i],
                            &global_best,
                            max_index,
                        );
                    }
                    let scores = self.evaluate_all(&positions, sizes, rates);
                    for (i, score) in scores.into_iter().enumerate() {
                        if score < personal_scores[i] {
                            personal_best[i].copy_from_slice(&positions[i]);
                            personal_scores[i] = score;
                            if score < global_score {
                                global_best.copy_from_slice(&positions[i]);
                                global_score = score;
                            }
                        }
                    }
                }
            }

            trace!(iteration, best_fitness = global_score, "pso iteration");
            history.push(global_score);
        }

        SwarmOutcome {
            assignment: global_best.iter().map(|&x| x as usize).collect(),
            best_fitness: global_score,
            initial_best_fitness,
            history,
        }
    }

    fn evaluate_all(&self, positions: &[Vec<f64>], sizes: &[f64], rates: &[f64]) -> Vec<f64> {
        match self.config.update_mode {
            UpdateMode::Asynchronous => positions
                .iter()
                .map(|p| position_fitness(p, sizes, rates))
                .collect(),
            UpdateMode::Synchronous => positions
                .par_iter()
                .map(|p| position_fitness(p, sizes, rates))
                .collect(),
        }
    }
}

/// Applies one velocity and position update to a single particle.
///
/// Draws the full `r1` vector before `r2`.
fn move_particle<R: Rng>(
    rng: &mut R,
    config: &PsoConfig,
    position: &mut [f64],
    velocity: &mut [f64],
    personal_best: &[f64],
    global_best: &[f64],
    max_index: f64,
) {
    let k = position.len();
    let r1: Vec<f64> = (0..k).map(|_| rng.random::<f64>()).collect();
    let r2: Vec<f64> = (0..k).map(|_| rng.random::<f64>()).collect();

    for d in 0..k {
        let mut v = config.inertia * velocity[d]
            + config.cognitive * r1[d] * (personal_best[d] - position[d])
            + config.social * r2[d] * (global_best[d] - position[d]);
        if let Some(limit) = config.velocity_limit {
            v = v.max(-limit).min(limit);
        }
        velocity[d] = v;
        position[d] = (position[d] + v).round_ties_even().clamp(0.0, max_index);
    }
}
