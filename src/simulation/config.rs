//! Simulation configuration.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::validation::validate_config;

/// Parameters for one simulation run.
///
/// # Example
///
/// ```
/// use lb_sim::simulation::SimulationConfig;
///
/// let config = SimulationConfig::new(4, 500.0, 0.8, 10.0, 7).with_dt(1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of resources in the pool (default: 6).
    pub num_resources: usize,
    /// Simulated horizon; arrivals stop before it (default: 1000).
    pub horizon: f64,
    /// Mean arrivals per time unit, λ (default: 0.5).
    pub arrival_rate: f64,
    /// Cadence of batched strategy invocations (default: 10).
    pub batch_interval: f64,
    /// Seed for resource rates and the workload (default: 42).
    pub seed: u64,
    /// Tick length (default: 1.0).
    pub dt: f64,
    /// Half-open range `[lo, hi)` resource rates are drawn from
    /// (default: `[10, 30)`).
    pub rate_range: [f64; 2],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_resources: 6,
            horizon: 1000.0,
            arrival_rate: 0.5,
            batch_interval: 10.0,
            seed: 42,
            dt: 1.0,
            rate_range: [10.0, 30.0],
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration with default tick length and rate range.
    pub fn new(
        num_resources: usize,
        horizon: f64,
        arrival_rate: f64,
        batch_interval: f64,
        seed: u64,
    ) -> Self {
        Self {
            num_resources,
            horizon,
            arrival_rate,
            batch_interval,
            seed,
            ..Self::default()
        }
    }

    /// Sets the number of resources.
    pub fn with_num_resources(mut self, num_resources: usize) -> Self {
        self.num_resources = num_resources;
        self
    }

    /// Sets the horizon.
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the arrival rate.
    pub fn with_arrival_rate(mut self, arrival_rate: f64) -> Self {
        self.arrival_rate = arrival_rate;
        self
    }

    /// Sets the batch interval.
    pub fn with_batch_interval(mut self, batch_interval: f64) -> Self {
        self.batch_interval = batch_interval;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the tick length.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Sets the resource rate range `[lo, hi)`.
    pub fn with_rate_range(mut self, lo: f64, hi: f64) -> Self {
        self.rate_range = [lo, hi];
        self
    }

    /// Rate range as a `Range`.
    pub fn rate_range(&self) -> Range<f64> {
        self.rate_range[0]..self.rate_range[1]
    }

    /// Checks every field.
    ///
    /// # Errors
    /// `SimError::InvalidConfig` listing every invalid field.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_config(self).map_err(SimError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.num_resources, 6);
        assert!((config.horizon - 1000.0).abs() < 1e-10);
        assert!((config.arrival_rate - 0.5).abs() < 1e-10);
        assert!((config.batch_interval - 10.0).abs() < 1e-10);
        assert!((config.dt - 1.0).abs() < 1e-10);
        assert_eq!(config.rate_range(), 10.0..30.0);
    }

    #[test]
    fn test_new_keeps_tick_defaults() {
        let config = SimulationConfig::new(3, 50.0, 2.0, 5.0, 9);
        assert_eq!(config.num_resources, 3);
        assert_eq!(config.seed, 9);
        assert!((config.dt - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_validate_wraps_errors() {
        let err = SimulationConfig::default()
            .with_arrival_rate(0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(ref e) if e.len() == 1));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"num_resources": 2, "seed": 5}"#).unwrap();
        assert_eq!(config.num_resources, 2);
        assert_eq!(config.seed, 5);
        assert!((config.horizon - 1000.0).abs() < 1e-10);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SimulationConfig::new(4, 250.0, 1.5, 20.0, 3).with_rate_range(5.0, 15.0);
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
