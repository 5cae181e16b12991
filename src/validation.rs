//! Input validation for simulation configurations.
//!
//! Checks every numeric parameter before a simulation is built and
//! reports all problems at once. Detects:
//! - Empty resource pools
//! - Non-positive horizon, arrival rate, batch interval, or tick
//! - Rate ranges that could draw a non-positive rate
//! - Non-finite swarm coefficients or velocity bounds

use crate::simulation::SimulationConfig;
use crate::strategy::PsoConfig;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The pool would have no resources.
    NonPositiveResourceCount,
    /// Horizon is zero, negative, or not finite.
    NonPositiveHorizon,
    /// Arrival rate is zero, negative, or not finite.
    NonPositiveArrivalRate,
    /// Batch interval is zero, negative, or not finite.
    NonPositiveBatchInterval,
    /// Tick length is zero, negative, or not finite.
    NonPositiveTick,
    /// Rate range is empty or admits non-positive rates.
    InvalidRateRange,
    /// A swarm coefficient is NaN or infinite.
    NonFiniteCoefficient,
    /// Velocity bound is NaN.
    InvalidVelocityLimit,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Validates a simulation configuration.
///
/// Checks:
/// 1. At least one resource
/// 2. Horizon > 0
/// 3. Arrival rate > 0
/// 4. Batch interval > 0
/// 5. Tick length > 0
/// 6. Rate range is `[lo, hi)` with `0 < lo < hi`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &SimulationConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.num_resources == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveResourceCount,
            "resource count must be at least 1",
        ));
    }

    if !positive(config.horizon) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveHorizon,
            format!("horizon must be > 0, got {}", config.horizon),
        ));
    }

    if !positive(config.arrival_rate) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveArrivalRate,
            format!("arrival rate must be > 0, got {}", config.arrival_rate),
        ));
    }

    if !positive(config.batch_interval) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveBatchInterval,
            format!("batch interval must be > 0, got {}", config.batch_interval),
        ));
    }

    if !positive(config.dt) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveTick,
            format!("tick length must be > 0, got {}", config.dt),
        ));
    }

    let [lo, hi] = config.rate_range;
    if !(positive(lo) && hi.is_finite() && lo < hi) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRateRange,
            format!("rate range must satisfy 0 < lo < hi, got [{lo}, {hi})"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates swarm parameters.
///
/// Inertia, cognitive and social coefficients must be finite; a NaN
/// coefficient would turn every particle position into NaN. The
/// velocity bound, when set, must not be NaN.
pub fn validate_pso_config(config: &PsoConfig) -> ValidationResult {
    let mut errors = Vec::new();

    for (name, value) in [
        ("inertia", config.inertia),
        ("cognitive", config.cognitive),
        ("social", config.social),
    ] {
        if !value.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonFiniteCoefficient,
                format!("{name} coefficient must be finite, got {value}"),
            ));
        }
    }

    if let Some(limit) = config.velocity_limit {
        if limit.is_nan() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidVelocityLimit,
                "velocity limit must be a number",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
