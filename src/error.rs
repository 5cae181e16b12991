//! Crate error type.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by simulation setup and result sinks.
///
/// Configuration errors are fatal and never retried. The tick loop
/// itself has no failure modes.
#[derive(Debug, Error)]
pub enum SimError {
    /// One or more configuration fields are invalid.
    #[error("invalid configuration: {}", join_messages(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// An explicit resource rate is not strictly positive.
    #[error("resource {index} has invalid rate {rate}")]
    InvalidResourceRate {
        /// Resource index.
        index: usize,
        /// Offending rate.
        rate: f64,
    },

    /// The arrival distribution could not be constructed.
    #[error("arrival distribution: {0}")]
    Distribution(String),

    /// Writing results failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding results as CSV failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_config_message_joins_all() {
        let err = SimError::InvalidConfig(vec![
            ValidationError::new(
                ValidationErrorKind::NonPositiveHorizon,
                "horizon must be > 0",
            ),
            ValidationError::new(
                ValidationErrorKind::NonPositiveArrivalRate,
                "arrival rate must be > 0",
            ),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: horizon must be > 0; arrival rate must be > 0"
        );
    }

    #[test]
    fn test_rate_error_message() {
        let err = SimError::InvalidResourceRate {
            index: 3,
            rate: -1.0,
        };
        assert_eq!(err.to_string(), "resource 3 has invalid rate -1");
    }
}
