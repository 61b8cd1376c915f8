//! Engine error model.

use thiserror::Error;

/// Result type used across the analytics engine.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Analytics-level error.
///
/// Only deterministic input failures live here. Degenerate inputs that the
/// algorithms can absorb (zero-variance columns, empty batches) are not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Not enough records/points for the requested computation.
    ///
    /// Callers surface this as a user-visible "not enough data" condition.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Input failed validation (mixed record kinds, ragged vectors, NaN, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A period key was malformed or out of range.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Engine configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A result could not be encoded for downstream consumers.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalyticsError {
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_period(msg: impl Into<String>) -> Self {
        Self::InvalidPeriod(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller should present this as "not enough data".
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = AnalyticsError::insufficient_data("need at least 2 points, got 1");
        assert_eq!(err.to_string(), "insufficient data: need at least 2 points, got 1");
        assert!(err.is_insufficient_data());
        assert!(!AnalyticsError::validation("x").is_insufficient_data());
    }
}
