//! Failure taxonomy for external calls.
//!
//! Every dependency error is classified into a [`FailureKind`] before the
//! reliability layer decides what to do with it. Callers above the
//! reliability layer only ever see a [`CallFailure`] descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a failed external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network drop, rate limit, protocol error. Worth retrying.
    Transient,
    /// Malformed request, authentication failure. Never retried.
    Permanent,
    /// The dependency's circuit breaker rejected the call without contacting it.
    CircuitOpen,
    /// The dependency future panicked.
    Panicked,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::Permanent => "permanent",
            FailureKind::CircuitOpen => "circuit_open",
            FailureKind::Panicked => "panicked",
        }
    }

    /// Only transient failures are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Transient)
    }

    /// Whether the failure counts against the dependency's circuit breaker.
    ///
    /// A fail-fast rejection never reached the dependency, so it is not
    /// evidence about the dependency's health.
    pub fn counts_against_circuit(&self) -> bool {
        !matches!(self, FailureKind::CircuitOpen)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptor of a call that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFailure {
    /// Dependency the call was made against
    pub dependency: String,
    /// Classification of the last error seen
    pub kind: FailureKind,
    /// Last error message
    pub message: String,
    /// How many times the dependency was actually contacted
    pub attempts: u32,
}

impl CallFailure {
    pub fn new(
        dependency: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            dependency: dependency.into(),
            kind,
            message: message.into(),
            attempts,
        }
    }

    /// Short text suitable for placing where an argument would have been.
    pub fn placeholder(&self) -> String {
        format!(
            "[{} unavailable: {} failure after {} attempt(s): {}]",
            self.dependency, self.kind, self.attempts, self.message
        )
    }
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} call failed ({}, {} attempt(s)): {}",
            self.dependency, self.kind, self.attempts, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(FailureKind::Transient.is_retryable());
        assert!(!FailureKind::Permanent.is_retryable());
        assert!(!FailureKind::CircuitOpen.is_retryable());
        assert!(!FailureKind::Panicked.is_retryable());
    }

    #[test]
    fn test_circuit_open_does_not_count_against_circuit() {
        assert!(!FailureKind::CircuitOpen.counts_against_circuit());
        assert!(FailureKind::Transient.counts_against_circuit());
        assert!(FailureKind::Panicked.counts_against_circuit());
    }

    #[test]
    fn test_placeholder_mentions_dependency_and_kind() {
        let failure = CallFailure::new("judge", FailureKind::Permanent, "bad request", 1);
        let text = failure.placeholder();
        assert!(text.contains("judge"));
        assert!(text.contains("permanent"));
        assert!(text.starts_with('['));
    }
}
