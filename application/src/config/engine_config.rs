//! Engine configuration for the debate loop and reliability control.
//!
//! [`EngineConfig`] is built once (from file config, CLI flags or code) and
//! handed to the engine's constructor. Nothing re-reads configuration while
//! a debate is running.

use debate_domain::{CircuitPolicy, DomainError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// What to do with a generator result that arrives after its round's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateArgumentPolicy {
    /// Drop it.
    #[default]
    Discard,
    /// Keep it as a stand-in for the same side if that side misses the next
    /// deadline too.
    CarryForward,
}

impl FromStr for LateArgumentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "discard" => Ok(LateArgumentPolicy::Discard),
            "carry_forward" | "carry" => Ok(LateArgumentPolicy::CarryForward),
            other => Err(format!("unknown late argument policy: {}", other)),
        }
    }
}

/// Retry-with-backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Delay before retry `n` (0-based) is `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the retry that follows failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Total attempts a call may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Debate engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Round budget per debate.
    pub max_rounds: u32,
    /// Rendezvous deadline, measured from round start.
    pub argument_timeout: Duration,
    /// Consensus below this judge score does not end the debate.
    pub min_quality_score: f64,
    /// Handling of arguments that miss their round.
    pub late_arguments: LateArgumentPolicy,
    /// Retry policy for every external call.
    pub retry: RetryPolicy,
    /// Circuit breaker thresholds for every dependency.
    pub circuit: CircuitPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            argument_timeout: Duration::from_secs(30),
            min_quality_score: 0.0,
            late_arguments: LateArgumentPolicy::Discard,
            retry: RetryPolicy::default(),
            circuit: CircuitPolicy::default(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_argument_timeout(mut self, timeout: Duration) -> Self {
        self.argument_timeout = timeout;
        self
    }

    pub fn with_min_quality_score(mut self, score: f64) -> Self {
        self.min_quality_score = score;
        self
    }

    pub fn with_late_arguments(mut self, policy: LateArgumentPolicy) -> Self {
        self.late_arguments = policy;
        self
    }

    pub fn with_retry(mut self, max_retries: u32, backoff_base: Duration) -> Self {
        self.retry = RetryPolicy {
            max_retries,
            backoff_base,
        };
        self
    }

    pub fn with_circuit(mut self, failure_threshold: u32, recovery_timeout: Duration) -> Self {
        self.circuit = CircuitPolicy {
            failure_threshold,
            recovery_timeout,
        };
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_rounds == 0 {
            return Err(DomainError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.argument_timeout.is_zero() {
            return Err(DomainError::InvalidConfig(
                "argument_timeout cannot be 0".to_string(),
            ));
        }
        if self.circuit.failure_threshold == 0 {
            return Err(DomainError::InvalidConfig(
                "circuit_failure_threshold must be at least 1".to_string(),
            ));
        }
        if !(0.0..=10.0).contains(&self.min_quality_score) {
            return Err(DomainError::InvalidConfig(format!(
                "min_quality_score must be within 0-10, got {}",
                self.min_quality_score
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.argument_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_base, Duration::from_secs(1));
        assert_eq!(config.circuit.failure_threshold, 3);
        assert_eq!(config.circuit.recovery_timeout, Duration::from_secs(60));
        assert_eq!(config.late_arguments, LateArgumentPolicy::Discard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_max_rounds(1)
            .with_argument_timeout(Duration::from_secs(5))
            .with_retry(0, Duration::from_millis(10))
            .with_circuit(5, Duration::from_secs(1));

        assert_eq!(config.max_rounds, 1);
        assert_eq!(config.argument_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts(), 1);
        assert_eq!(config.circuit.failure_threshold, 5);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_base: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for(64) >= policy.delay_for(31));
    }

    #[test]
    fn test_validate_rejects_zero_rounds_and_timeout() {
        assert!(EngineConfig::default().with_max_rounds(0).validate().is_err());
        assert!(
            EngineConfig::default()
                .with_argument_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            EngineConfig::default()
                .with_min_quality_score(11.0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_late_policy_from_str() {
        assert_eq!(
            "carry-forward".parse::<LateArgumentPolicy>().unwrap(),
            LateArgumentPolicy::CarryForward
        );
        assert_eq!(
            "Discard".parse::<LateArgumentPolicy>().unwrap(),
            LateArgumentPolicy::Discard
        );
        assert!("keep".parse::<LateArgumentPolicy>().is_err());
    }
}
