//! Circuit breaker state machine.
//!
//! Tracks consecutive failures for one dependency. When failures reach the
//! threshold the circuit *opens* and calls are rejected without contacting
//! the dependency. Once the recovery timeout has elapsed since it opened,
//! the circuit goes *half-open* and admits exactly one trial call whose
//! outcome closes or re-opens it.
//!
//! This type is pure: the caller supplies the current [`Instant`] so that
//! transitions are deterministic under test. Sharing across tasks is the
//! application layer's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    /// Healthy: calls allowed.
    Closed,
    /// Tripped: calls rejected until the recovery timeout expires.
    Open,
    /// Recovery timeout expired: one trial call allowed.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Thresholds for a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitPolicy {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Time after opening before a trial call is admitted.
    pub recovery_timeout: Duration,
}

impl Default for CircuitPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(60),
        }
    }
}

/// Answer to "may I call the dependency now?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed, call normally.
    Allowed,
    /// Circuit half-open and this caller holds the single trial slot.
    Trial,
    /// Fail fast. `retry_in` is the remaining recovery time (zero when a
    /// trial call is already in flight).
    Rejected { retry_in: Duration },
}

impl Admission {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected { .. })
    }
}

/// A state change, reported so callers can log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitTransition {
    pub from: CircuitState,
    pub to: CircuitState,
}

/// Per-dependency circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    policy: CircuitPolicy,
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

impl CircuitBreaker {
    pub fn new(policy: CircuitPolicy) -> Self {
        Self {
            policy,
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trial_in_flight: false,
        }
    }

    pub fn policy(&self) -> &CircuitPolicy {
        &self.policy
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn opened_at(&self) -> Option<Instant> {
        self.opened_at
    }

    /// Ask to make a call at `now`.
    ///
    /// May move `Open → HalfOpen` when the recovery timeout has elapsed; the
    /// caller that triggers that move receives [`Admission::Trial`].
    pub fn try_acquire(&mut self, now: Instant) -> (Admission, Option<CircuitTransition>) {
        match self.state {
            CircuitState::Closed => (Admission::Allowed, None),
            CircuitState::Open => {
                let opened_at = self.opened_at.unwrap_or(now);
                let elapsed = now.saturating_duration_since(opened_at);
                if elapsed >= self.policy.recovery_timeout {
                    self.trial_in_flight = true;
                    let transition = self.transition_to(CircuitState::HalfOpen);
                    (Admission::Trial, transition)
                } else {
                    let retry_in = self.policy.recovery_timeout - elapsed;
                    (Admission::Rejected { retry_in }, None)
                }
            }
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    (
                        Admission::Rejected {
                            retry_in: Duration::ZERO,
                        },
                        None,
                    )
                } else {
                    self.trial_in_flight = true;
                    (Admission::Trial, None)
                }
            }
        }
    }

    /// Record a successful call. Resets the failure counter and closes a
    /// half-open circuit.
    pub fn record_success(&mut self) -> Option<CircuitTransition> {
        self.consecutive_failures = 0;
        match self.state {
            CircuitState::HalfOpen => {
                self.trial_in_flight = false;
                self.opened_at = None;
                self.transition_to(CircuitState::Closed)
            }
            // A call admitted before the circuit opened may still succeed;
            // the counter reset is all it earns.
            CircuitState::Closed | CircuitState::Open => None,
        }
    }

    /// Record a failed call made at `now`.
    pub fn record_failure(&mut self, now: Instant) -> Option<CircuitTransition> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        match self.state {
            CircuitState::HalfOpen => {
                self.trial_in_flight = false;
                self.opened_at = Some(now);
                self.transition_to(CircuitState::Open)
            }
            CircuitState::Closed if self.consecutive_failures >= self.policy.failure_threshold => {
                self.opened_at = Some(now);
                self.transition_to(CircuitState::Open)
            }
            CircuitState::Closed | CircuitState::Open => None,
        }
    }

    /// Release a trial that ended without reporting an outcome (its caller
    /// was cancelled). The circuit re-opens as if the trial had failed, so
    /// another trial is admitted after the next recovery timeout.
    ///
    /// No-op unless a trial is in flight.
    pub fn abandon_trial(&mut self, now: Instant) -> Option<CircuitTransition> {
        if self.state != CircuitState::HalfOpen || !self.trial_in_flight {
            return None;
        }
        self.trial_in_flight = false;
        self.opened_at = Some(now);
        self.transition_to(CircuitState::Open)
    }

    fn transition_to(&mut self, to: CircuitState) -> Option<CircuitTransition> {
        let from = self.state;
        self.state = to;
        (from != to).then_some(CircuitTransition { from, to })
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(threshold: u32, recovery_secs: u64) -> CircuitPolicy {
        CircuitPolicy {
            failure_threshold: threshold,
            recovery_timeout: Duration::from_secs(recovery_secs),
        }
    }

    #[test]
    fn test_circuit_starts_closed() {
        let mut cb = CircuitBreaker::default();
        assert_eq!(cb.state(), CircuitState::Closed);
        let (admission, _) = cb.try_acquire(Instant::now());
        assert_eq!(admission, Admission::Allowed);
    }

    #[test]
    fn test_circuit_opens_at_threshold() {
        let mut cb = CircuitBreaker::new(policy(3, 60));
        let now = Instant::now();

        assert!(cb.record_failure(now).is_none());
        assert!(cb.record_failure(now).is_none());
        assert_eq!(cb.state(), CircuitState::Closed);

        let transition = cb.record_failure(now).unwrap();
        assert_eq!(transition.from, CircuitState::Closed);
        assert_eq!(transition.to, CircuitState::Open);
        assert_eq!(cb.opened_at(), Some(now));

        let (admission, _) = cb.try_acquire(now + Duration::from_secs(1));
        assert_eq!(
            admission,
            Admission::Rejected {
                retry_in: Duration::from_secs(59)
            }
        );
    }

    #[test]
    fn test_success_resets_counter() {
        let mut cb = CircuitBreaker::new(policy(3, 60));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);
        cb.record_success();
        assert_eq!(cb.consecutive_failures(), 0);

        cb.record_failure(now);
        cb.record_failure(now);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_admits_exactly_one_trial() {
        let mut cb = CircuitBreaker::new(policy(1, 10));
        let start = Instant::now();
        cb.record_failure(start);

        let later = start + Duration::from_secs(10);
        let (first, transition) = cb.try_acquire(later);
        assert_eq!(first, Admission::Trial);
        assert_eq!(transition.unwrap().to, CircuitState::HalfOpen);

        let (second, _) = cb.try_acquire(later);
        assert!(second.is_rejected());
    }

    #[test]
    fn test_trial_success_closes() {
        let mut cb = CircuitBreaker::new(policy(1, 10));
        let start = Instant::now();
        cb.record_failure(start);
        cb.try_acquire(start + Duration::from_secs(11));

        let transition = cb.record_success().unwrap();
        assert_eq!(transition.to, CircuitState::Closed);
        assert!(cb.opened_at().is_none());
        let (admission, _) = cb.try_acquire(start + Duration::from_secs(11));
        assert_eq!(admission, Admission::Allowed);
    }

    #[test]
    fn test_trial_failure_reopens_with_fresh_timestamp() {
        let mut cb = CircuitBreaker::new(policy(1, 10));
        let start = Instant::now();
        cb.record_failure(start);

        let trial_at = start + Duration::from_secs(12);
        cb.try_acquire(trial_at);
        let transition = cb.record_failure(trial_at).unwrap();
        assert_eq!(transition.from, CircuitState::HalfOpen);
        assert_eq!(transition.to, CircuitState::Open);
        assert_eq!(cb.opened_at(), Some(trial_at));

        // The recovery clock restarted at the trial failure.
        let (admission, _) = cb.try_acquire(trial_at + Duration::from_secs(5));
        assert!(admission.is_rejected());
    }

    #[test]
    fn test_late_success_while_open_stays_open() {
        let mut cb = CircuitBreaker::new(policy(1, 60));
        let now = Instant::now();
        cb.record_failure(now);
        assert!(cb.record_success().is_none());
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_abandoned_trial_reopens_circuit() {
        let mut cb = CircuitBreaker::new(policy(1, 10));
        let start = Instant::now();
        cb.record_failure(start);

        let later = start + Duration::from_secs(10);
        let (admission, _) = cb.try_acquire(later);
        assert_eq!(admission, Admission::Trial);

        let transition = cb.abandon_trial(later).unwrap();
        assert_eq!(transition.from, CircuitState::HalfOpen);
        assert_eq!(transition.to, CircuitState::Open);
        assert_eq!(cb.opened_at(), Some(later));

        // A fresh trial is admitted once the recovery timeout elapses again.
        let (admission, _) = cb.try_acquire(later + Duration::from_secs(10));
        assert_eq!(admission, Admission::Trial);
    }

    #[test]
    fn test_abandon_without_trial_is_noop() {
        let mut cb = CircuitBreaker::new(policy(1, 10));
        let now = Instant::now();
        assert!(cb.abandon_trial(now).is_none());
        assert_eq!(cb.state(), CircuitState::Closed);

        cb.record_failure(now);
        assert!(cb.abandon_trial(now).is_none());
        assert_eq!(cb.state(), CircuitState::Open);
    }
}
