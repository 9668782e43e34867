//! Process-wide circuit breakers.
//!
//! One [`SharedCircuitBreaker`] exists per dependency name and is shared by
//! every debate that calls that dependency. Transitions are serialized by a
//! mutex around the pure [`CircuitBreaker`] state machine.

use debate_domain::{Admission, CircuitBreaker, CircuitPolicy, CircuitState, CircuitTransition};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::{info, warn};

/// A circuit breaker shared across tasks.
#[derive(Debug)]
pub struct SharedCircuitBreaker {
    dependency: String,
    inner: Mutex<CircuitBreaker>,
}

impl SharedCircuitBreaker {
    pub fn new(dependency: impl Into<String>, policy: CircuitPolicy) -> Self {
        Self {
            dependency: dependency.into(),
            inner: Mutex::new(CircuitBreaker::new(policy)),
        }
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures()
    }

    /// Ask permission to contact the dependency.
    ///
    /// The outcome of an admitted call is reported through the returned
    /// [`CircuitPermit`]. A trial permit dropped without a report re-opens
    /// the circuit.
    pub fn acquire(&self) -> (CircuitPermit<'_>, Option<CircuitTransition>) {
        let (admission, transition) = self.lock().try_acquire(now());
        if let Some(transition) = transition {
            self.log_transition(transition);
        }
        let permit = CircuitPermit {
            breaker: self,
            admission,
            settled: false,
        };
        (permit, transition)
    }

    fn record_success(&self) -> Option<CircuitTransition> {
        let transition = self.lock().record_success();
        if let Some(transition) = transition {
            self.log_transition(transition);
        }
        transition
    }

    fn record_failure(&self) -> Option<CircuitTransition> {
        let transition = self.lock().record_failure(now());
        if let Some(transition) = transition {
            self.log_transition(transition);
        }
        transition
    }

    fn abandon_trial(&self) {
        if let Some(transition) = self.lock().abandon_trial(now()) {
            warn!("Trial call to {} was cancelled", self.dependency);
            self.log_transition(transition);
        }
    }

    fn lock(&self) -> MutexGuard<'_, CircuitBreaker> {
        // The state machine never panics mid-update, so a poisoned lock
        // still holds consistent state.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn log_transition(&self, transition: CircuitTransition) {
        match transition.to {
            CircuitState::Open => warn!(
                "Circuit for {} opened ({} -> {})",
                self.dependency, transition.from, transition.to
            ),
            _ => info!(
                "Circuit for {}: {} -> {}",
                self.dependency, transition.from, transition.to
            ),
        }
    }
}

/// Admission to call a dependency, held for the duration of one attempt.
#[derive(Debug)]
pub struct CircuitPermit<'a> {
    breaker: &'a SharedCircuitBreaker,
    admission: Admission,
    settled: bool,
}

impl CircuitPermit<'_> {
    pub fn admission(&self) -> Admission {
        self.admission
    }

    pub fn record_success(mut self) -> Option<CircuitTransition> {
        self.settled = true;
        self.breaker.record_success()
    }

    pub fn record_failure(mut self) -> Option<CircuitTransition> {
        self.settled = true;
        self.breaker.record_failure()
    }
}

impl Drop for CircuitPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.admission == Admission::Trial {
            self.breaker.abandon_trial();
        }
    }
}

/// Tokio's clock, so paused test time drives recovery timeouts too.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// Registry handing out one breaker per dependency.
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    policy: CircuitPolicy,
    breakers: Mutex<HashMap<String, Arc<SharedCircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(policy: CircuitPolicy) -> Self {
        Self {
            policy,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CircuitPolicy {
        &self.policy
    }

    /// The breaker for `dependency`, created on first use.
    pub fn breaker(&self, dependency: &str) -> Arc<SharedCircuitBreaker> {
        let mut breakers = self
            .breakers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            breakers
                .entry(dependency.to_string())
                .or_insert_with(|| Arc::new(SharedCircuitBreaker::new(dependency, self.policy))),
        )
    }

    /// Current state of every known breaker, sorted by dependency.
    pub fn snapshot(&self) -> Vec<(String, CircuitState, u32)> {
        let breakers = self
            .breakers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut states: Vec<_> = breakers
            .values()
            .map(|b| (b.dependency().to_string(), b.state(), b.consecutive_failures()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_registry_shares_breaker_per_dependency() {
        let registry = CircuitBreakerRegistry::default();
        let a = registry.breaker("judge-llm");
        let b = registry.breaker("judge-llm");
        let c = registry.breaker("bull-llm");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_breaker_opens_and_recovers() {
        let registry = CircuitBreakerRegistry::new(CircuitPolicy {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(60),
        });
        let breaker = registry.breaker("judge-llm");

        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        let transition = breaker.record_failure().unwrap();
        assert_eq!(transition.to, CircuitState::Open);

        let (permit, _) = breaker.acquire();
        assert!(permit.admission().is_rejected());
        drop(permit);

        tokio::time::advance(Duration::from_secs(60)).await;
        let (permit, transition) = breaker.acquire();
        assert_eq!(permit.admission(), Admission::Trial);
        assert_eq!(transition.unwrap().to, CircuitState::HalfOpen);

        permit.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(
            registry.snapshot(),
            vec![("judge-llm".to_string(), CircuitState::Closed, 0)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_trial_permit_reopens_circuit() {
        let breaker = SharedCircuitBreaker::new(
            "bull-llm",
            CircuitPolicy {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(10),
            },
        );
        breaker.record_failure();

        tokio::time::advance(Duration::from_secs(11)).await;
        let (permit, _) = breaker.acquire();
        assert_eq!(permit.admission(), Admission::Trial);
        drop(permit);
        assert_eq!(breaker.state(), CircuitState::Open);

        let (permit, _) = breaker.acquire();
        assert!(permit.admission().is_rejected());
        drop(permit);

        tokio::time::advance(Duration::from_secs(10)).await;
        let (permit, _) = breaker.acquire();
        assert_eq!(permit.admission(), Admission::Trial);
        permit.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_dropped_allowed_permit_changes_nothing() {
        let breaker = SharedCircuitBreaker::new("judge-llm", CircuitPolicy::default());
        let (permit, _) = breaker.acquire();
        assert_eq!(permit.admission(), Admission::Allowed);
        drop(permit);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(), 0);
    }
}
