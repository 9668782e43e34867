//! Retry-with-backoff around a circuit-guarded call.
//!
//! Each attempt first asks the dependency's breaker for admission, then
//! contacts the dependency and reports the result back to the breaker
//! through the attempt's permit. Dropping the call mid-attempt releases a
//! half-open trial instead of leaving it in flight.
//! Transient failures are retried after `backoff_base * 2^attempt`;
//! permanent failures, panics and circuit rejections end the call at once.

use super::circuit_registry::SharedCircuitBreaker;
use crate::config::RetryPolicy;
use crate::ports::argument_generator::GeneratorError;
use crate::ports::progress::ReliabilityObserver;
use debate_domain::{Admission, CallFailure, FailureKind};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

/// A call that eventually succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSuccess {
    pub text: String,
    /// Times the dependency was contacted (1 = no retries)
    pub attempts: u32,
}

/// Run `op` under `policy`, guarded by `breaker`.
pub async fn call_with_retry<F, Fut>(
    policy: &RetryPolicy,
    breaker: &SharedCircuitBreaker,
    observer: &dyn ReliabilityObserver,
    mut op: F,
) -> Result<CallSuccess, CallFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, GeneratorError>>,
{
    let dependency = breaker.dependency();
    let mut attempts = 0u32;

    loop {
        let (permit, transition) = breaker.acquire();
        if let Some(transition) = transition {
            observer.on_circuit_transition(dependency, transition);
        }
        if let Admission::Rejected { retry_in } = permit.admission() {
            debug!(
                "Circuit for {} is open, failing fast (retry in {:?})",
                dependency, retry_in
            );
            return Err(CallFailure::new(
                dependency,
                FailureKind::CircuitOpen,
                format!("circuit open, retry in {}s", retry_in.as_secs()),
                attempts,
            ));
        }

        let attempt = attempts;
        attempts += 1;

        let (kind, message) = match AssertUnwindSafe(op()).catch_unwind().await {
            Ok(Ok(text)) => {
                if let Some(transition) = permit.record_success() {
                    observer.on_circuit_transition(dependency, transition);
                }
                return Ok(CallSuccess { text, attempts });
            }
            Ok(Err(e)) => (e.kind(), e.to_string()),
            Err(panic) => (FailureKind::Panicked, panic_message(panic.as_ref())),
        };

        if let Some(transition) = permit.record_failure() {
            observer.on_circuit_transition(dependency, transition);
        }

        if !kind.is_retryable() || attempts >= policy.max_attempts() {
            warn!(
                "{} call failed after {} attempt(s) ({}): {}",
                dependency, attempts, kind, message
            );
            return Err(CallFailure::new(dependency, kind, message, attempts));
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "{} call failed ({}), retry {}/{} in {:?}: {}",
            dependency,
            kind,
            attempt + 1,
            policy.max_retries,
            delay,
            message
        );
        observer.on_retry(dependency, attempt + 1, policy.max_retries, &message);
        tokio::time::sleep(delay).await;
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
