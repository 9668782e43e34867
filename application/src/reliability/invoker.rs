//! Error isolation, the outermost reliability layer.
//!
//! [`ReliableInvoker::invoke`] runs a generator through retry and circuit
//! breaking and always returns a [`CallOutcome`]. Whatever the inner layers
//! did not resolve (including a panic escaping them) becomes a failed
//! outcome with placeholder text, so the Controller and Manager never see
//! an error from a dependency.

use super::circuit_registry::CircuitBreakerRegistry;
use super::retry::{call_with_retry, panic_message};
use crate::config::RetryPolicy;
use crate::ports::argument_generator::{ArgumentGenerator, GenerationRequest};
use crate::ports::progress::{NoProgress, ReliabilityObserver};
use debate_domain::{ArgumentOutcome, CallFailure, FailureKind};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// `{text, succeeded}`-shaped result of one logical external call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallOutcome {
    /// Generated text, or placeholder text on failure
    pub text: String,
    pub succeeded: bool,
    /// Times the dependency was contacted
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CallFailure>,
}

impl CallOutcome {
    pub fn success(text: String, attempts: u32) -> Self {
        Self {
            text,
            succeeded: true,
            attempts,
            failure: None,
        }
    }

    pub fn failed(failure: CallFailure) -> Self {
        Self {
            text: failure.placeholder(),
            succeeded: false,
            attempts: failure.attempts,
            failure: Some(failure),
        }
    }

    /// Retries beyond the first attempt.
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// The argument this outcome represents for an advocate.
    pub fn into_argument(self) -> ArgumentOutcome {
        match self.failure {
            Some(failure) => ArgumentOutcome::failed(failure),
            None => ArgumentOutcome::ready(self.text, self.attempts),
        }
    }
}

/// Retry + circuit breaker + error isolation for every external call.
pub struct ReliableInvoker {
    retry: RetryPolicy,
    breakers: Arc<CircuitBreakerRegistry>,
    observer: Arc<dyn ReliabilityObserver>,
}

impl ReliableInvoker {
    pub fn new(retry: RetryPolicy, breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self {
            retry,
            breakers,
            observer: Arc::new(NoProgress),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ReliabilityObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// Invoke `generator` for `request`. Never fails.
    pub async fn invoke(
        &self,
        generator: &dyn ArgumentGenerator,
        request: &GenerationRequest,
    ) -> CallOutcome {
        let dependency = generator.dependency().to_string();
        let breaker = self.breakers.breaker(&dependency);

        let call = call_with_retry(&self.retry, &breaker, self.observer.as_ref(), || {
            generator.invoke(request)
        });

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(success)) => CallOutcome::success(success.text, success.attempts),
            Ok(Err(failure)) => CallOutcome::failed(failure),
            Err(panic) => CallOutcome::failed(CallFailure::new(
                dependency,
                FailureKind::Panicked,
                panic_message(panic.as_ref()),
                0,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::argument_generator::{GeneratorError, Role};
    use async_trait::async_trait;
    use debate_domain::{CircuitPolicy, ResearchContext};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FailingGenerator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ArgumentGenerator for FailingGenerator {
        fn dependency(&self) -> &str {
            "judge-llm"
        }

        async fn invoke(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GeneratorError::Connection("refused".into()))
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            debate_id: "d".to_string(),
            role: Role::Judge,
            round: 1,
            max_rounds: 1,
            research: Arc::new(ResearchContext::new("AAPL")),
            history: Vec::new(),
            arguments: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_becomes_outcome_with_placeholder() {
        let registry = Arc::new(CircuitBreakerRegistry::new(CircuitPolicy {
            failure_threshold: 10,
            recovery_timeout: Duration::from_secs(60),
        }));
        let invoker = ReliableInvoker::new(
            RetryPolicy {
                max_retries: 1,
                backoff_base: Duration::from_millis(100),
            },
            registry,
        );
        let generator = FailingGenerator {
            calls: AtomicU32::new(0),
        };

        let outcome = invoker.invoke(&generator, &request()).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
        assert!(outcome.text.contains("judge-llm unavailable"));
        assert_eq!(outcome.failure.unwrap().kind, FailureKind::Transient);
    }

    #[test]
    fn test_into_argument() {
        let ready = CallOutcome::success("rates will fall".into(), 2).into_argument();
        assert_eq!(ready, ArgumentOutcome::ready("rates will fall", 2));

        let failure = CallFailure::new("bull-llm", FailureKind::Permanent, "401", 1);
        let failed = CallOutcome::failed(failure.clone()).into_argument();
        assert!(failed.is_ready());
        assert_eq!(failed.failure(), Some(&failure));
    }

    #[test]
    fn test_retries_count() {
        assert_eq!(CallOutcome::success("x".into(), 4).retries(), 3);
        assert_eq!(CallOutcome::success("x".into(), 1).retries(), 0);
    }
}
