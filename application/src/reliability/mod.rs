//! Reliability wrapper
//!
//! Three layers applied to every external call, innermost first:
//!
//! 1. **Circuit breaker** ([`circuit_registry`]): fail fast while a
//!    dependency is suspected unhealthy
//! 2. **Retry-with-backoff** ([`retry`]): retry transient failures
//! 3. **Error isolation** ([`invoker`]): turn anything left into a failed
//!    [`CallOutcome`](invoker::CallOutcome)

pub mod circuit_registry;
pub mod invoker;
pub mod retry;

pub use circuit_registry::{CircuitBreakerRegistry, CircuitPermit, SharedCircuitBreaker};
pub use invoker::{CallOutcome, ReliableInvoker};
pub use retry::{CallSuccess, call_with_retry};
