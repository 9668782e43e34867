//! Progress notification port
//!
//! Defines the interface for reporting progress while a debate runs.

use debate_domain::{ArgumentOutcome, CircuitTransition, RoundRecord, Side};

/// Callback for progress updates during a debate
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default so reporters only implement what they display.
pub trait DebateProgressNotifier: Send + Sync {
    /// Called after the Controller fanned out a round
    fn on_round_start(&self, _round: u32, _max_rounds: u32) {}

    /// Called when a side's result reaches the rendezvous in time
    fn on_argument_ready(&self, _side: Side, _outcome: &ArgumentOutcome) {}

    /// Called when the deadline passed with `side` still missing
    fn on_argument_missing(&self, _side: Side) {}

    /// Called after a round's record was appended
    fn on_round_evaluated(&self, _record: &RoundRecord) {}

    /// Called when synthesis finished; `degraded` is true when the fallback
    /// output was used
    fn on_finalized(&self, _degraded: bool) {}
}

/// Callback for reliability events (retries, breaker transitions)
pub trait ReliabilityObserver: Send + Sync {
    fn on_retry(&self, _dependency: &str, _attempt: u32, _max_retries: u32, _error: &str) {}

    fn on_circuit_transition(&self, _dependency: &str, _transition: CircuitTransition) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DebateProgressNotifier for NoProgress {}

impl ReliabilityObserver for NoProgress {}
