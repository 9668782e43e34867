//! Debate session - everything one running debate owns.
//!
//! A session wraps the [`DebateState`] together with the runtime pieces the
//! state machine itself does not know about: the in-flight generator tasks,
//! the monotonic round deadline, and the terminal output once produced.
//! Dropping a session aborts whatever generator tasks are still running.

use debate_domain::{
    ArgumentOutcome, CallFailure, DebateId, DebateState, FinalizeReason, ResearchContext,
    RoundRecord, Side,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// A generator result tagged with the round and side it was produced for.
#[derive(Debug, Clone)]
pub struct Completion {
    pub round: u32,
    pub side: Side,
    pub outcome: ArgumentOutcome,
}

/// One running debate.
pub struct DebateSession {
    pub(crate) state: DebateState,
    pub(crate) research: Arc<ResearchContext>,
    pub(crate) tasks: JoinSet<Completion>,
    pub(crate) round_deadline: Option<Instant>,
    pub(crate) output: Option<String>,
    pub(crate) degraded: bool,
    pub(crate) failures: Vec<CallFailure>,
}

impl DebateSession {
    pub(crate) fn new(state: DebateState, research: ResearchContext) -> Self {
        Self {
            state,
            research: Arc::new(research),
            tasks: JoinSet::new(),
            round_deadline: None,
            output: None,
            degraded: false,
            failures: Vec::new(),
        }
    }

    pub fn id(&self) -> &DebateId {
        self.state.id()
    }

    pub fn state(&self) -> &DebateState {
        &self.state
    }

    pub fn research(&self) -> &ResearchContext {
        &self.research
    }

    pub fn is_done(&self) -> bool {
        self.state.phase().is_terminal()
    }

    /// Terminal output, once the debate finalized.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Whether the terminal output is the fallback instead of a synthesis.
    pub fn degraded(&self) -> bool {
        self.degraded
    }

    /// Every external call that ended in failure, in the order observed.
    pub fn failures(&self) -> &[CallFailure] {
        &self.failures
    }

    /// Consume a finished session into its result.
    ///
    /// Returns `None` while the debate is still running.
    pub fn into_result(self) -> Option<DebateResult> {
        let output = self.output?;
        Some(DebateResult {
            debate_id: self.state.id().to_string(),
            ticker: self.research.ticker.clone(),
            rounds: self.state.round(),
            consensus_reached: self.state.consensus_reached(),
            finalize_reason: self.state.finalize_reason(),
            output,
            degraded: self.degraded,
            history: self.state.history().to_vec(),
            failures: self.failures,
        })
    }
}

/// Result of a finished debate.
#[derive(Debug, Clone, Serialize)]
pub struct DebateResult {
    pub debate_id: String,
    pub ticker: String,
    /// Rounds played
    pub rounds: u32,
    pub consensus_reached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalize_reason: Option<FinalizeReason>,
    /// Terminal output (never empty)
    pub output: String,
    /// True when `output` is the fallback rather than a synthesis
    pub degraded: bool,
    pub history: Vec<RoundRecord>,
    pub failures: Vec<CallFailure>,
}

impl DebateResult {
    pub fn last_record(&self) -> Option<&RoundRecord> {
        self.history.last()
    }
}
