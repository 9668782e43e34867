//! Debate state - the per-debate record.
//!
//! [`DebateState`] is owned by one debate for its whole lifetime and is
//! mutated only through the methods below, which enforce:
//!
//! - `0 <= round <= max_rounds`
//! - `consensus_reached` only becomes true while evaluating a round in which
//!   both sides were ready
//! - at most one [`RoundRecord`] per round, appended in round order
//! - phase changes follow [`DebatePhase::can_transition_to`]

use super::argument::ArgumentOutcome;
use super::phase::DebatePhase;
use super::record::{Rendezvous, RoundRecord};
use super::side::{Side, Sides};
use super::verdict::JudgeVerdict;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Debate identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebateId(String);

impl DebateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DebateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened when a generator result was offered to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stored in the current round's slot
    Recorded,
    /// The slot was already filled this round
    Duplicate,
    /// The result belongs to an earlier round
    Stale,
}

/// Why the debate stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeReason {
    /// The judge accepted the round
    Consensus,
    /// `max_rounds` rounds were played
    RoundLimit,
    /// The deadline passed with neither side delivering
    NoArguments,
}

/// Decision taken after a round was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundDecision {
    Continue,
    Finalize(FinalizeReason),
}

/// Per-debate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    id: DebateId,
    round: u32,
    max_rounds: u32,
    arguments: Sides<Option<ArgumentOutcome>>,
    /// Milliseconds since epoch when the current round started
    round_started_at: Option<u64>,
    history: Vec<RoundRecord>,
    consensus_reached: bool,
    phase: DebatePhase,
    /// Late arguments kept for the next round (carry-forward policy only)
    carried_over: Sides<Option<(u32, String)>>,
    finalize_reason: Option<FinalizeReason>,
}

impl DebateState {
    pub fn new(id: DebateId, max_rounds: u32) -> Result<Self, DomainError> {
        if max_rounds == 0 {
            return Err(DomainError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            id,
            round: 0,
            max_rounds,
            arguments: Sides::default(),
            round_started_at: None,
            history: Vec::new(),
            consensus_reached: false,
            phase: DebatePhase::NotStarted,
            carried_over: Sides::default(),
            finalize_reason: None,
        })
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &DebateId {
        &self.id
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    pub fn round_started_at(&self) -> Option<u64> {
        self.round_started_at
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn last_record(&self) -> Option<&RoundRecord> {
        self.history.last()
    }

    pub fn consensus_reached(&self) -> bool {
        self.consensus_reached
    }

    pub fn finalize_reason(&self) -> Option<FinalizeReason> {
        self.finalize_reason
    }

    pub fn argument(&self, side: Side) -> Option<&ArgumentOutcome> {
        self.arguments.get(side).as_ref()
    }

    /// Ready flag for `side` in the current round.
    pub fn is_ready(&self, side: Side) -> bool {
        self.argument(side).is_some_and(ArgumentOutcome::is_ready)
    }

    pub fn both_ready(&self) -> bool {
        Side::ALL.iter().all(|side| self.is_ready(*side))
    }

    // ==================== Controller operations ====================

    /// Start the next round: bump the counter, clear arguments and readiness,
    /// stamp the start time.
    pub fn begin_round(&mut self, now_millis: u64) -> Result<u32, DomainError> {
        if self.round >= self.max_rounds {
            return Err(DomainError::RoundLimitReached {
                max_rounds: self.max_rounds,
            });
        }
        self.transition(DebatePhase::AwaitingArguments)?;

        self.round += 1;
        self.arguments = Sides::default();
        self.round_started_at = Some(now_millis);
        Ok(self.round)
    }

    // ==================== Manager operations ====================

    /// Offer a generator result tagged with the round it was produced for.
    pub fn record_argument(
        &mut self,
        round: u32,
        side: Side,
        outcome: ArgumentOutcome,
    ) -> Delivery {
        if round != self.round || self.phase != DebatePhase::AwaitingArguments {
            return Delivery::Stale;
        }
        let slot = self.arguments.get_mut(side);
        if slot.is_some() {
            return Delivery::Duplicate;
        }
        *slot = Some(outcome);
        Delivery::Recorded
    }

    /// Keep a late argument so it can stand in if `side` misses the next
    /// deadline too.
    pub fn stash_late_argument(&mut self, side: Side, from_round: u32, text: String) {
        self.carried_over.set(side, Some((from_round, text)));
    }

    /// Close the rendezvous: every side that has not delivered is marked as
    /// timed out (or carried over when a stashed argument exists), and the
    /// debate moves to evaluation.
    pub fn close_rendezvous(&mut self) -> Result<Sides<ArgumentOutcome>, DomainError> {
        self.transition(DebatePhase::Evaluating)?;

        for side in Side::ALL {
            if self.arguments.get(side).is_none() {
                let outcome = match self.carried_over.set(side, None) {
                    Some((from_round, text)) => ArgumentOutcome::CarriedOver { from_round, text },
                    None => ArgumentOutcome::TimedOut,
                };
                self.arguments.set(side, Some(outcome));
            } else if self.is_ready(side) {
                // A fresh argument supersedes anything carried from before.
                self.carried_over.set(side, None);
            }
        }

        Ok(self
            .arguments
            .map(|_, slot| slot.clone().unwrap_or(ArgumentOutcome::TimedOut)))
    }

    /// Record the judge's verdict for the current round and decide what
    /// comes next.
    ///
    /// Consensus counts only when both sides were ready and the verdict
    /// meets `min_quality_score`.
    pub fn complete_round(
        &mut self,
        verdict: &JudgeVerdict,
        min_quality_score: f64,
    ) -> Result<RoundDecision, DomainError> {
        if self.phase != DebatePhase::Evaluating {
            return Err(DomainError::InvalidTransition {
                from: self.phase,
                to: DebatePhase::Continuing,
            });
        }

        let arguments = self
            .arguments
            .map(|_, slot| slot.clone().unwrap_or(ArgumentOutcome::TimedOut));
        let consensus = self.both_ready() && verdict.meets_bar(min_quality_score);

        let record = RoundRecord::new(self.round, &arguments, verdict, consensus);
        let no_arguments = record.rendezvous == Rendezvous::Empty;
        self.history.push(record);
        self.consensus_reached = consensus;

        let decision = if consensus {
            RoundDecision::Finalize(FinalizeReason::Consensus)
        } else if no_arguments {
            RoundDecision::Finalize(FinalizeReason::NoArguments)
        } else if self.round >= self.max_rounds {
            RoundDecision::Finalize(FinalizeReason::RoundLimit)
        } else {
            RoundDecision::Continue
        };

        match decision {
            RoundDecision::Continue => self.transition(DebatePhase::Continuing)?,
            RoundDecision::Finalize(reason) => {
                self.finalize_reason = Some(reason);
                self.transition(DebatePhase::Finalizing)?;
            }
        }
        Ok(decision)
    }

    /// Mark the terminal output as produced.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(DebatePhase::Complete)
    }

    fn transition(&mut self, next: DebatePhase) -> Result<(), DomainError> {
        if !self.phase.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}
