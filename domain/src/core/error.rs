//! Domain error types

use crate::debate::phase::DebatePhase;
use thiserror::Error;

/// Domain-level errors
///
/// These signal misuse of the debate state machine, never dependency
/// failures: those are values (see `reliability::failure`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid debate configuration: {0}")]
    InvalidConfig(String),

    #[error("Round limit reached ({max_rounds} rounds)")]
    RoundLimitReached { max_rounds: u32 },

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: DebatePhase, to: DebatePhase },
}

impl DomainError {
    /// Check if this error means the debate has used up its rounds
    pub fn is_round_limit(&self) -> bool {
        matches!(self, DomainError::RoundLimitReached { .. })
    }
}
