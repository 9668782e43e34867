//! Debate phase state machine.
//!
//! ```text
//! NotStarted ─▶ AwaitingArguments ─▶ Evaluating ─┬─▶ Continuing ─▶ AwaitingArguments
//!                                                └─▶ Finalizing ─▶ Complete
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a debate is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Created, no round started yet
    #[default]
    NotStarted,
    /// Generators fanned out, waiting at the rendezvous
    AwaitingArguments,
    /// Judge is evaluating the round
    Evaluating,
    /// Round evaluated, another round will start
    Continuing,
    /// Debate over, terminal output being synthesized
    Finalizing,
    /// Terminal output produced
    Complete,
}

/// Which component acts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Debate Controller starts a round
    StartRound,
    /// Research Manager rendezvouses and judges
    EvaluateRound,
    /// Research Manager synthesizes the terminal output
    Finalize,
    /// Nothing left to do
    Done,
}

impl DebatePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebatePhase::NotStarted => "not_started",
            DebatePhase::AwaitingArguments => "awaiting_arguments",
            DebatePhase::Evaluating => "evaluating",
            DebatePhase::Continuing => "continuing",
            DebatePhase::Finalizing => "finalizing",
            DebatePhase::Complete => "complete",
        }
    }

    /// Typed transition table.
    pub fn can_transition_to(&self, next: DebatePhase) -> bool {
        use DebatePhase::*;
        matches!(
            (self, next),
            (NotStarted, AwaitingArguments)
                | (AwaitingArguments, Evaluating)
                | (Evaluating, Continuing)
                | (Evaluating, Finalizing)
                | (Continuing, AwaitingArguments)
                | (Finalizing, Complete)
        )
    }

    pub fn next_step(&self) -> NextStep {
        match self {
            DebatePhase::NotStarted | DebatePhase::Continuing => NextStep::StartRound,
            DebatePhase::AwaitingArguments | DebatePhase::Evaluating => NextStep::EvaluateRound,
            DebatePhase::Finalizing => NextStep::Finalize,
            DebatePhase::Complete => NextStep::Done,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DebatePhase::Complete)
    }
}

impl fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use DebatePhase::*;
        let path = [
            NotStarted,
            AwaitingArguments,
            Evaluating,
            Continuing,
            AwaitingArguments,
            Evaluating,
            Finalizing,
            Complete,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_illegal_transitions() {
        use DebatePhase::*;
        assert!(!NotStarted.can_transition_to(Evaluating));
        assert!(!AwaitingArguments.can_transition_to(Finalizing));
        assert!(!Complete.can_transition_to(AwaitingArguments));
        assert!(!Continuing.can_transition_to(Finalizing));
    }

    #[test]
    fn test_next_step() {
        assert_eq!(DebatePhase::NotStarted.next_step(), NextStep::StartRound);
        assert_eq!(DebatePhase::Continuing.next_step(), NextStep::StartRound);
        assert_eq!(
            DebatePhase::AwaitingArguments.next_step(),
            NextStep::EvaluateRound
        );
        assert_eq!(DebatePhase::Finalizing.next_step(), NextStep::Finalize);
        assert_eq!(DebatePhase::Complete.next_step(), NextStep::Done);
    }
}
