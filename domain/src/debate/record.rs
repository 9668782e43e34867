//! Round records - the debate's audit trail.

use super::argument::{ArgumentOutcome, ArgumentStatus};
use super::side::{Side, Sides};
use super::verdict::JudgeVerdict;
use serde::{Deserialize, Serialize};

/// How the rendezvous for a round ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rendezvous {
    /// Both sides were ready before the deadline.
    Complete,
    /// The deadline passed with exactly these sides missing.
    Partial { missing: Vec<Side> },
    /// The deadline passed with both sides missing.
    Empty,
}

impl Rendezvous {
    /// Classify from the two outcomes gathered at the deadline.
    pub fn from_outcomes(outcomes: &Sides<ArgumentOutcome>) -> Self {
        let missing: Vec<Side> = outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_ready())
            .map(|(side, _)| side)
            .collect();

        match missing.len() {
            0 => Rendezvous::Complete,
            2 => Rendezvous::Empty,
            _ => Rendezvous::Partial { missing },
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Rendezvous::Complete)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Rendezvous::Empty)
    }
}

/// One completed debate round.
///
/// Immutable once appended to the history. Holds no timestamps, so replaying
/// the same generator outcomes and verdicts yields an equal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number (1-indexed)
    pub round: u32,
    /// Argument text shown to the judge for the bull side
    pub bull_argument: String,
    /// Argument text shown to the judge for the bear side
    pub bear_argument: String,
    /// Judge reasoning, or the reason no judgment was made
    pub judge_feedback: String,
    /// Judge quality score, 0 to 10
    pub quality_score: f64,
    /// Whether this round reached consensus
    pub consensus: bool,
    /// Per-side status of the arguments
    pub status: Sides<ArgumentStatus>,
    /// How the rendezvous ended
    pub rendezvous: Rendezvous,
}

impl RoundRecord {
    /// Build the record for `round`.
    ///
    /// `consensus` is taken as given; deciding it is the evaluator's job.
    pub fn new(
        round: u32,
        arguments: &Sides<ArgumentOutcome>,
        verdict: &JudgeVerdict,
        consensus: bool,
    ) -> Self {
        Self {
            round,
            bull_argument: arguments.bull.text_for(Side::Bull),
            bear_argument: arguments.bear.text_for(Side::Bear),
            judge_feedback: verdict.feedback.clone(),
            quality_score: verdict.quality_score,
            consensus,
            status: arguments.map(|_, outcome| outcome.status()),
            rendezvous: Rendezvous::from_outcomes(arguments),
        }
    }

    pub fn argument(&self, side: Side) -> &str {
        match side {
            Side::Bull => &self.bull_argument,
            Side::Bear => &self.bear_argument,
        }
    }
}
