//! Argument outcomes.
//!
//! What a generator delivered for one side in one round. Missing and failed
//! arguments are ordinary values here, so the rendezvous and judge steps can
//! proceed with whatever is available.

use super::side::Side;
use crate::reliability::failure::CallFailure;
use serde::{Deserialize, Serialize};

/// Marker used in place of an argument that never arrived before the deadline.
pub fn unavailable_marker(side: Side) -> String {
    format!(
        "[{} argument unavailable: generator missed the round deadline]",
        side.as_str()
    )
}

/// Result of one side's generator for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArgumentOutcome {
    /// The generator produced an argument.
    Ready {
        text: String,
        /// Attempts the reliability layer needed (1 = no retries)
        attempts: u32,
    },
    /// The generator failed outright; a placeholder stands in.
    Failed { failure: CallFailure },
    /// The round deadline passed before the generator finished.
    TimedOut,
    /// The deadline passed, and a late argument from an earlier round
    /// stands in.
    CarriedOver { from_round: u32, text: String },
}

impl ArgumentOutcome {
    pub fn ready(text: impl Into<String>, attempts: u32) -> Self {
        ArgumentOutcome::Ready {
            text: text.into(),
            attempts,
        }
    }

    pub fn failed(failure: CallFailure) -> Self {
        ArgumentOutcome::Failed { failure }
    }

    /// Whether the side counts as having completed for this round.
    ///
    /// A recorded failure completes the side (with placeholder text); a
    /// timeout or carried-over argument does not.
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            ArgumentOutcome::Ready { .. } | ArgumentOutcome::Failed { .. }
        )
    }

    /// Whether real argument text arrived this round.
    pub fn is_success(&self) -> bool {
        matches!(self, ArgumentOutcome::Ready { .. })
    }

    /// Whether the side missed the deadline (with or without a stand-in).
    pub fn missed_deadline(&self) -> bool {
        matches!(
            self,
            ArgumentOutcome::TimedOut | ArgumentOutcome::CarriedOver { .. }
        )
    }

    pub fn status(&self) -> ArgumentStatus {
        match self {
            ArgumentOutcome::Ready { .. } => ArgumentStatus::Ready,
            ArgumentOutcome::Failed { .. } => ArgumentStatus::Failed,
            ArgumentOutcome::TimedOut => ArgumentStatus::TimedOut,
            ArgumentOutcome::CarriedOver { .. } => ArgumentStatus::CarriedOver,
        }
    }

    /// Text to show the judge for `side`.
    pub fn text_for(&self, side: Side) -> String {
        match self {
            ArgumentOutcome::Ready { text, .. } => text.clone(),
            ArgumentOutcome::Failed { failure } => failure.placeholder(),
            ArgumentOutcome::TimedOut => unavailable_marker(side),
            ArgumentOutcome::CarriedOver { from_round, text } => {
                format!("[carried over from round {}] {}", from_round, text)
            }
        }
    }

    pub fn failure(&self) -> Option<&CallFailure> {
        match self {
            ArgumentOutcome::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}

/// Compact status stored in the round history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentStatus {
    Ready,
    Failed,
    TimedOut,
    CarriedOver,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reliability::failure::FailureKind;

    #[test]
    fn test_failed_counts_as_ready() {
        let failure = CallFailure::new("bull", FailureKind::Permanent, "auth", 1);
        let outcome = ArgumentOutcome::failed(failure);
        assert!(outcome.is_ready());
        assert!(!outcome.is_success());
        assert!(outcome.text_for(Side::Bull).contains("bull unavailable"));
    }

    #[test]
    fn test_timed_out_is_not_ready() {
        let outcome = ArgumentOutcome::TimedOut;
        assert!(!outcome.is_ready());
        assert!(outcome.missed_deadline());
        assert_eq!(outcome.text_for(Side::Bear), unavailable_marker(Side::Bear));
    }

    #[test]
    fn test_carried_over_is_not_ready() {
        let outcome = ArgumentOutcome::CarriedOver {
            from_round: 1,
            text: "Margins expand".to_string(),
        };
        assert!(!outcome.is_ready());
        assert_eq!(
            outcome.text_for(Side::Bull),
            "[carried over from round 1] Margins expand"
        );
    }

    #[test]
    fn test_serde_tagged() {
        let outcome = ArgumentOutcome::ready("Revenue is growing", 2);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["attempts"], 2);
    }
}
