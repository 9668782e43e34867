//! Research Manager
//!
//! Drives one round from rendezvous to decision:
//!
//! ```text
//! AwaitingArguments ──(both ready | deadline)──> Evaluating
//! Evaluating ──(continue)──> Continuing
//! Evaluating ──(consensus | round limit | no arguments)──> Finalizing
//! Finalizing ──(synthesis or fallback)──> Complete
//! ```
//!
//! The Manager is the only writer of argument slots in [`DebateState`]:
//! generator tasks merely return their results, and the Manager records them
//! while waiting on the session's task set.
//!
//! [`DebateState`]: debate_domain::DebateState

use super::session::{Completion, DebateSession};
use crate::config::{EngineConfig, LateArgumentPolicy};
use crate::ports::argument_generator::{DebateParticipants, GenerationRequest, Role};
use crate::ports::progress::DebateProgressNotifier;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::reliability::ReliableInvoker;
use debate_domain::util::preview;
use debate_domain::{
    ArgumentOutcome, Delivery, DomainError, JudgeVerdict, QUALITY_MIN, Rendezvous,
    RoundDecision, Side, Sides, parse_verdict,
};
use std::sync::Arc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

/// Feedback recorded when the judge was skipped because nothing arrived.
const NO_ARGUMENTS_FEEDBACK: &str =
    "[judge not consulted: neither side delivered an argument before the deadline]";

pub struct ResearchManager {
    participants: DebateParticipants,
    invoker: Arc<ReliableInvoker>,
    config: EngineConfig,
    transcript: Arc<dyn TranscriptLogger>,
}

impl ResearchManager {
    pub fn new(
        participants: DebateParticipants,
        invoker: Arc<ReliableInvoker>,
        config: EngineConfig,
    ) -> Self {
        Self {
            participants,
            invoker,
            config,
            transcript: Arc::new(NoTranscriptLogger),
        }
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = transcript;
        self
    }

    // ==================== AwaitingArguments ====================

    /// Wait until both sides are ready or the round deadline passes, then
    /// close the rendezvous.
    ///
    /// Sides still missing at the deadline are filled in by the state
    /// (timed out, or carried over under [`LateArgumentPolicy::CarryForward`]).
    /// Their generators keep running; whatever they return later is handled
    /// by the late-argument policy.
    pub async fn await_arguments(
        &self,
        session: &mut DebateSession,
        progress: &dyn DebateProgressNotifier,
    ) -> Result<Sides<ArgumentOutcome>, DomainError> {
        let deadline = session.round_deadline.unwrap_or_else(Instant::now);

        while !session.state.both_ready() {
            let next = timeout_at(deadline, session.tasks.join_next()).await;
            match next {
                Ok(Some(Ok(completion))) => self.deliver(session, completion, progress),
                Ok(Some(Err(e))) => warn!("Generator task did not complete: {}", e),
                Ok(None) => {
                    debug!("No generator tasks left for round {}", session.state.round());
                    break;
                }
                Err(_) => {
                    debug!("Round {} deadline passed", session.state.round());
                    break;
                }
            }
        }

        for side in Side::ALL {
            if !session.state.is_ready(side) {
                warn!(
                    "Debate {}: {} argument missed the round {} deadline",
                    session.state.id(),
                    side,
                    session.state.round()
                );
                progress.on_argument_missing(side);
            }
        }

        session.state.close_rendezvous()
    }

    fn deliver(
        &self,
        session: &mut DebateSession,
        completion: Completion,
        progress: &dyn DebateProgressNotifier,
    ) {
        let Completion {
            round,
            side,
            outcome,
        } = completion;

        match session.state.record_argument(round, side, outcome.clone()) {
            Delivery::Recorded => {
                info!(
                    "Round {}: {} argument ready ({})",
                    round,
                    side,
                    preview(&outcome.text_for(side), 60)
                );
                progress.on_argument_ready(side, &outcome);
                self.transcript.log(TranscriptEvent::new(
                    "argument_received",
                    serde_json::json!({
                        "debate_id": session.state.id().as_str(),
                        "round": round,
                        "side": side,
                        "outcome": outcome,
                    }),
                ));
            }
            Delivery::Stale => {
                let current = session.state.round();
                match (self.config.late_arguments, outcome) {
                    (LateArgumentPolicy::CarryForward, ArgumentOutcome::Ready { text, .. }) => {
                        debug!(
                            "Keeping late {} argument from round {} (now round {})",
                            side, round, current
                        );
                        session.state.stash_late_argument(side, round, text);
                    }
                    _ => debug!(
                        "Discarding late {} result from round {} (now round {})",
                        side, round, current
                    ),
                }
            }
            Delivery::Duplicate => {
                warn!("Ignoring duplicate {} result for round {}", side, round);
            }
        }
    }

    // ==================== Evaluating ====================

    /// Judge the round's arguments, append the round record and decide
    /// whether to continue.
    pub async fn evaluate(
        &self,
        session: &mut DebateSession,
        arguments: Sides<ArgumentOutcome>,
        progress: &dyn DebateProgressNotifier,
    ) -> Result<RoundDecision, DomainError> {
        for (_, outcome) in arguments.iter() {
            if let Some(failure) = outcome.failure() {
                session.failures.push(failure.clone());
            }
        }

        let verdict = if Rendezvous::from_outcomes(&arguments).is_empty() {
            warn!(
                "Round {}: no arguments arrived, skipping the judge",
                session.state.round()
            );
            JudgeVerdict {
                consensus: false,
                quality_score: QUALITY_MIN,
                feedback: NO_ARGUMENTS_FEEDBACK.to_string(),
                judged: false,
            }
        } else {
            self.judge(session, &arguments).await
        };

        let decision = session
            .state
            .complete_round(&verdict, self.config.min_quality_score)?;

        if let Some(record) = session.state.last_record() {
            info!(
                "Round {} evaluated: consensus={}, score={:.1}, decision={:?}",
                record.round, record.consensus, record.quality_score, decision
            );
            progress.on_round_evaluated(record);
            self.transcript.log(TranscriptEvent::new(
                "round_evaluated",
                serde_json::json!({
                    "debate_id": session.state.id().as_str(),
                    "record": record,
                    "judged": verdict.judged,
                    "decision": match decision {
                        RoundDecision::Continue => "continue",
                        RoundDecision::Finalize(_) => "finalize",
                    },
                }),
            ));
        }

        Ok(decision)
    }

    async fn judge(
        &self,
        session: &mut DebateSession,
        arguments: &Sides<ArgumentOutcome>,
    ) -> JudgeVerdict {
        let request = GenerationRequest {
            debate_id: session.state.id().to_string(),
            role: Role::Judge,
            round: session.state.round(),
            max_rounds: session.state.max_rounds(),
            research: Arc::clone(&session.research),
            history: session.state.history().to_vec(),
            arguments: Some(arguments.map(|side, outcome| outcome.text_for(side))),
        };

        let outcome = self
            .invoker
            .invoke(self.participants.judge.as_ref(), &request)
            .await;

        match outcome.failure {
            Some(failure) => {
                warn!("Judge unavailable for round {}: {}", request.round, failure);
                let verdict = JudgeVerdict::unavailable(failure.to_string());
                session.failures.push(failure);
                verdict
            }
            None => parse_verdict(&outcome.text),
        }
    }

    // ==================== Finalizing ====================

    /// Produce the terminal output and complete the debate.
    ///
    /// Synthesis sees every analyst report and the full history. When it
    /// fails or returns blank text the last judge feedback is used instead,
    /// and the output is marked degraded.
    pub async fn finalize(
        &self,
        session: &mut DebateSession,
        progress: &dyn DebateProgressNotifier,
    ) -> Result<String, DomainError> {
        let request = GenerationRequest {
            debate_id: session.state.id().to_string(),
            role: Role::Synthesizer,
            round: session.state.round(),
            max_rounds: session.state.max_rounds(),
            research: Arc::clone(&session.research),
            history: session.state.history().to_vec(),
            arguments: None,
        };

        let outcome = self
            .invoker
            .invoke(self.participants.synthesizer.as_ref(), &request)
            .await;

        let (output, degraded) = match outcome.failure {
            None if !outcome.text.trim().is_empty() => (outcome.text, false),
            failure => {
                match failure {
                    Some(failure) => {
                        warn!("Synthesis failed, using fallback output: {}", failure);
                        session.failures.push(failure);
                    }
                    None => warn!("Synthesis returned no text, using fallback output"),
                }
                (fallback_output(session), true)
            }
        };

        session.state.complete()?;
        session.output = Some(output.clone());
        session.degraded = degraded;

        info!(
            "Debate {} finalized after {} round(s) ({:?}, degraded: {})",
            session.state.id(),
            session.state.round(),
            session.state.finalize_reason(),
            degraded
        );
        progress.on_finalized(degraded);
        self.transcript.log(TranscriptEvent::new(
            "debate_finalized",
            serde_json::json!({
                "debate_id": session.state.id().as_str(),
                "rounds": session.state.round(),
                "consensus_reached": session.state.consensus_reached(),
                "finalize_reason": session.state.finalize_reason(),
                "degraded": degraded,
                "failures": session.failures.len(),
                "output": output,
            }),
        ));

        Ok(output)
    }
}

/// Best-effort output when synthesis produced nothing: the most recent judge
/// feedback, or a fixed notice. Never empty.
fn fallback_output(session: &DebateSession) -> String {
    match session.state.last_record() {
        Some(record) if !record.judge_feedback.trim().is_empty() => record.judge_feedback.clone(),
        _ => format!(
            "No synthesized recommendation is available for {} after {} round(s).",
            session.research.ticker,
            session.state.round()
        ),
    }
}
