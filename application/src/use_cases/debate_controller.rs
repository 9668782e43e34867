//! Debate Controller
//!
//! Starts rounds. [`DebateController::start_round`] advances the round
//! state and fans out the bull and bear generators as independent tasks,
//! then returns without awaiting either of them. Results come back through
//! the session's task set and are collected by the
//! [`ResearchManager`](super::research_manager::ResearchManager).

use super::session::{Completion, DebateSession};
use crate::ports::argument_generator::{DebateParticipants, GenerationRequest};
use crate::ports::progress::DebateProgressNotifier;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::reliability::ReliableInvoker;
use debate_domain::util::now_millis;
use debate_domain::{DomainError, Side};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

pub struct DebateController {
    participants: DebateParticipants,
    invoker: Arc<ReliableInvoker>,
    argument_timeout: Duration,
    transcript: Arc<dyn TranscriptLogger>,
}

impl DebateController {
    pub fn new(
        participants: DebateParticipants,
        invoker: Arc<ReliableInvoker>,
        argument_timeout: Duration,
    ) -> Self {
        Self {
            participants,
            invoker,
            argument_timeout,
            transcript: Arc::new(NoTranscriptLogger),
        }
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = transcript;
        self
    }

    /// Begin the next round and spawn both advocates.
    ///
    /// Fails with [`DomainError::RoundLimitReached`] when every round has
    /// been played, or [`DomainError::InvalidTransition`] when the previous
    /// round was not evaluated yet. Must be called inside a Tokio runtime.
    pub fn start_round(
        &self,
        session: &mut DebateSession,
        progress: &dyn DebateProgressNotifier,
    ) -> Result<u32, DomainError> {
        let started = Instant::now();
        let round = session.state.begin_round(now_millis())?;
        session.round_deadline = Some(started + self.argument_timeout);

        let history = session.state.history().to_vec();
        for side in Side::ALL {
            let generator = Arc::clone(self.participants.advocate(side));
            let invoker = Arc::clone(&self.invoker);
            let request = GenerationRequest {
                debate_id: session.state.id().to_string(),
                role: side.into(),
                round,
                max_rounds: session.state.max_rounds(),
                research: Arc::clone(&session.research),
                history: history.clone(),
                arguments: None,
            };

            session.tasks.spawn(async move {
                let outcome = invoker.invoke(generator.as_ref(), &request).await;
                debug!(
                    "{} generator finished round {} (succeeded: {})",
                    side, round, outcome.succeeded
                );
                Completion {
                    round,
                    side,
                    outcome: outcome.into_argument(),
                }
            });
        }

        info!(
            "Debate {}: round {}/{} started, deadline in {:?}",
            session.state.id(),
            round,
            session.state.max_rounds(),
            self.argument_timeout
        );
        progress.on_round_start(round, session.state.max_rounds());
        self.transcript.log(TranscriptEvent::new(
            "round_started",
            serde_json::json!({
                "debate_id": session.state.id().as_str(),
                "round": round,
                "max_rounds": session.state.max_rounds(),
                "started_at": session.state.round_started_at(),
                "deadline_seconds": self.argument_timeout.as_secs_f64(),
            }),
        ));

        Ok(round)
    }
}
