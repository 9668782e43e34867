//! Run Debate use case
//!
//! Owns the Controller and Manager and exposes the debate as a single-step
//! [`advance`](RunDebateUseCase::advance): each call plays one round
//! (fan-out, rendezvous, judgment) and, when the Manager decides to stop,
//! synthesizes the terminal output. [`execute`](RunDebateUseCase::execute)
//! is the driver that loops `advance` until the debate is done.

use super::debate_controller::DebateController;
use super::research_manager::ResearchManager;
use super::session::{DebateResult, DebateSession};
use crate::config::EngineConfig;
use crate::ports::argument_generator::DebateParticipants;
use crate::ports::progress::{DebateProgressNotifier, NoProgress};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::reliability::{CircuitBreakerRegistry, ReliableInvoker};
use debate_domain::util::now_millis;
use debate_domain::{
    ArgumentOutcome, DebateId, DebatePhase, DebateState, DomainError, NextStep, ResearchContext,
    Side, Sides,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while running a debate
///
/// Dependency failures never show up here; they degrade the debate instead.
#[derive(Error, Debug)]
pub enum RunDebateError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Debate {0} ended without output")]
    NoOutput(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result of one [`advance`](RunDebateUseCase::advance) step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Round the debate is in after this step
    pub round: u32,
    /// Whether the debate is finished
    pub done: bool,
    /// Terminal output, present once `done`
    pub output: Option<String>,
}

/// Use case for running research debates
///
/// One instance can run any number of debates, sequentially or
/// concurrently. They share its circuit breakers.
pub struct RunDebateUseCase {
    config: EngineConfig,
    invoker: Arc<ReliableInvoker>,
    controller: DebateController,
    manager: ResearchManager,
    transcript: Arc<dyn TranscriptLogger>,
    sequence: AtomicU64,
}

impl RunDebateUseCase {
    /// Build a use case with its own breaker registry.
    pub fn new(
        config: EngineConfig,
        participants: DebateParticipants,
    ) -> Result<Self, RunDebateError> {
        let breakers = Arc::new(CircuitBreakerRegistry::new(config.circuit));
        let invoker = ReliableInvoker::new(config.retry, breakers);
        Self::with_invoker(config, participants, Arc::new(invoker))
    }

    /// Build a use case around an existing invoker (and its breakers).
    pub fn with_invoker(
        config: EngineConfig,
        participants: DebateParticipants,
        invoker: Arc<ReliableInvoker>,
    ) -> Result<Self, RunDebateError> {
        config
            .validate()
            .map_err(|e| RunDebateError::InvalidConfig(e.to_string()))?;

        let controller = DebateController::new(
            participants.clone(),
            Arc::clone(&invoker),
            config.argument_timeout,
        );
        let manager = ResearchManager::new(participants, Arc::clone(&invoker), config.clone());

        Ok(Self {
            config,
            invoker,
            controller,
            manager,
            transcript: Arc::new(NoTranscriptLogger),
            sequence: AtomicU64::new(0),
        })
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptLogger>) -> Self {
        self.controller = self.controller.with_transcript(Arc::clone(&transcript));
        self.manager = self.manager.with_transcript(Arc::clone(&transcript));
        self.transcript = transcript;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        self.invoker.breakers()
    }

    /// Create a debate over `research`. Nothing runs until the first
    /// [`advance`](Self::advance).
    pub fn open(&self, research: ResearchContext) -> Result<DebateSession, RunDebateError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = DebateId::new(format!(
            "{}-{}-{}",
            research.ticker.to_lowercase(),
            now_millis(),
            sequence
        ));
        let state = DebateState::new(id, self.config.max_rounds)?;

        info!(
            "Opening debate {} on {} ({} report(s), up to {} round(s))",
            state.id(),
            research.ticker,
            research.reports.len(),
            self.config.max_rounds
        );
        self.transcript.log(TranscriptEvent::new(
            "debate_started",
            serde_json::json!({
                "debate_id": state.id().as_str(),
                "ticker": research.ticker,
                "trade_date": research.trade_date,
                "reports": research.reports.iter().map(|r| r.analyst.as_str()).collect::<Vec<_>>(),
                "max_rounds": self.config.max_rounds,
            }),
        ));

        Ok(DebateSession::new(state, research))
    }

    /// Play the next round, finalizing when the Manager decides to stop.
    ///
    /// On a finished session this returns the stored output again without
    /// calling anything.
    pub async fn advance(
        &self,
        session: &mut DebateSession,
        progress: &dyn DebateProgressNotifier,
    ) -> Result<Advance, RunDebateError> {
        if session.state.phase().next_step() == NextStep::StartRound {
            self.controller.start_round(session, progress)?;
        }

        match session.state.phase() {
            DebatePhase::AwaitingArguments => {
                let arguments = self.manager.await_arguments(session, progress).await?;
                self.manager.evaluate(session, arguments, progress).await?;
            }
            DebatePhase::Evaluating => {
                let arguments = Sides::new(
                    current_argument(&session.state, Side::Bull),
                    current_argument(&session.state, Side::Bear),
                );
                self.manager.evaluate(session, arguments, progress).await?;
            }
            _ => {}
        }

        if session.state.phase() == DebatePhase::Finalizing {
            self.manager.finalize(session, progress).await?;
        }

        Ok(Advance {
            round: session.state.round(),
            done: session.is_done(),
            output: session.output.clone(),
        })
    }

    /// Run a debate to completion with default (no-op) progress
    pub async fn execute(&self, research: ResearchContext) -> Result<DebateResult, RunDebateError> {
        self.execute_with_progress(research, &NoProgress).await
    }

    /// Run a debate to completion with progress callbacks
    pub async fn execute_with_progress(
        &self,
        research: ResearchContext,
        progress: &dyn DebateProgressNotifier,
    ) -> Result<DebateResult, RunDebateError> {
        let mut session = self.open(research)?;
        loop {
            let step = self.advance(&mut session, progress).await?;
            if step.done {
                break;
            }
        }

        let id = session.id().to_string();
        session.into_result().ok_or(RunDebateError::NoOutput(id))
    }
}

fn current_argument(state: &DebateState, side: Side) -> ArgumentOutcome {
    state
        .argument(side)
        .cloned()
        .unwrap_or(ArgumentOutcome::TimedOut)
}
