//! Application layer for research-debate
//!
//! This crate contains the debate engine (Controller, Manager and the
//! `advance` driver), the reliability wrapper, port definitions and engine
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod reliability;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, LateArgumentPolicy, RetryPolicy};
pub use ports::{
    argument_generator::{
        ArgumentGenerator, DebateParticipants, GenerationRequest, GeneratorError, Role,
    },
    progress::{DebateProgressNotifier, NoProgress, ReliabilityObserver},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use reliability::{CallOutcome, CircuitBreakerRegistry, ReliableInvoker};
pub use use_cases::debate_controller::DebateController;
pub use use_cases::research_manager::ResearchManager;
pub use use_cases::run_debate::{Advance, RunDebateError, RunDebateUseCase};
pub use use_cases::session::{Completion, DebateResult, DebateSession};
