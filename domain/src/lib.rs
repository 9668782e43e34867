//! Domain layer for research-debate
//!
//! This crate contains the core debate model and reliability primitives.
//! It has no dependencies on async runtimes, infrastructure or presentation.
//!
//! # Core Concepts
//!
//! ## Debate
//!
//! Two advocates (bull and bear) argue over a shared research context. Each
//! round both arguments are gathered, a judge scores them, and the debate
//! either continues or is finalized into a terminal recommendation.
//!
//! ## Reliability
//!
//! Every external call is classified into a [`FailureKind`] and guarded by a
//! per-dependency [`CircuitBreaker`].

pub mod core;
pub mod debate;
pub mod reliability;
pub mod util;

// Re-export commonly used types
pub use core::error::DomainError;
pub use debate::{
    argument::{ArgumentOutcome, ArgumentStatus, unavailable_marker},
    phase::{DebatePhase, NextStep},
    record::{Rendezvous, RoundRecord},
    research::{AnalystReport, ResearchContext},
    side::{Side, Sides},
    state::{DebateId, DebateState, Delivery, FinalizeReason, RoundDecision},
    verdict::{JudgeVerdict, QUALITY_MAX, QUALITY_MIN, parse_verdict},
};
pub use reliability::{
    circuit::{Admission, CircuitBreaker, CircuitPolicy, CircuitState, CircuitTransition},
    failure::{CallFailure, FailureKind},
};
