//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod argument_generator;
pub mod progress;
pub mod transcript_logger;
