//! Infrastructure layer for research-debate
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: command-backed generators, the JSONL
//! transcript logger, configuration file loading and report loading.

pub mod config;
pub mod generators;
pub mod logging;
pub mod reports;

// Re-export commonly used types
pub use config::{
    ConfigLoadError, ConfigLoader, ConfigValidationError, FileConfig, FileGeneratorConfig,
};
pub use generators::CommandGenerator;
pub use logging::JsonlTranscriptLogger;
pub use reports::{ReportError, load_research};
