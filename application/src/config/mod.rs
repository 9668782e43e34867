//! Application-level configuration.
//!
//! - [`EngineConfig`]: round budget, rendezvous deadline, late-argument policy
//! - [`RetryPolicy`]: retry-with-backoff for external calls
//! - [`LateArgumentPolicy`]: what happens to results that miss their round

pub mod engine_config;

pub use engine_config::{EngineConfig, LateArgumentPolicy, RetryPolicy};
