//! Reliability configuration from TOML (`[reliability]` section)
//!
//! Applies to every external call: advocates, judge and synthesizer.
//!
//! ```toml
//! [reliability]
//! max_retries = 3
//! backoff_base_seconds = 1.5
//! circuit_failure_threshold = 3
//! circuit_recovery_timeout_seconds = 60
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReliabilityConfig {
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Backoff before retry n is `backoff_base_seconds * 2^n`
    pub backoff_base_seconds: f64,
    /// Consecutive failures that open a dependency's circuit
    pub circuit_failure_threshold: u32,
    /// How long an open circuit rejects calls before a trial
    pub circuit_recovery_timeout_seconds: u64,
}

impl Default for FileReliabilityConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_seconds: 1.0,
            circuit_failure_threshold: 3,
            circuit_recovery_timeout_seconds: 60,
        }
    }
}
