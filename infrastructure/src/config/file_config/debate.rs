//! Debate loop configuration from TOML (`[debate]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [debate]
//! max_rounds = 3
//! argument_timeout_seconds = 30
//! min_quality_score = 6.0
//! late_arguments = "carry-forward"
//! ```

use debate_application::LateArgumentPolicy;
use serde::{Deserialize, Serialize};

/// Raw debate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDebateConfig {
    /// Round budget per debate
    pub max_rounds: u32,
    /// Rendezvous deadline per round
    pub argument_timeout_seconds: u64,
    /// Judge score a consensus verdict must reach (0 disables the bar)
    pub min_quality_score: f64,
    /// "discard" or "carry-forward"
    pub late_arguments: String,
}

impl Default for FileDebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            argument_timeout_seconds: 30,
            min_quality_score: 0.0,
            late_arguments: "discard".to_string(),
        }
    }
}

impl FileDebateConfig {
    pub fn parse_late_arguments(&self) -> Result<LateArgumentPolicy, String> {
        self.late_arguments.parse()
    }
}
