//! Logging configuration from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! transcript = "logs/debate.jsonl"
//! log_file = "logs/research-debate.log"
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of every debate event
    pub transcript: Option<String>,
    /// Diagnostic log file (in addition to stderr)
    pub log_file: Option<String>,
}
