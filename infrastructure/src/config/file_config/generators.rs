//! Generator commands from TOML (`[generators.*]` sections)
//!
//! Each role is backed by an external program that reads the generation
//! request as JSON on stdin and prints its text on stdout.
//!
//! ```toml
//! [generators.bull]
//! command = "llm-advocate"
//! args = ["--stance", "bull"]
//! timeout_seconds = 90
//!
//! [generators.judge]
//! command = "llm-judge"
//! dependency = "judge-llm"
//! ```

use serde::{Deserialize, Serialize};

/// Default per-call timeout for generator commands
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 120;

/// One generator command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGeneratorConfig {
    /// Program to run
    pub command: String,
    /// Extra arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Per-call timeout (a timed-out call is retried like any transient error)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Circuit breaker name; roles naming the same dependency share a breaker.
    /// Defaults to the command name.
    #[serde(default)]
    pub dependency: Option<String>,
    /// Working directory for the command
    #[serde(default)]
    pub working_dir: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_GENERATOR_TIMEOUT_SECS
}

impl FileGeneratorConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout_seconds: DEFAULT_GENERATOR_TIMEOUT_SECS,
            dependency: None,
            working_dir: None,
        }
    }

    /// Breaker name for this generator
    pub fn dependency_name(&self) -> &str {
        self.dependency.as_deref().unwrap_or(&self.command)
    }
}

/// Commands for all four roles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeneratorsConfig {
    pub bull: Option<FileGeneratorConfig>,
    pub bear: Option<FileGeneratorConfig>,
    pub judge: Option<FileGeneratorConfig>,
    pub synthesizer: Option<FileGeneratorConfig>,
}

impl FileGeneratorsConfig {
    /// `(role, config)` for every role, in debate order.
    pub fn roles(&self) -> [(&'static str, Option<&FileGeneratorConfig>); 4] {
        [
            ("bull", self.bull.as_ref()),
            ("bear", self.bear.as_ref()),
            ("judge", self.judge.as_ref()),
            ("synthesizer", self.synthesizer.as_ref()),
        ]
    }

    /// Roles with no command configured.
    pub fn missing_roles(&self) -> Vec<&'static str> {
        self.roles()
            .into_iter()
            .filter(|(_, config)| config.is_none())
            .map(|(role, _)| role)
            .collect()
    }
}
