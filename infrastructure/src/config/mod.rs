//! Configuration file loading for research-debate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables: `DEBATE_<SECTION>__<KEY>` (e.g. `DEBATE_DEBATE__MAX_ROUNDS=5`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./debate.toml` or `./.debate.toml`
//! 4. Global: `$XDG_CONFIG_HOME/research-debate/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_GENERATOR_TIMEOUT_SECS, FileConfig, FileDebateConfig,
    FileGeneratorConfig, FileGeneratorsConfig, FileLoggingConfig, FileReliabilityConfig,
};
pub use loader::{ConfigLoadError, ConfigLoader};
