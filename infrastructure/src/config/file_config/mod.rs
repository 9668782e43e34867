//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! [`FileConfig::to_engine_config`] validates them and builds the
//! application's [`EngineConfig`].

mod debate;
mod generators;
mod logging;
mod reliability;

pub use debate::FileDebateConfig;
pub use generators::{DEFAULT_GENERATOR_TIMEOUT_SECS, FileGeneratorConfig, FileGeneratorsConfig};
pub use logging::FileLoggingConfig;
pub use reliability::FileReliabilityConfig;

use debate_application::EngineConfig;
use debate_domain::{QUALITY_MAX, QUALITY_MIN};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("debate.max_rounds must be at least 1")]
    InvalidMaxRounds,

    #[error("{field} cannot be 0")]
    ZeroTimeout { field: String },

    #[error("reliability.backoff_base_seconds must be a non-negative number, got {0}")]
    InvalidBackoff(f64),

    #[error("reliability.circuit_failure_threshold must be at least 1")]
    InvalidFailureThreshold,

    #[error("debate.min_quality_score must be between 0 and 10, got {0}")]
    InvalidQualityScore(f64),

    #[error("debate.late_arguments: {0}")]
    InvalidLatePolicy(String),

    #[error("generators.{role}.command cannot be empty")]
    EmptyCommand { role: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Debate loop settings
    pub debate: FileDebateConfig,
    /// Retry and circuit breaker settings
    pub reliability: FileReliabilityConfig,
    /// External generator commands per role
    pub generators: FileGeneratorsConfig,
    /// Transcript and log file settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.debate.max_rounds == 0 {
            return Err(ConfigValidationError::InvalidMaxRounds);
        }
        if self.debate.argument_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout {
                field: "debate.argument_timeout_seconds".to_string(),
            });
        }
        let score = self.debate.min_quality_score;
        if !(QUALITY_MIN..=QUALITY_MAX).contains(&score) {
            return Err(ConfigValidationError::InvalidQualityScore(score));
        }
        self.debate
            .parse_late_arguments()
            .map_err(ConfigValidationError::InvalidLatePolicy)?;

        self.backoff_base()?;
        if self.reliability.circuit_failure_threshold == 0 {
            return Err(ConfigValidationError::InvalidFailureThreshold);
        }
        if self.reliability.circuit_recovery_timeout_seconds == 0 {
            return Err(ConfigValidationError::ZeroTimeout {
                field: "reliability.circuit_recovery_timeout_seconds".to_string(),
            });
        }

        for (role, generator) in self.generators.roles() {
            let Some(generator) = generator else {
                continue;
            };
            if generator.command.trim().is_empty() {
                return Err(ConfigValidationError::EmptyCommand { role });
            }
            if generator.timeout_seconds == 0 {
                return Err(ConfigValidationError::ZeroTimeout {
                    field: format!("generators.{}.timeout_seconds", role),
                });
            }
        }

        Ok(())
    }

    /// Validate and convert into the engine's configuration.
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigValidationError> {
        self.validate()?;

        let late_arguments = self
            .debate
            .parse_late_arguments()
            .map_err(ConfigValidationError::InvalidLatePolicy)?;

        Ok(EngineConfig::default()
            .with_max_rounds(self.debate.max_rounds)
            .with_argument_timeout(Duration::from_secs(self.debate.argument_timeout_seconds))
            .with_min_quality_score(self.debate.min_quality_score)
            .with_late_arguments(late_arguments)
            .with_retry(
                self.reliability.max_retries,
                self.backoff_base()?,
            )
            .with_circuit(
                self.reliability.circuit_failure_threshold,
                Duration::from_secs(self.reliability.circuit_recovery_timeout_seconds),
            ))
    }

    /// Backoff base as a `Duration`; negative, non-finite and overflowing
    /// values are rejected.
    fn backoff_base(&self) -> Result<Duration, ConfigValidationError> {
        let backoff = self.reliability.backoff_base_seconds;
        Duration::try_from_secs_f64(backoff)
            .map_err(|_| ConfigValidationError::InvalidBackoff(backoff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debate_application::LateArgumentPolicy;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[debate]
max_rounds = 4
argument_timeout_seconds = 20
min_quality_score = 6.5
late_arguments = "carry_forward"

[reliability]
max_retries = 2
backoff_base_seconds = 0.5
circuit_failure_threshold = 5
circuit_recovery_timeout_seconds = 30

[generators.bull]
command = "advocate"
args = ["bull"]

[generators.bear]
command = "advocate"
args = ["bear"]

[logging]
transcript = "debate.jsonl"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let engine = config.to_engine_config().unwrap();

        assert_eq!(engine.max_rounds, 4);
        assert_eq!(engine.argument_timeout, Duration::from_secs(20));
        assert_eq!(engine.min_quality_score, 6.5);
        assert_eq!(engine.late_arguments, LateArgumentPolicy::CarryForward);
        assert_eq!(engine.retry.max_retries, 2);
        assert_eq!(engine.retry.backoff_base, Duration::from_millis(500));
        assert_eq!(engine.circuit.failure_threshold, 5);
        assert_eq!(engine.circuit.recovery_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_defaults_match_engine_defaults() {
        let engine = FileConfig::default().to_engine_config().unwrap();
        assert_eq!(engine, EngineConfig::default());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let mut config = FileConfig::default();
        config.debate.max_rounds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidMaxRounds)
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let mut config = FileConfig::default();
        config.debate.min_quality_score = 11.0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidQualityScore(11.0))
        );
    }

    #[test]
    fn test_validate_rejects_overflowing_backoff() {
        let mut config = FileConfig::default();
        config.reliability.backoff_base_seconds = 1e30;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidBackoff(1e30))
        );
        assert_eq!(
            config.to_engine_config(),
            Err(ConfigValidationError::InvalidBackoff(1e30))
        );
    }

    #[test]
    fn test_validate_rejects_negative_and_nan_backoff() {
        let mut config = FileConfig::default();
        config.reliability.backoff_base_seconds = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidBackoff(-1.0))
        );

        config.reliability.backoff_base_seconds = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidBackoff(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let mut config = FileConfig::default();
        config.generators.judge = Some(FileGeneratorConfig::new("  "));
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyCommand { role: "judge" })
        );
    }

    #[test]
    fn test_validate_rejects_bad_late_policy() {
        let mut config = FileConfig::default();
        config.debate.late_arguments = "later".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidLatePolicy(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_generator_timeout() {
        let mut config = FileConfig::default();
        let mut bull = FileGeneratorConfig::new("advocate");
        bull.timeout_seconds = 0;
        config.generators.bull = Some(bull);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroTimeout {
                field: "generators.bull.timeout_seconds".to_string()
            })
        );
    }
}
