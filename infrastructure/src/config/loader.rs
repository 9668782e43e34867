//! Configuration file loader with multi-source merging

use super::file_config::{ConfigValidationError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for the global config directory
const APP_DIR: &str = "research-debate";

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["debate.toml", ".debate.toml"];

/// Prefix of environment overrides
const ENV_PREFIX: &str = "DEBATE_";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from all sources
    ///
    /// Priority (highest to lowest):
    /// 1. `DEBATE_`-prefixed environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./debate.toml` or `./.debate.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/research-debate/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigLoadError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let figment = Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::extract(figment)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Layer defaults and whichever of the given files exist.
    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
    }

    fn extract(figment: Figment) -> Result<FileConfig, ConfigLoadError> {
        let config: FileConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the global config file path
    ///
    /// `$XDG_CONFIG_HOME/research-debate/config.toml` on Linux, the
    /// platform config directory elsewhere.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations, highest priority first (for --show-config)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec![format!("[env  ] {}<SECTION>__<KEY>", ENV_PREFIX)];

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("[{}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("[FOUND] Project: {}", path.display())),
            None => lines.push(format!("[     ] Project: ./{}", PROJECT_FILES.join(" or ./"))),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("[{}] Global:  {}", mark, path.display()));
        }

        lines.push("[     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.debate.max_rounds, 3);
        assert_eq!(config.debate.argument_timeout_seconds, 30);
        assert!(config.generators.bull.is_none());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("research-debate"));
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(
            &global,
            "[debate]\nmax_rounds = 5\nargument_timeout_seconds = 10\n",
        )
        .unwrap();
        fs::write(&project, "[debate]\nmax_rounds = 2\n").unwrap();

        let figment = ConfigLoader::figment(Some(&global), Some(&project), None);
        let config = ConfigLoader::extract(figment).unwrap();

        assert_eq!(config.debate.max_rounds, 2);
        assert_eq!(config.debate.argument_timeout_seconds, 10);
        assert_eq!(config.reliability.max_retries, 3);
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let figment = ConfigLoader::figment(Some(&missing), None, None);
        let config = ConfigLoader::extract(figment).unwrap();

        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("debate.toml");
        fs::write(&explicit, "[reliability]\ncircuit_failure_threshold = 0\n").unwrap();

        let figment = ConfigLoader::figment(None, None, Some(&explicit));
        let result = ConfigLoader::extract(figment);

        assert!(matches!(
            result,
            Err(ConfigLoadError::Invalid(
                ConfigValidationError::InvalidFailureThreshold
            ))
        ));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let result = ConfigLoader::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigLoadError::NotFound(_))));
    }
}
