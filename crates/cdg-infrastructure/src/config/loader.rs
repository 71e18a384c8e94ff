//! Configuration loader
//!
//! Merges configuration from defaults, an optional TOML file, and
//! `CDG_`-prefixed environment variables, later sources overriding
//! earlier ones.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};

use cdg_domain::error::{Error, Result};

use crate::config::AppConfig;

/// Environment variable prefix for overrides (e.g. `CDG_INFERENCE_MODEL`)
const CONFIG_ENV_PREFIX: &str = "CDG";

/// Default configuration file name looked up in the working directory
const DEFAULT_CONFIG_FILENAME: &str = "cdg.toml";

/// Configuration loader service
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from all sources
    ///
    /// Merge order (later overrides earlier): defaults, TOML file,
    /// environment variables.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{CONFIG_ENV_PREFIX}_")).split("_"));

        let config: AppConfig = figment.extract().map_err(|e| Error::Config {
            message: "failed to extract configuration".to_string(),
            source: Some(Box::new(e)),
        })?;

        validate_config(&config)?;
        Ok(config)
    }
}

/// Reject configurations that cannot run
fn validate_config(config: &AppConfig) -> Result<()> {
    if config.inference.endpoint.trim().is_empty() {
        return Err(Error::config("inference.endpoint must not be empty"));
    }
    if config.inference.model.trim().is_empty() {
        return Err(Error::config("inference.model must not be empty"));
    }
    if config.inference.max_attempts == 0 {
        return Err(Error::config("inference.max_attempts must be at least 1"));
    }
    if config.inference.unreachable_threshold == 0 {
        return Err(Error::config(
            "inference.unreachable_threshold must be at least 1",
        ));
    }
    if config.run.workers == 0 {
        return Err(Error::config("run.workers must be at least 1"));
    }
    if config.prompt.max_body_chars == 0 {
        return Err(Error::config("prompt.max_body_chars must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_load_and_validate() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.inference.endpoint, "http://localhost:11434");
        assert!(config.run.workers >= 1);
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[inference]\nmodel = \"dolphin-mistral\"\n\n[run]\nworkers = 2\n"
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_config_path(file.path())
            .load()
            .unwrap();
        assert_eq!(config.inference.model, "dolphin-mistral");
        assert_eq!(config.run.workers, 2);
        // Untouched keys keep their defaults
        assert_eq!(config.inference.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .with_config_path("/nonexistent/cdg.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[run]\nworkers = 0\n").unwrap();

        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
