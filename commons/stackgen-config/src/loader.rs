use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing error: {0}")]
    ParseError(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub const ENV_PREFIX: &str = "STACKGEN";

/// Layered loader: `<dir>/default.yaml`, then `<dir>/<environment>.yaml`,
/// then `STACKGEN_*` environment variables (`__` separates nested keys).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: String,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: environment.into(),
        }
    }

    pub fn from_env() -> Self {
        let config_dir = std::env::var("STACKGEN_CONFIG_DIR")
            .unwrap_or_else(|_| "config".to_string());
        let environment = std::env::var("STACKGEN_ENV")
            .unwrap_or_else(|_| "development".to_string());

        Self::new(config_dir, environment)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn load<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let default_path = self.config_dir.join("default.yaml");
        let env_path = self
            .config_dir
            .join(format!("{}.yaml", self.environment));

        let mut config = config::Config::builder();

        // Load default configuration
        if default_path.exists() {
            debug!(path = %default_path.display(), "loading default configuration");
            config = config.add_source(config::File::from(default_path));
        }

        // Override with environment-specific configuration
        if env_path.exists() {
            debug!(path = %env_path.display(), "loading environment configuration");
            config = config.add_source(config::File::from(env_path));
        }

        config = config.add_source(env_source());

        let config = config.build()?;
        let parsed_config: T = config.try_deserialize()?;

        Ok(parsed_config)
    }

    /// Load a single file, still honouring environment overrides.
    pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        debug!(path = %path.display(), "loading configuration file");
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(env_source())
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
