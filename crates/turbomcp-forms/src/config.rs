//! Elicitation configuration management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides (`TURBOMCP_FORMS__TIMEOUT=30`)
pub const ENV_PREFIX: &str = "TURBOMCP_FORMS";

/// Elicitation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElicitationConfig {
    /// How long one elicitation may stay pending before it resolves to cancelled
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Message used when neither the caller nor the form supplies one
    pub default_message: String,
    /// Maximum number of steps in one wizard run; must be at least 1
    pub max_wizard_steps: usize,
    /// Log level used by binaries that initialise logging from this config
    pub log_level: String,
}

impl Default for ElicitationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            default_message: "Please fill out the form".to_string(),
            max_wizard_steps: 32,
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Configuration parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// A setting parsed but is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ElicitationConfig {
    /// Load configuration from a file (TOML, YAML, or JSON).
    ///
    /// The format is picked from the file extension. Environment variables
    /// prefixed with `TURBOMCP_FORMS__` override file settings.
    ///
    /// ```rust,no_run
    /// use turbomcp_forms::ElicitationConfig;
    ///
    /// let config = ElicitationConfig::from_file("forms.toml").expect("Failed to load config");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, has an unsupported
    /// extension, or holds invalid settings.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_prefix(path, ENV_PREFIX)
    }

    /// Load configuration from a file with a custom environment prefix.
    ///
    /// # Errors
    ///
    /// Same as [`ElicitationConfig::from_file`].
    pub fn from_file_with_prefix(
        path: impl AsRef<Path>,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => return Err(ConfigError::UnsupportedFormat),
        };

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or(ConfigError::UnsupportedFormat)?,
                format,
            ))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.max_wizard_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_wizard_steps must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }
}

/// Configuration builder
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    config: ElicitationConfig,
}

impl ConfigurationBuilder {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the elicitation timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the fallback prompt message
    pub fn default_message(mut self, message: impl Into<String>) -> Self {
        self.config.default_message = message.into();
        self
    }

    /// Set the wizard step limit; 0 is raised to 1
    #[must_use]
    pub const fn max_wizard_steps(mut self, steps: usize) -> Self {
        self.config.max_wizard_steps = if steps == 0 { 1 } else { steps };
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> ElicitationConfig {
        self.config
    }
}

/// Durations as whole seconds in config files
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
