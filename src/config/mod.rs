//! Application configuration module
//!
//! Type-safe configuration loading using the `config` and `dotenvy` crates.
//! Environment variables use the `VALUE_CHARTS` prefix and nested values are
//! separated by double underscores. A configuration file may be layered
//! underneath the environment with [`AppConfig::load_from`].
//!
//! # Example
//!
//! ```no_run
//! use value_charts::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Orientation: {}", config.viewer.orientation);
//! ```

mod error;
mod logging;
mod viewer;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use viewer::ViewerConfig;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "VALUE_CHARTS";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Chart layout and interaction settings
    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Log level and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `VALUE_CHARTS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `VALUE_CHARTS__VIEWER__ORIENTATION=horizontal` -> `viewer.orientation`
    /// - `VALUE_CHARTS__LOGGING__FORMAT=json` -> `logging.format`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables on top.
    ///
    /// The file format is inferred from its extension (TOML, YAML, JSON, ...).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unparseable.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.viewer.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::default()
        .prefix(ENV_PREFIX)
        .separator("__")
}
