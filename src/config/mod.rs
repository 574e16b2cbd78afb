//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `MINDSHIFT_`
//! prefix and nested values use double underscores as separators, e.g.
//! `MINDSHIFT_AI__MAX_CALLS_PER_SESSION=12`.
//!
//! # Example
//!
//! ```no_run
//! use mindshift::config::AppConfig;
//!
//! let config = AppConfig::load().expect("failed to load configuration");
//! config.validate().expect("invalid configuration");
//! ```

mod ai;
mod database;
mod error;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI assistance configuration.
    #[serde(default)]
    pub ai: AiConfig,
    /// Database configuration (PostgreSQL session store).
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Loads configuration from the environment (and a `.env` file when
    /// present).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("MINDSHIFT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Validates the loaded configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.database.validate()?;
        Ok(())
    }
}
