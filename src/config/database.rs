//! Database configuration (PostgreSQL session store).

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// PostgreSQL connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. Absent means the deployment uses another store.
    pub url: Option<String>,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns true if a database URL is configured.
    pub fn is_configured(&self) -> bool {
        self.url.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_connections == 0 {
            return Err(ValidationError::InvalidValue {
                field: "database.max_connections",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    5
}
