//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised while validating configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_name_the_field() {
        let err = ValidationError::InvalidValue {
            field: "ai.timeout_secs",
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for ai.timeout_secs: must be positive"
        );
    }

    #[test]
    fn missing_required_displays_key() {
        let err = ValidationError::MissingRequired("MINDSHIFT_AI__API_KEY");
        assert!(err.to_string().contains("MINDSHIFT_AI__API_KEY"));
    }
}
