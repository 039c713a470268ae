//! Error types for ELTC

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EltcError>;

#[derive(Error, Debug)]
pub enum EltcError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Data that could not be interpreted, such as an undecodable response
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EltcError {
    /// Returns the API error behind this error, if any
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            EltcError::Api(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Failures reported by a TeamCity API client
///
/// Clients map their transport errors onto these variants. The state machine
/// only distinguishes `UnknownHost` and `InvalidCredentials`; every other
/// variant is reported to the user as a network problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unknown host: {0}")]
    UnknownHost(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request timed out after {}", human_duration(.0))]
    Timeout(Duration),
}

fn human_duration(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting_invalid_input() {
        let error = EltcError::InvalidInput("Address cannot be empty".to_string());
        assert_eq!(error.to_string(), "Invalid input: Address cannot be empty");
    }

    #[test]
    fn test_error_message_formatting_unknown_host() {
        let error = EltcError::Api(ApiError::UnknownHost("teamcity.invalid".to_string()));
        assert_eq!(error.to_string(), "API error: Unknown host: teamcity.invalid");
    }

    #[test]
    fn test_error_message_formatting_server() {
        let error = ApiError::Server {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(error.to_string(), "Server returned 503: Service Unavailable");
    }

    #[test]
    fn test_timeout_formatting_uses_human_duration() {
        let error = ApiError::Timeout(Duration::from_secs(30));
        assert_eq!(error.to_string(), "Request timed out after 30s");
    }

    #[test]
    fn test_config_invalid_value_formatting() {
        let error = ConfigError::InvalidValue {
            field: "model.fetch_timeout".to_string(),
            message: "expected a duration".to_string(),
        };
        let message = EltcError::from(error).to_string();
        assert_eq!(
            message,
            "Configuration error: Invalid value for model.fetch_timeout: expected a duration"
        );
    }

    #[test]
    fn test_error_conversion_from_api_error() {
        let error: EltcError = ApiError::InvalidCredentials.into();

        match error {
            EltcError::Api(ApiError::InvalidCredentials) => {}
            other => panic!("Expected EltcError::Api, got {:?}", other),
        }
    }

    #[test]
    fn test_error_message_formatting_logging() {
        let error = EltcError::Logging("a global default trace dispatcher has already been set".to_string());
        assert!(error.to_string().starts_with("Logging setup failed: "));
    }

    #[test]
    fn test_as_api() {
        let api: EltcError = ApiError::Network("connection reset".to_string()).into();
        assert_eq!(
            api.as_api(),
            Some(&ApiError::Network("connection reset".to_string()))
        );

        let other = EltcError::InvalidInput("test".to_string());
        assert!(other.as_api().is_none());
    }

    #[test]
    fn test_api_error_clone() {
        // Mock clients hand out the same configured error on every call
        let original = ApiError::UnknownHost("ci.example".to_string());
        let cloned = original.clone();

        assert_eq!(original, cloned);
    }
}
