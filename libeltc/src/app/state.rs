//! Application state
//!
//! `AppState` is a complete snapshot of what the user should see. Every state
//! emitted by the model replaces the previous one; views never merge states.

use std::fmt;

use crate::error::{ApiError, EltcError};
use crate::types::{Build, Change, Project, SelectableProject};

/// The closed set of states the application can be in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppState {
    /// Nothing has happened yet
    #[default]
    Initial,

    /// Build list is being fetched
    LoadingBuilds,

    /// Login form, optionally showing why the last attempt failed
    Login(LoginState),

    /// Build list; queued builds come first
    Builds {
        builds: Vec<Build>,
        projects: Vec<Project>,
    },

    /// Project filter dialog
    SelectProjectsDialog { projects: Vec<SelectableProject> },

    /// Changes of `build` are being fetched
    LoadingDetails { build: Build },

    /// Build details
    Details { build: Build, changes: Vec<Change> },

    /// Open `url` in an external browser
    WebBrowser { url: String },
}

impl AppState {
    /// Empty login form without an error
    pub fn login() -> Self {
        AppState::Login(LoginState::default())
    }

    /// Empty login form showing `error`
    pub fn login_error(error: LoginError) -> Self {
        AppState::Login(LoginState {
            error: Some(error),
            ..LoginState::default()
        })
    }

    /// Short variant name for log output
    pub fn kind(&self) -> &'static str {
        match self {
            AppState::Initial => "initial",
            AppState::LoadingBuilds => "loading_builds",
            AppState::Login(_) => "login",
            AppState::Builds { .. } => "builds",
            AppState::SelectProjectsDialog { .. } => "select_projects_dialog",
            AppState::LoadingDetails { .. } => "loading_details",
            AppState::Details { .. } => "details",
            AppState::WebBrowser { .. } => "web_browser",
        }
    }
}

/// Login form state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub host: String,
    pub user: String,
    pub password: String,
    pub error: Option<LoginError>,
}

/// Why the user was sent back to the login form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginError {
    UnknownHost,
    InvalidCredentials,
    NetworkProblem,
}

impl LoginError {
    /// Classify a failed API call
    pub fn from_error(error: &EltcError) -> Self {
        match error.as_api() {
            Some(ApiError::UnknownHost(_)) => LoginError::UnknownHost,
            Some(ApiError::InvalidCredentials) => LoginError::InvalidCredentials,
            _ => LoginError::NetworkProblem,
        }
    }

    /// Message shown next to the login form
    pub fn message(&self) -> &'static str {
        match self {
            LoginError::UnknownHost => "Unknown host",
            LoginError::InvalidCredentials => "Invalid credentials",
            LoginError::NetworkProblem => "Network problem",
        }
    }

    /// Whether the stored auth data and project selection must be cleared
    ///
    /// True for failures caused by the stored address or credentials.
    pub fn clears_session(&self) -> bool {
        matches!(self, LoginError::UnknownHost | LoginError::InvalidCredentials)
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_state_is_initial() {
        assert_eq!(AppState::default(), AppState::Initial);
    }

    #[test]
    fn test_login_has_empty_fields() {
        match AppState::login() {
            AppState::Login(login) => {
                assert_eq!(login.host, "");
                assert_eq!(login.user, "");
                assert_eq!(login.password, "");
                assert!(login.error.is_none());
            }
            other => panic!("Expected login state, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_api_errors() {
        let unknown_host: EltcError = ApiError::UnknownHost("ci".to_string()).into();
        let unauthorized: EltcError = ApiError::InvalidCredentials.into();
        let network: EltcError = ApiError::Network("reset".to_string()).into();
        let timeout: EltcError = ApiError::Timeout(Duration::from_secs(1)).into();
        let server: EltcError = ApiError::Server {
            status: 500,
            message: "Internal Server Error".to_string(),
        }
        .into();

        assert_eq!(LoginError::from_error(&unknown_host), LoginError::UnknownHost);
        assert_eq!(
            LoginError::from_error(&unauthorized),
            LoginError::InvalidCredentials
        );
        assert_eq!(LoginError::from_error(&network), LoginError::NetworkProblem);
        assert_eq!(LoginError::from_error(&timeout), LoginError::NetworkProblem);
        assert_eq!(LoginError::from_error(&server), LoginError::NetworkProblem);
    }

    #[test]
    fn test_non_api_errors_are_network_problems() {
        let error = EltcError::InvalidInput("broken response".to_string());
        assert_eq!(LoginError::from_error(&error), LoginError::NetworkProblem);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LoginError::UnknownHost.to_string(), "Unknown host");
        assert_eq!(LoginError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(LoginError::NetworkProblem.to_string(), "Network problem");
    }

    #[test]
    fn test_only_auth_failures_clear_session() {
        assert!(LoginError::UnknownHost.clears_session());
        assert!(LoginError::InvalidCredentials.clears_session());
        assert!(!LoginError::NetworkProblem.clears_session());
    }
}
