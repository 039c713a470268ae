//! Actions accepted by the state machine
//!
//! Actions are the only way to drive `TeamCityModel`. Views dispatch them in
//! response to user input; the model performs the associated work and emits
//! new states.

use crate::types::{Build, Project};

/// External inputs requesting a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Application launched; resume the stored session if there is one
    StartApp,

    /// Login form submitted
    SubmitCredentials {
        address: String,
        /// Raw `user:password`
        credentials: String,
    },

    /// Reload the build list
    RefreshList,

    /// Open the project filter dialog
    SelectProjects,

    /// Project filter dialog confirmed; an empty selection removes the filter
    SubmitProjects { selected: Vec<Project> },

    /// Show details of a build
    SelectBuild { build: Build },

    /// Open the selected build in a web browser
    OpenInWebBrowser,

    /// Leave the details screen
    ReturnToList,

    /// Forget the stored session
    Logout,

    /// Dismiss the login error message
    AcceptLoginError,
}

impl Action {
    /// Stable name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartApp => "start_app",
            Action::SubmitCredentials { .. } => "submit_credentials",
            Action::RefreshList => "refresh_list",
            Action::SelectProjects => "select_projects",
            Action::SubmitProjects { .. } => "submit_projects",
            Action::SelectBuild { .. } => "select_build",
            Action::OpenInWebBrowser => "open_in_web_browser",
            Action::ReturnToList => "return_to_list",
            Action::Logout => "logout",
            Action::AcceptLoginError => "accept_login_error",
        }
    }
}
