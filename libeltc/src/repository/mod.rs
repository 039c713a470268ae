//! Persistence seams consumed by the state machine
//!
//! Both repositories are small synchronous key/value stores. Where and how
//! the values are stored is up to the implementation; [`memory`] provides
//! process-local stores that also record every write.
//!
//! Methods are called synchronously: from `TeamCityModel::perform` on the
//! caller's thread, and from a runtime task when a failed request clears the
//! session. A slow store delays only actions that touch the repositories;
//! state subscriptions and other actions keep going.

pub mod memory;

use crate::types::{AuthData, Project};

/// Stores the address and credentials of the last successful login attempt
pub trait LoginRepository: Send + Sync {
    /// Stored auth data, if any
    fn auth_data(&self) -> Option<AuthData>;

    /// Replace the stored auth data; `None` clears it
    fn set_auth_data(&self, auth_data: Option<AuthData>);
}

/// Stores the project filter chosen in the select-projects dialog
pub trait BuildsRepository: Send + Sync {
    /// Selected projects; empty means "no filter"
    fn selected_projects(&self) -> Vec<Project>;

    /// Replace the selection; an empty list clears it
    fn set_selected_projects(&self, projects: Vec<Project>);
}
