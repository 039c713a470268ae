//! TeamCity API abstraction
//!
//! The state machine talks to TeamCity only through the [`TeamCityApi`] trait.
//! Transport (HTTP, JSON decoding, base64 encoding of credentials) belongs to
//! the implementation; this crate ships a configurable [`mock::MockTeamCityApi`]
//! for tests and demos.
//!
//! # Examples
//!
//! ```no_run
//! use libeltc::api::{basic_auth, TeamCityApi};
//!
//! # async fn example(api: &dyn TeamCityApi) -> libeltc::Result<()> {
//! api.set_address("http://teamcity:8111");
//! api.set_credentials(&basic_auth("user:pass"));
//!
//! let queued = api.get_queued_builds().await?;
//! let started = api.get_builds().await?;
//! println!("{} queued, {} started", queued.len(), started.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Build, Change, Project};

// Mock API is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Authorization scheme prefix prepended to raw `user:password` credentials
pub const BASIC_AUTH_PREFIX: &str = "Basic ";

/// Format raw `user:password` credentials for [`TeamCityApi::set_credentials`]
///
/// The credentials are passed through untouched; encoding them for the
/// `Authorization` header is the API client's job.
pub fn basic_auth(credentials: &str) -> String {
    format!("{}{}", BASIC_AUTH_PREFIX, credentials)
}

/// TeamCity REST operations consumed by the state machine
///
/// Address and credentials are mutable configuration shared by every call, so
/// the setters take `&self` and implementations use interior mutability.
///
/// # Errors
///
/// Every fetch fails with `ApiError::UnknownHost` when the server cannot be
/// resolved or reached, `ApiError::InvalidCredentials` when TeamCity answers
/// 401, and any other `EltcError` for remaining failures.
#[async_trait]
pub trait TeamCityApi: Send + Sync {
    /// Set the server base address (e.g. "http://teamcity:8111")
    fn set_address(&self, address: &str);

    /// Set the authorization value sent with every request
    ///
    /// The state machine always passes the output of [`basic_auth`].
    fn set_credentials(&self, credentials: &str);

    /// Fetch every project visible to the user
    async fn get_projects(&self) -> Result<Vec<Project>>;

    /// Fetch running and finished builds
    async fn get_builds(&self) -> Result<Vec<Build>>;

    /// Fetch builds waiting in the queue
    async fn get_queued_builds(&self) -> Result<Vec<Build>>;

    /// Fetch running and finished builds of the given projects only
    async fn get_builds_for_projects(&self, project_ids: &[String]) -> Result<Vec<Build>>;

    /// Fetch the VCS changes included in a build
    async fn get_changes(&self, build_id: u64) -> Result<Vec<Change>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_prefixes_raw_credentials() {
        assert_eq!(basic_auth("user:pass"), "Basic user:pass");
    }

    #[test]
    fn test_basic_auth_does_not_encode() {
        let formatted = basic_auth("user:p@ss:word");
        assert_eq!(formatted, "Basic user:p@ss:word");
        assert!(formatted.starts_with(BASIC_AUTH_PREFIX));
    }
}
