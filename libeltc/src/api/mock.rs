//! Mock TeamCity API for testing
//!
//! Every endpoint answers from a configurable [`Stub`]. Stubs default to
//! [`Stub::Never`], a response that never arrives, so a test only configures
//! the endpoints it cares about. All calls, including the address and
//! credential setters, are recorded in order for verification.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::api::TeamCityApi;
use crate::error::{ApiError, Result};
use crate::types::{Build, Change, Project};

/// Canned response for one endpoint
#[derive(Debug, Clone)]
pub enum Stub<T> {
    /// The call never completes
    Never,

    /// The call succeeds immediately
    Just(T),

    /// The call fails immediately
    Error(ApiError),

    /// The call completes with the given result after a delay
    Delayed(Duration, std::result::Result<T, ApiError>),
}

impl<T> Default for Stub<T> {
    fn default() -> Self {
        Stub::Never
    }
}

impl<T> Stub<T> {
    pub fn delayed(delay: Duration, value: T) -> Self {
        Stub::Delayed(delay, Ok(value))
    }

    pub fn delayed_error(delay: Duration, error: ApiError) -> Self {
        Stub::Delayed(delay, Err(error))
    }

    async fn resolve(self) -> Result<T> {
        match self {
            Stub::Never => std::future::pending().await,
            Stub::Just(value) => Ok(value),
            Stub::Error(error) => Err(error.into()),
            Stub::Delayed(delay, result) => {
                sleep(delay).await;
                result.map_err(Into::into)
            }
        }
    }
}

/// A call received by the mock, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    SetAddress(String),
    SetCredentials(String),
    GetProjects,
    GetBuilds,
    GetQueuedBuilds,
    GetBuildsForProjects(Vec<String>),
    GetChanges(u64),
}

#[derive(Debug, Default)]
struct MockState {
    projects: Stub<Vec<Project>>,
    builds: Stub<Vec<Build>>,
    queued_builds: Stub<Vec<Build>>,
    builds_for_projects: Stub<Vec<Build>>,
    changes: Stub<Vec<Change>>,
    address: Option<String>,
    credentials: Option<String>,
    calls: Vec<ApiCall>,
}

/// Mock TeamCity API
#[derive(Debug, Default)]
pub struct MockTeamCityApi {
    state: Mutex<MockState>,
}

impl MockTeamCityApi {
    /// Create a mock whose endpoints never answer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose endpoints all succeed with empty lists
    pub fn empty() -> Self {
        let api = Self::new();
        api.stub_projects(Stub::Just(Vec::new()));
        api.stub_builds(Stub::Just(Vec::new()));
        api.stub_queued_builds(Stub::Just(Vec::new()));
        api.stub_builds_for_projects(Stub::Just(Vec::new()));
        api.stub_changes(Stub::Just(Vec::new()));
        api
    }

    pub fn stub_projects(&self, stub: Stub<Vec<Project>>) {
        self.lock().projects = stub;
    }

    pub fn stub_builds(&self, stub: Stub<Vec<Build>>) {
        self.lock().builds = stub;
    }

    pub fn stub_queued_builds(&self, stub: Stub<Vec<Build>>) {
        self.lock().queued_builds = stub;
    }

    pub fn stub_builds_for_projects(&self, stub: Stub<Vec<Build>>) {
        self.lock().builds_for_projects = stub;
    }

    pub fn stub_changes(&self, stub: Stub<Vec<Change>>) {
        self.lock().changes = stub;
    }

    /// Last address passed to `set_address`
    pub fn address(&self) -> Option<String> {
        self.lock().address.clone()
    }

    /// Last value passed to `set_credentials`
    pub fn credentials(&self) -> Option<String> {
        self.lock().credentials.clone()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls equal to `call`
    pub fn call_count(&self, call: &ApiCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call and take a copy of the stub configured for it
    fn record<T: Clone>(&self, call: ApiCall, stub: impl FnOnce(&MockState) -> &Stub<T>) -> Stub<T> {
        let mut state = self.lock();
        state.calls.push(call);
        stub(&*state).clone()
    }
}

#[async_trait]
impl TeamCityApi for MockTeamCityApi {
    fn set_address(&self, address: &str) {
        let mut state = self.lock();
        state.calls.push(ApiCall::SetAddress(address.to_string()));
        state.address = Some(address.to_string());
    }

    fn set_credentials(&self, credentials: &str) {
        let mut state = self.lock();
        state.calls.push(ApiCall::SetCredentials(credentials.to_string()));
        state.credentials = Some(credentials.to_string());
    }

    async fn get_projects(&self) -> Result<Vec<Project>> {
        self.record(ApiCall::GetProjects, |s| &s.projects)
            .resolve()
            .await
    }

    async fn get_builds(&self) -> Result<Vec<Build>> {
        self.record(ApiCall::GetBuilds, |s| &s.builds).resolve().await
    }

    async fn get_queued_builds(&self) -> Result<Vec<Build>> {
        self.record(ApiCall::GetQueuedBuilds, |s| &s.queued_builds)
            .resolve()
            .await
    }

    async fn get_builds_for_projects(&self, project_ids: &[String]) -> Result<Vec<Build>> {
        self.record(
            ApiCall::GetBuildsForProjects(project_ids.to_vec()),
            |s| &s.builds_for_projects,
        )
        .resolve()
        .await
    }

    async fn get_changes(&self, build_id: u64) -> Result<Vec<Change>> {
        self.record(ApiCall::GetChanges(build_id), |s| &s.changes)
            .resolve()
            .await
    }
}
