//! TeamCity client state machine
//!
//! [`TeamCityModel`] turns user [`Action`]s into a stream of [`AppState`]s.
//! It owns no UI: front ends render whatever state arrives and feed user
//! input back through [`TeamCityModel::perform`].
//!
//! # Ordering
//!
//! Intermediate states (`LoadingBuilds`, `LoadingDetails`) are emitted before
//! `perform` returns. The terminal state of an action arrives later, from a
//! task spawned on the current Tokio runtime. When a newer action starts
//! before that task finishes, the older result is discarded: the last issued
//! action always wins.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libeltc::api::mock::MockTeamCityApi;
//! use libeltc::repository::memory::{MemoryBuildsRepository, MemoryLoginRepository};
//! use libeltc::{Action, AppState, TeamCityModel};
//!
//! # async fn example() {
//! let model = TeamCityModel::new(
//!     Arc::new(MockTeamCityApi::empty()),
//!     Arc::new(MemoryLoginRepository::new()),
//!     Arc::new(MemoryBuildsRepository::new()),
//! );
//!
//! let mut states = model.state();
//! model.perform(Action::StartApp);
//!
//! while let Some(state) = states.recv().await {
//!     if let AppState::Login(_) = state {
//!         break;
//!     }
//! }
//! # }
//! ```

pub mod stream;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use self::stream::{Generation, StateBus, StateReceiver};
use crate::api::{basic_auth, TeamCityApi};
use crate::app::reducer::{
    self, combine_builds, filter_queued_builds, selectable_projects, selected_project_ids,
};
use crate::app::{Action, AppState, LoginError};
use crate::config::{ModelConfig, DEFAULT_FETCH_TIMEOUT};
use crate::error::{ApiError, EltcError, Result};
use crate::repository::{BuildsRepository, LoginRepository};
use crate::types::{AuthData, Build, Project};

/// Reactive TeamCity client
///
/// Cloning is cheap; clones share the same state stream.
#[derive(Clone)]
pub struct TeamCityModel {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    api: Arc<dyn TeamCityApi>,
    login_repository: Arc<dyn LoginRepository>,
    builds_repository: Arc<dyn BuildsRepository>,
    bus: StateBus,
    /// Orders repository access with generation changes: a failure clears
    /// the session only while its generation is still the latest. Taken
    /// before the bus lock, never after it.
    session: Mutex<()>,
    /// Build whose details were requested last; target of `OpenInWebBrowser`
    selected_build: Mutex<Option<Build>>,
    fetch_timeout: Option<Duration>,
}

impl TeamCityModel {
    /// Create a model with the default fetch timeout
    pub fn new(
        api: Arc<dyn TeamCityApi>,
        login_repository: Arc<dyn LoginRepository>,
        builds_repository: Arc<dyn BuildsRepository>,
    ) -> Self {
        Self::with_timeout(
            api,
            login_repository,
            builds_repository,
            Some(DEFAULT_FETCH_TIMEOUT),
        )
    }

    /// Create a model using the `[model]` section of the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured fetch timeout cannot be parsed.
    pub fn with_config(
        api: Arc<dyn TeamCityApi>,
        login_repository: Arc<dyn LoginRepository>,
        builds_repository: Arc<dyn BuildsRepository>,
        config: &ModelConfig,
    ) -> Result<Self> {
        let fetch_timeout = config.fetch_timeout()?;
        Ok(Self::with_timeout(
            api,
            login_repository,
            builds_repository,
            fetch_timeout,
        ))
    }

    fn with_timeout(
        api: Arc<dyn TeamCityApi>,
        login_repository: Arc<dyn LoginRepository>,
        builds_repository: Arc<dyn BuildsRepository>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                api,
                login_repository,
                builds_repository,
                bus: StateBus::new(AppState::Initial),
                session: Mutex::new(()),
                selected_build: Mutex::new(None),
                fetch_timeout,
            }),
        }
    }

    /// Subscribe to application states
    ///
    /// The receiver first yields the current state, then every later state in
    /// emission order.
    pub fn state(&self) -> StateReceiver {
        self.inner.bus.subscribe()
    }

    /// Latest emitted state
    pub fn current_state(&self) -> AppState {
        self.inner.bus.current()
    }

    /// Handle a user action
    ///
    /// Never blocks on the network. Results of API calls are emitted on the
    /// state stream once they arrive. Repository reads and writes run on the
    /// calling thread.
    ///
    /// # Panics
    ///
    /// Actions that call the API spawn a task and panic when called outside a
    /// Tokio runtime.
    pub fn perform(&self, action: Action) {
        debug!(action = action.name(), "Performing action");

        let inner = &self.inner;
        match action {
            Action::StartApp => inner.start_app(),
            Action::SubmitCredentials {
                address,
                credentials,
            } => inner.submit_credentials(AuthData::new(address, credentials)),
            Action::RefreshList | Action::ReturnToList => inner.reload_builds(),
            Action::SelectProjects => inner.select_projects(),
            Action::SubmitProjects { selected } => inner.submit_projects(selected),
            Action::SelectBuild { build } => inner.select_build(build),
            Action::OpenInWebBrowser => inner.open_in_web_browser(),
            Action::Logout => inner.logout(),
            Action::AcceptLoginError => inner.accept_login_error(),
        }
    }
}

impl ModelInner {
    fn start_app(self: &Arc<Self>) {
        let _session = self.lock_session();
        match self.login_repository.auth_data() {
            Some(auth_data) => {
                debug!(address = %auth_data.address, "Found stored auth data");
                let generation = self.bus.replace(AppState::LoadingBuilds);
                self.configure_api(&auth_data);
                self.load_builds(generation, self.builds_repository.selected_projects());
            }
            None => {
                debug!("No stored auth data");
                self.bus.replace(AppState::login());
            }
        }
    }

    fn submit_credentials(self: &Arc<Self>, auth_data: AuthData) {
        info!(address = %auth_data.address, "Logging in");
        let _session = self.lock_session();
        let generation = self.bus.replace(AppState::LoadingBuilds);
        self.login_repository.set_auth_data(Some(auth_data.clone()));
        self.configure_api(&auth_data);
        self.load_builds(generation, self.builds_repository.selected_projects());
    }

    fn reload_builds(self: &Arc<Self>) {
        let _session = self.lock_session();
        if self.login_repository.auth_data().is_none() {
            warn!("Build list requested without stored auth data");
            self.bus.replace(AppState::login());
            return;
        }
        let generation = self.bus.replace(AppState::LoadingBuilds);
        self.load_builds(generation, self.builds_repository.selected_projects());
    }

    fn select_projects(self: &Arc<Self>) {
        let (generation, selected) = {
            let _session = self.lock_session();
            // Supersedes pending work without leaving the current screen
            (self.bus.begin(), self.builds_repository.selected_projects())
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.fetch(this.api.get_projects()).await {
                Ok(projects) => this.emit(
                    generation,
                    AppState::SelectProjectsDialog {
                        projects: selectable_projects(projects, &selected),
                    },
                ),
                Err(error) => this.fail(generation, &error),
            }
        });
    }

    fn submit_projects(self: &Arc<Self>, selected: Vec<Project>) {
        debug!(count = selected.len(), "Storing project selection");
        let _session = self.lock_session();
        let generation = self.bus.replace(AppState::LoadingBuilds);
        self.builds_repository.set_selected_projects(selected.clone());
        self.load_builds(generation, selected);
    }

    fn select_build(self: &Arc<Self>, build: Build) {
        *self.selected_build() = Some(build.clone());
        let generation = self.bus.replace(AppState::LoadingDetails {
            build: build.clone(),
        });

        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.fetch(this.api.get_changes(build.id)).await {
                Ok(changes) => this.emit(generation, AppState::Details { build, changes }),
                Err(error) => this.fail(generation, &error),
            }
        });
    }

    fn open_in_web_browser(&self) {
        let selected = self.selected_build().clone();
        match selected {
            Some(build) => {
                self.bus.replace(AppState::WebBrowser { url: build.web_url });
            }
            None => warn!("No build selected, ignoring request to open web browser"),
        }
    }

    fn logout(&self) {
        info!("Logging out");
        let _session = self.lock_session();
        self.clear_session();
        *self.selected_build() = None;
        self.bus.replace(AppState::login());
    }

    fn accept_login_error(&self) {
        if !self.bus.update(reducer::accept_login_error) {
            debug!("No login error to accept");
        }
    }

    /// Fetch queued builds, builds and projects concurrently for a generation
    /// that already emitted `LoadingBuilds`
    fn load_builds(self: &Arc<Self>, generation: Generation, selected: Vec<Project>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match this.fetch_builds(&selected).await {
                Ok(state) => this.emit(generation, state),
                Err(error) => this.fail(generation, &error),
            }
        });
    }

    async fn fetch_builds(&self, selected: &[Project]) -> Result<AppState> {
        let project_ids = selected_project_ids(selected);

        let started = async {
            if project_ids.is_empty() {
                self.api.get_builds().await
            } else {
                self.api.get_builds_for_projects(&project_ids).await
            }
        };

        let (queued, started, projects) = futures::try_join!(
            self.fetch(self.api.get_queued_builds()),
            self.fetch(started),
            self.fetch(self.api.get_projects()),
        )?;

        debug!(
            queued = queued.len(),
            started = started.len(),
            projects = projects.len(),
            "Fetched build list"
        );

        Ok(AppState::Builds {
            builds: combine_builds(filter_queued_builds(queued, &project_ids), started),
            projects,
        })
    }

    fn configure_api(&self, auth_data: &AuthData) {
        self.api.set_address(&auth_data.address);
        self.api.set_credentials(&basic_auth(&auth_data.credentials));
    }

    /// Await an API call, bounded by the fetch timeout
    async fn fetch<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| ApiError::Timeout(limit))?,
            None => request.await,
        }
    }

    fn emit(&self, generation: Generation, state: AppState) {
        let kind = state.kind();
        if !self.bus.emit_if_current(generation, state) {
            debug!(state = kind, "Discarding result of superseded request");
        }
    }

    /// Route a failed API call to the login form
    ///
    /// Auth failures also clear the stored session. Nothing happens for a
    /// superseded request.
    fn fail(&self, generation: Generation, error: &EltcError) {
        let login_error = LoginError::from_error(error);

        if login_error.clears_session() {
            let _session = self.lock_session();
            if !self.bus.is_current(generation) {
                debug!(error = %error, "Discarding failure of superseded request");
                return;
            }
            self.clear_session();
        }

        warn!(error = %error, reason = %login_error, "Request failed");
        if !self
            .bus
            .emit_if_current(generation, AppState::login_error(login_error))
        {
            debug!(error = %error, "Discarding failure of superseded request");
        }
    }

    fn clear_session(&self) {
        self.login_repository.set_auth_data(None);
        self.builds_repository.set_selected_projects(Vec::new());
    }

    fn lock_session(&self) -> MutexGuard<'_, ()> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn selected_build(&self) -> MutexGuard<'_, Option<Build>> {
        self.selected_build
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, MockTeamCityApi, Stub};
    use crate::repository::memory::{MemoryBuildsRepository, MemoryLoginRepository};

    fn model_with(api: Arc<MockTeamCityApi>) -> TeamCityModel {
        TeamCityModel::new(
            api,
            Arc::new(MemoryLoginRepository::with_auth_data(AuthData::new(
                "http://teamcity:8111",
                "user:pass",
            ))),
            Arc::new(MemoryBuildsRepository::new()),
        )
    }

    #[test]
    fn test_initial_state() {
        let model = model_with(Arc::new(MockTeamCityApi::new()));
        assert_eq!(model.current_state(), AppState::Initial);
    }

    #[test]
    fn test_with_config_rejects_invalid_timeout() {
        let config = ModelConfig {
            fetch_timeout: "forever".to_string(),
        };

        let result = TeamCityModel::with_config(
            Arc::new(MockTeamCityApi::new()),
            Arc::new(MemoryLoginRepository::new()),
            Arc::new(MemoryBuildsRepository::new()),
            &config,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_with_config_timeout_off() {
        let config = ModelConfig {
            fetch_timeout: "off".to_string(),
        };

        let model = TeamCityModel::with_config(
            Arc::new(MockTeamCityApi::new()),
            Arc::new(MemoryLoginRepository::new()),
            Arc::new(MemoryBuildsRepository::new()),
            &config,
        )
        .unwrap();

        assert_eq!(model.inner.fetch_timeout, None);
    }

    #[tokio::test]
    async fn test_loading_state_is_emitted_synchronously() {
        let model = model_with(Arc::new(MockTeamCityApi::new()));

        model.perform(Action::StartApp);

        assert_eq!(model.current_state(), AppState::LoadingBuilds);
    }

    #[tokio::test]
    async fn test_fetch_maps_elapsed_to_timeout() {
        let config = ModelConfig {
            fetch_timeout: "10ms".to_string(),
        };
        let model = TeamCityModel::with_config(
            Arc::new(MockTeamCityApi::new()),
            Arc::new(MemoryLoginRepository::new()),
            Arc::new(MemoryBuildsRepository::new()),
            &config,
        )
        .unwrap();

        let result: Result<()> = model.inner.fetch(std::future::pending()).await;

        assert_eq!(
            result.unwrap_err().as_api(),
            Some(&ApiError::Timeout(Duration::from_millis(10)))
        );
    }

    #[tokio::test]
    async fn test_open_in_web_browser_without_build_is_ignored() {
        let model = model_with(Arc::new(MockTeamCityApi::new()));
        model.perform(Action::Logout);

        model.perform(Action::OpenInWebBrowser);

        assert_eq!(model.current_state(), AppState::login());
    }

    #[tokio::test]
    async fn test_configure_api_prefixes_credentials() {
        let api = Arc::new(MockTeamCityApi::new());
        let model = model_with(api.clone());

        model.perform(Action::StartApp);

        assert_eq!(api.address().as_deref(), Some("http://teamcity:8111"));
        assert_eq!(api.credentials().as_deref(), Some("Basic user:pass"));
        assert_eq!(
            &api.calls()[..2],
            &[
                ApiCall::SetAddress("http://teamcity:8111".to_string()),
                ApiCall::SetCredentials("Basic user:pass".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_changes_do_not_replace_newer_details() {
        let api = Arc::new(MockTeamCityApi::new());
        api.stub_changes(Stub::Never);
        let model = model_with(api);

        model.perform(Action::SelectBuild {
            build: Build::new(1),
        });
        model.perform(Action::SelectBuild {
            build: Build::new(2),
        });

        assert_eq!(
            model.current_state(),
            AppState::LoadingDetails {
                build: Build::new(2)
            }
        );
        assert_eq!(model.inner.selected_build().as_ref().map(|b| b.id), Some(2));
    }
}
