//! In-memory repositories
//!
//! Values live for the lifetime of the repository. Every write is also
//! appended to a log so tests can verify exactly what was persisted.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{BuildsRepository, LoginRepository};
use crate::types::{AuthData, Project};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryLoginRepository {
    auth_data: Mutex<Option<AuthData>>,
    writes: Mutex<Vec<Option<AuthData>>>,
}

impl MemoryLoginRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds `auth_data`
    ///
    /// The initial value is not recorded as a write.
    pub fn with_auth_data(auth_data: AuthData) -> Self {
        Self {
            auth_data: Mutex::new(Some(auth_data)),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every value passed to `set_auth_data`, oldest first
    pub fn writes(&self) -> Vec<Option<AuthData>> {
        lock(&self.writes).clone()
    }
}

impl LoginRepository for MemoryLoginRepository {
    fn auth_data(&self) -> Option<AuthData> {
        lock(&self.auth_data).clone()
    }

    fn set_auth_data(&self, auth_data: Option<AuthData>) {
        lock(&self.writes).push(auth_data.clone());
        *lock(&self.auth_data) = auth_data;
    }
}

#[derive(Debug, Default)]
pub struct MemoryBuildsRepository {
    selected_projects: Mutex<Vec<Project>>,
    writes: Mutex<Vec<Vec<Project>>>,
}

impl MemoryBuildsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds a selection
    ///
    /// The initial value is not recorded as a write.
    pub fn with_selected_projects(projects: Vec<Project>) -> Self {
        Self {
            selected_projects: Mutex::new(projects),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every value passed to `set_selected_projects`, oldest first
    pub fn writes(&self) -> Vec<Vec<Project>> {
        lock(&self.writes).clone()
    }
}

impl BuildsRepository for MemoryBuildsRepository {
    fn selected_projects(&self) -> Vec<Project> {
        lock(&self.selected_projects).clone()
    }

    fn set_selected_projects(&self, projects: Vec<Project>) {
        lock(&self.writes).push(projects.clone());
        *lock(&self.selected_projects) = projects;
    }
}
