//! Pure derivation helpers
//!
//! Everything here is a pure function of its inputs: no I/O, no locks, no
//! async. `TeamCityModel` performs the side effects and uses these helpers to
//! compute the states it emits.

use std::collections::HashSet;

use super::state::AppState;
use crate::types::{Build, Project, SelectableProject};

/// Build list shown to the user: queued builds first, each group in API order
pub fn combine_builds(queued: Vec<Build>, started: Vec<Build>) -> Vec<Build> {
    let mut builds = queued;
    builds.extend(started);
    builds
}

/// Ids of the selected projects, in selection order
pub fn selected_project_ids(selected: &[Project]) -> Vec<String> {
    selected.iter().map(|project| project.id.clone()).collect()
}

/// Keep only queued builds of the selected projects
///
/// TeamCity has no filtered queue endpoint, so the queue is filtered here.
/// An empty selection keeps every build.
pub fn filter_queued_builds(queued: Vec<Build>, project_ids: &[String]) -> Vec<Build> {
    if project_ids.is_empty() {
        return queued;
    }

    let ids: HashSet<&str> = project_ids.iter().map(String::as_str).collect();
    queued
        .into_iter()
        .filter(|build| ids.contains(build.project_id()))
        .collect()
}

/// Annotate every project with whether it is part of the stored selection
pub fn selectable_projects(projects: Vec<Project>, selected: &[Project]) -> Vec<SelectableProject> {
    let ids: HashSet<&str> = selected.iter().map(|project| project.id.as_str()).collect();
    projects
        .into_iter()
        .map(|project| {
            let is_selected = ids.contains(project.id.as_str());
            SelectableProject::new(project, is_selected)
        })
        .collect()
}

/// State after the user dismissed a login error
///
/// Returns `None` when there is nothing to dismiss, which is the case for
/// every state other than a login form showing an error.
pub fn accept_login_error(state: &AppState) -> Option<AppState> {
    match state {
        AppState::Login(login) if login.error.is_some() => {
            let mut login = login.clone();
            login.error = None;
            Some(AppState::Login(login))
        }
        _ => None,
    }
}
