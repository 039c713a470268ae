//! Domain value types fetched from TeamCity or persisted by the repositories

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A queued, running or finished TeamCity build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u64,

    /// Build number as shown by TeamCity (e.g. "76"); queued builds have none yet
    #[serde(default)]
    pub number: String,

    #[serde(default)]
    pub status_text: String,

    pub build_type: BuildType,

    /// Start time; `None` while the build is still queued
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    pub web_url: String,
}

/// Build configuration a build belongs to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub project_name: String,
}

impl Build {
    /// Create a build with the given id and empty details
    pub fn new(id: u64) -> Self {
        Self {
            id,
            number: String::new(),
            status_text: String::new(),
            build_type: BuildType::default(),
            start_date: None,
            web_url: String::new(),
        }
    }

    /// Id of the project this build belongs to
    pub fn project_id(&self) -> &str {
        &self.build_type.project_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A project as listed in the project filter dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectableProject {
    pub project: Project,
    pub is_selected: bool,
}

impl SelectableProject {
    pub fn new(project: Project, is_selected: bool) -> Self {
        Self {
            project,
            is_selected,
        }
    }
}

/// A VCS change included in a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub username: String,
}

impl Change {
    pub fn new(comment: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            username: username.into(),
        }
    }
}

/// Server address and raw `user:password` credentials of the last login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    pub address: String,
    pub credentials: String,
}

impl AuthData {
    pub fn new(address: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            credentials: credentials.into(),
        }
    }
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthData")
            .field("address", &self.address)
            .field("credentials", &"<redacted>")
            .finish()
    }
}
