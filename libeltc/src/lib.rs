//! ELTC - reactive core of a TeamCity build-monitor client
//!
//! This library models the whole client as a state machine: user actions go
//! in through [`TeamCityModel::perform`], complete screen states come out of
//! [`TeamCityModel::state`]. Transport and persistence stay behind the
//! [`api::TeamCityApi`] and [`repository`] traits.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod repository;
pub mod types;

// Re-export commonly used types
pub use app::{Action, AppState, LoginError, LoginState};
pub use config::Config;
pub use error::{ApiError, EltcError, Result};
pub use model::stream::StateReceiver;
pub use model::TeamCityModel;
pub use types::{AuthData, Build, BuildType, Change, Project, SelectableProject};
