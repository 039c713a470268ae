//! Application module
//!
//! Contains the vocabulary of the state machine:
//! - Actions: What can happen
//! - State: What is true right now
//! - Reducer: Pure derivations used to compute new states
//!
//! The side-effecting half lives in `crate::model`.

pub mod actions;
pub mod reducer;
pub mod state;

// Re-export commonly used types
pub use actions::Action;
pub use state::{AppState, LoginError, LoginState};
