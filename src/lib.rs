//! Crate entrypoint wiring together configuration, secrets, VK Cloud DNS, and the webhook API.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod secrets;
pub mod solver;
pub mod vkcloud;

use config::AppConfig;
use solver::Solver;

use std::sync::Arc;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub solver: Arc<dyn Solver>,
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
