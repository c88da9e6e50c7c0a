//! Application State

use std::sync::Arc;

use agent_core::Runner;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Agent runner and the session registry behind it
    pub runner: Arc<Runner>,

    pub config: Arc<ServerConfig>,
}
