use std::sync::Arc;

use axum::extract::FromRef;

use crate::{attempt::AttemptRegistry, config::Config, upstream::Upstream};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub attempts: AttemptRegistry,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config,
            attempts: AttemptRegistry::new(),
            upstream,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AttemptRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.attempts.clone()
    }
}
