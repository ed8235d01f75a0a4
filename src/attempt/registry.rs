// src/attempt/registry.rs

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::attempt::controller::AttemptController;

/// One attempt controller per user. Attempts are never shared between users.
#[derive(Clone, Default)]
pub struct AttemptRegistry {
    attempts: Arc<Mutex<HashMap<String, AttemptController>>>,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<AttemptController> {
        self.attempts.lock().await.get(user_id).cloned()
    }

    /// Installs `controller` as the user's current attempt. The previous
    /// controller, if any, is reset so its timer stops.
    pub async fn replace(&self, user_id: &str, controller: AttemptController) {
        let previous = self
            .attempts
            .lock()
            .await
            .insert(user_id.to_string(), controller);

        if let Some(previous) = previous {
            previous.reset().await;
        }
    }

    /// Drops the user's controller, returning it so the caller can reset it.
    pub async fn remove(&self, user_id: &str) -> Option<AttemptController> {
        self.attempts.lock().await.remove(user_id)
    }
}
