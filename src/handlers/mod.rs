// src/handlers/mod.rs

pub mod attempt;
pub mod stream;

use crate::{attempt::AttemptController, attempt::AttemptRegistry, error::AppError};

/// The caller's current attempt, or 409 when they never started one.
pub(crate) async fn current_attempt(
    attempts: &AttemptRegistry,
    user_id: &str,
) -> Result<AttemptController, AppError> {
    attempts
        .get(user_id)
        .await
        .ok_or(AppError::Conflict("No quiz in progress".to_string()))
}
