// src/handlers/attempt.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    attempt::{AttemptController, AttemptRegistry},
    error::AppError,
    handlers::current_attempt,
    models::attempt::{AnswerRequest, AttemptSnapshot, StartAttemptRequest},
    state::AppState,
    utils::jwt::{BearerToken, Claims},
};

/// Starts a new attempt for the caller.
///
/// * Any attempt the caller already has is torn down first.
/// * Quiz and questions are fetched upstream with the caller's token.
/// * Load failures come back as a snapshot in the `error` state, not as an HTTP error.
pub async fn start_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Json(req): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let controller = AttemptController::new(
        state.upstream.quiz_source(&token),
        state.upstream.result_sink(&token),
    );
    state.attempts.replace(&claims.sub, controller.clone()).await;

    let snapshot = controller.start(&req.quiz_id).await;
    Ok(Json(snapshot))
}

/// Returns the caller's current attempt (idle when there is none).
pub async fn get_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = match attempts.get(&claims.sub).await {
        Some(controller) => controller.snapshot().await,
        None => AttemptSnapshot::idle(),
    };
    Ok(Json(snapshot))
}

/// Records an answer. The value is a string, or an array for multi-choice questions.
pub async fn submit_answer(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let controller = current_attempt(&attempts, &claims.sub).await?;
    let snapshot = controller.answer(&req.question_id, req.value).await?;
    Ok(Json(snapshot))
}

/// Advances to the next question; on the last question this grades the attempt.
pub async fn next_question(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let controller = current_attempt(&attempts, &claims.sub).await?;
    Ok(Json(controller.next().await?))
}

pub async fn previous_question(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let controller = current_attempt(&attempts, &claims.sub).await?;
    Ok(Json(controller.previous().await?))
}

/// Grades the attempt immediately.
pub async fn finish_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let controller = current_attempt(&attempts, &claims.sub).await?;
    Ok(Json(controller.finish().await?))
}

/// Discards the caller's attempt and forgets it.
pub async fn reset_attempt(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = match attempts.remove(&claims.sub).await {
        Some(controller) => controller.reset().await,
        None => AttemptSnapshot::idle(),
    };
    Ok(Json(snapshot))
}

/// Returns the graded result. 404 until the attempt has been graded.
pub async fn get_result(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let result = current_attempt(&attempts, &claims.sub)
        .await?
        .result()
        .await
        .ok_or(AppError::NotFound("No result available yet".to_string()))?;
    Ok(Json(result))
}

/// Score summary plus per-question review (correct / incorrect / skipped).
pub async fn get_review(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let controller = current_attempt(&attempts, &claims.sub).await?;
    let (summary, items) = controller.review().await?;
    Ok(Json(json!({
        "summary": summary,
        "items": items,
    })))
}
