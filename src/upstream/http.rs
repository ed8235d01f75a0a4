// src/upstream/http.rs

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    error::AppError,
    models::{
        answer::AnswerValue,
        attempt::{AttemptResult, SubmissionAck},
        question::Question,
        quiz::QuizInfo,
    },
    upstream::{QuizSource, ResultSink, Upstream},
};

/// Client for the remote quiz API.
///
/// * `GET  {base}/quizzes/{id}`
/// * `GET  {base}/quizzes/{id}/questions`
/// * `POST {base}/quizzes/{id}/submit`
///
/// Requests carry the user's bearer token when one is bound.
#[derive(Debug, Clone)]
pub struct HttpQuizApi {
    client: Client,
    base_url: Url,
    bearer: Option<String>,
}

/// Body posted to the submit endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPayload<'a> {
    attempt_id: String,
    answers: &'a BTreeMap<String, AnswerValue>,
    time_taken: &'a str,
    score: usize,
    total_questions: usize,
    completed_at: chrono::DateTime<chrono::Utc>,
}

impl HttpQuizApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            bearer: None,
        })
    }

    /// A copy of this client that authenticates as the given user.
    pub fn with_bearer(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            bearer: Some(token.to_string()),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::InternalServerError("Quiz API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], fallback: &str) -> Result<T, AppError> {
        let url = self.endpoint(segments)?;
        let response = self.request(Method::GET, url).send().await.map_err(|e| {
            tracing::warn!("Quiz API request failed: {:?}", e);
            AppError::Upstream(fallback.to_string())
        })?;

        if !response.status().is_success() {
            return Err(error_from_response(response, fallback).await);
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!("Quiz API returned an unexpected body: {:?}", e);
            AppError::Upstream(fallback.to_string())
        })
    }
}

/// Maps a non-success response to an `AppError`, preferring the API's own
/// `message` (or `error`) field over the fallback text.
async fn error_from_response(response: Response, fallback: &str) -> AppError {
    let status = response.status();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .or_else(|| body.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback.to_string());

    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::AuthError(message),
        _ => AppError::Upstream(message),
    }
}

#[async_trait]
impl QuizSource for HttpQuizApi {
    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizInfo, AppError> {
        self.get_json(&["quizzes", quiz_id], "Failed to fetch quiz details")
            .await
    }

    async fn fetch_questions(&self, quiz_id: &str) -> Result<Vec<Question>, AppError> {
        self.get_json(&["quizzes", quiz_id, "questions"], "Failed to fetch questions")
            .await
    }
}

#[async_trait]
impl ResultSink for HttpQuizApi {
    async fn submit_result(&self, result: &AttemptResult) -> Result<SubmissionAck, AppError> {
        let url = self.endpoint(&["quizzes", &result.quiz_id, "submit"])?;
        let payload = SubmitPayload {
            attempt_id: result.attempt_id.to_string(),
            answers: &result.answers,
            time_taken: &result.time_taken,
            score: result.score,
            total_questions: result.total_questions,
            completed_at: result.completed_at,
        };

        let response = self
            .request(Method::POST, url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to submit quiz").await);
        }

        // The acknowledgement body is informational; tolerate empty or foreign shapes.
        Ok(response.json::<SubmissionAck>().await.unwrap_or_default())
    }
}

impl Upstream for HttpQuizApi {
    fn quiz_source(&self, bearer_token: &str) -> Arc<dyn QuizSource> {
        Arc::new(self.with_bearer(bearer_token))
    }

    fn result_sink(&self, bearer_token: &str) -> Option<Arc<dyn ResultSink>> {
        Some(Arc::new(self.with_bearer(bearer_token)))
    }
}
