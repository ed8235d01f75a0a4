// src/upstream/mod.rs

//! Collaborators the attempt engine talks to: where quizzes come from and
//! where finished results go.

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptResult, SubmissionAck},
        question::Question,
        quiz::QuizInfo,
    },
};

pub use http::HttpQuizApi;
pub use memory::{CatalogEntry, InMemoryQuizBank};

/// Supplies quiz metadata and the ordered question set.
#[async_trait]
pub trait QuizSource: Send + Sync {
    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizInfo, AppError>;

    async fn fetch_questions(&self, quiz_id: &str) -> Result<Vec<Question>, AppError>;
}

/// Receives finished results. Failures never undo the local result.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn submit_result(&self, result: &AttemptResult) -> Result<SubmissionAck, AppError>;
}

/// Builds the collaborators acting on behalf of one authenticated user.
pub trait Upstream: Send + Sync {
    fn quiz_source(&self, bearer_token: &str) -> Arc<dyn QuizSource>;

    /// `None` when results are kept locally only.
    fn result_sink(&self, bearer_token: &str) -> Option<Arc<dyn ResultSink>>;
}
