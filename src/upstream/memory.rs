// src/upstream/memory.rs

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptResult, SubmissionAck},
        question::Question,
        quiz::QuizInfo,
    },
    upstream::{QuizSource, ResultSink, Upstream},
};

/// One quiz of a catalogue file: the quiz fields plus its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub quiz: QuizInfo,
    pub questions: Vec<Question>,
}

/// Quiz catalogue held in memory, also recording submitted results.
///
/// Cloning shares the same catalogue. Used when the service runs without a
/// remote quiz API, and as the data source in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuizBank {
    quizzes: Arc<RwLock<HashMap<String, CatalogEntry>>>,
    submissions: Arc<RwLock<Vec<AttemptResult>>>,
}

impl InMemoryQuizBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let quizzes = entries
            .into_iter()
            .map(|entry| (entry.quiz.id.clone(), entry))
            .collect();
        Self {
            quizzes: Arc::new(RwLock::new(quizzes)),
            submissions: Arc::default(),
        }
    }

    /// Loads a JSON array of [`CatalogEntry`].
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)?;
        tracing::info!(
            "Loaded {} quizzes from {}",
            entries.len(),
            path.as_ref().display()
        );
        Ok(Self::from_entries(entries))
    }

    /// Adds or replaces a quiz.
    pub async fn insert(&self, entry: CatalogEntry) {
        self.quizzes
            .write()
            .await
            .insert(entry.quiz.id.clone(), entry);
    }

    /// Replaces the question set of an existing quiz.
    pub async fn replace_questions(&self, quiz_id: &str, questions: Vec<Question>) -> Result<(), AppError> {
        let mut quizzes = self.quizzes.write().await;
        let entry = quizzes
            .get_mut(quiz_id)
            .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
        entry.questions = questions;
        Ok(())
    }

    /// Results received so far, oldest first.
    pub async fn submissions(&self) -> Vec<AttemptResult> {
        self.submissions.read().await.clone()
    }
}

#[async_trait]
impl QuizSource for InMemoryQuizBank {
    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuizInfo, AppError> {
        self.quizzes
            .read()
            .await
            .get(quiz_id)
            .map(|entry| entry.quiz.clone())
            .ok_or(AppError::NotFound("Quiz not found".to_string()))
    }

    async fn fetch_questions(&self, quiz_id: &str) -> Result<Vec<Question>, AppError> {
        self.quizzes
            .read()
            .await
            .get(quiz_id)
            .map(|entry| entry.questions.clone())
            .ok_or(AppError::NotFound("Quiz not found".to_string()))
    }
}

#[async_trait]
impl ResultSink for InMemoryQuizBank {
    async fn submit_result(&self, result: &AttemptResult) -> Result<SubmissionAck, AppError> {
        self.submissions.write().await.push(result.clone());
        Ok(SubmissionAck {
            id: Some(result.attempt_id.to_string()),
            message: Some("Result recorded".to_string()),
        })
    }
}

impl Upstream for InMemoryQuizBank {
    fn quiz_source(&self, _bearer_token: &str) -> Arc<dyn QuizSource> {
        Arc::new(self.clone())
    }

    fn result_sink(&self, _bearer_token: &str) -> Option<Arc<dyn ResultSink>> {
        Some(Arc::new(self.clone()))
    }
}
