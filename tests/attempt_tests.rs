// tests/attempt_tests.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_attempt::{
    attempt::{AttemptController, review::ReviewStatus},
    error::AppError,
    models::{
        attempt::{AttemptResult, AttemptStatus, SubmissionAck, SubmissionStatus},
        question::Question,
        quiz::QuizInfo,
    },
    upstream::{CatalogEntry, InMemoryQuizBank, QuizSource, ResultSink},
};
use serde_json::json;

/// Three-question quiz: single-choice, multi-choice and short-text.
fn web_quiz(duration_seconds: u64) -> CatalogEntry {
    serde_json::from_value(json!({
        "id": "web",
        "title": "Web Basics",
        "duration_seconds": duration_seconds,
        "questions": [
            {"id": "capital", "prompt": "Capital of France?", "type": "single-choice",
             "options": ["Paris", "London", "Berlin"], "correct": "Paris"},
            {"id": "colors", "prompt": "Pick the primary colours", "type": "multi-choice",
             "options": ["Red", "Green", "Blue"], "correct": ["Red", "Blue"]},
            {"id": "sql", "prompt": "What does SQL stand for?", "type": "short-text",
             "accepted": ["SQL", "Structured Query Language"]}
        ]
    }))
    .unwrap()
}

fn controller_for(bank: &InMemoryQuizBank) -> AttemptController {
    AttemptController::new(Arc::new(bank.clone()), Some(Arc::new(bank.clone())))
}

struct FailingSink;

#[async_trait]
impl ResultSink for FailingSink {
    async fn submit_result(&self, _result: &AttemptResult) -> Result<SubmissionAck, AppError> {
        Err(AppError::Upstream("Quiz API unavailable".to_string()))
    }
}

struct BrokenSource;

#[async_trait]
impl QuizSource for BrokenSource {
    async fn fetch_quiz(&self, _quiz_id: &str) -> Result<QuizInfo, AppError> {
        Err(AppError::Upstream("connection refused".to_string()))
    }

    async fn fetch_questions(&self, _quiz_id: &str) -> Result<Vec<Question>, AppError> {
        Err(AppError::Upstream("connection refused".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_correct_answers_score_full_marks() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(300)]);
    let controller = controller_for(&bank);

    let snapshot = controller.start("web").await;
    assert_eq!(snapshot.status, AttemptStatus::InProgress);
    assert_eq!(snapshot.current_question.unwrap().id, "capital");

    controller.answer("capital", "Paris".into()).await.unwrap();
    controller.next().await.unwrap();
    controller.answer("colors", vec!["Blue", "Red"].into()).await.unwrap();
    controller.next().await.unwrap();
    controller.answer("sql", " sql ".into()).await.unwrap();

    let snapshot = controller.next().await.unwrap();
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    let result = snapshot.result.unwrap();
    assert_eq!(result.score, 3);
    assert_eq!(result.total_questions, 3);
    assert!(matches!(
        snapshot.submission,
        Some(SubmissionStatus::Submitted { .. })
    ));

    let submitted = bank.submissions().await;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].attempt_id, result.attempt_id);
}

#[tokio::test(start_paused = true)]
async fn test_partial_answers_score_partially() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(300)]);
    let controller = controller_for(&bank);
    controller.start("web").await;

    controller.answer("capital", "London".into()).await.unwrap();
    controller.answer("colors", vec!["Red"].into()).await.unwrap();
    controller.answer("sql", "sql".into()).await.unwrap();

    let result = controller.finish().await.unwrap().result.unwrap();
    assert_eq!(result.score, 1);
    let correct: Vec<bool> = result.outcomes.iter().map(|o| o.correct).collect();
    assert_eq!(correct, vec![false, false, true]);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_questions_are_skipped_not_wrong() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(300)]);
    let controller = controller_for(&bank);
    controller.start("web").await;

    let result = controller.finish().await.unwrap().result.unwrap();
    assert_eq!(result.score, 0);
    assert!(result.answers.is_empty());

    let (summary, items) = controller.review().await.unwrap();
    assert_eq!(summary.percentage, 0);
    assert!(!summary.passed);
    assert!(items.iter().all(|item| item.status == ReviewStatus::Skipped));
}

#[tokio::test(start_paused = true)]
async fn test_timer_expiry_finishes_attempt() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(2)]);
    let controller = controller_for(&bank);

    let snapshot = controller.start("web").await;
    assert_eq!(snapshot.remaining_seconds, Some(2));
    assert_eq!(snapshot.remaining_formatted.as_deref(), Some("00:02"));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(controller.status().await, AttemptStatus::InProgress);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    assert_eq!(snapshot.remaining_seconds, Some(0));

    let result = snapshot.result.unwrap();
    assert_eq!(result.score, 0);
    assert_eq!(result.elapsed_seconds, 2);
    assert_eq!(result.time_taken, "00:02");
    assert_eq!(bank.submissions().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_navigation_keeps_answers() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = controller_for(&bank);
    controller.start("web").await;

    let snapshot = controller.previous().await.unwrap();
    assert_eq!(snapshot.current_index, Some(0));

    controller.answer("capital", "Paris".into()).await.unwrap();
    let snapshot = controller.next().await.unwrap();
    assert_eq!(snapshot.current_index, Some(1));
    assert_eq!(snapshot.current_question.unwrap().question_type, "multi-choice");

    let snapshot = controller.previous().await.unwrap();
    assert_eq!(snapshot.current_index, Some(0));
    assert_eq!(
        snapshot.answers.get("capital"),
        Some(&"Paris".into())
    );

    controller.answer("capital", "Berlin".into()).await.unwrap();
    let result = controller.finish().await.unwrap().result.unwrap();
    assert_eq!(result.answers.get("capital"), Some(&"Berlin".into()));
}

#[tokio::test(start_paused = true)]
async fn test_untimed_quiz_has_no_countdown() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = controller_for(&bank);

    let snapshot = controller.start("web").await;
    assert_eq!(snapshot.remaining_seconds, None);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(controller.status().await, AttemptStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_running_timer() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(2)]);
    let controller = controller_for(&bank);
    controller.start("web").await;

    tokio::time::sleep(Duration::from_secs(1)).await;
    let snapshot = controller.reset().await;
    assert_eq!(snapshot.status, AttemptStatus::Idle);
    assert!(snapshot.attempt_id.is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, AttemptStatus::Idle);
    assert!(snapshot.result.is_none());
    assert!(bank.submissions().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_ignores_previous_timer() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(2)]);
    let controller = controller_for(&bank);
    let first = controller.start("web").await.attempt_id;

    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = controller.start("web").await.attempt_id;
    assert_ne!(first, second);

    // The first attempt's deadline passes; the second one keeps running.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, AttemptStatus::InProgress);
    assert_eq!(snapshot.attempt_id, second);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    assert_eq!(snapshot.result.unwrap().attempt_id, second.unwrap());
    assert_eq!(bank.submissions().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_questions_are_snapshotted_at_start() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = controller_for(&bank);
    controller.start("web").await;

    bank.replace_questions("web", Vec::new()).await.unwrap();

    controller.answer("sql", "Structured Query Language".into()).await.unwrap();
    let result = controller.finish().await.unwrap().result.unwrap();
    assert_eq!(result.total_questions, 3);
    assert_eq!(result.score, 1);
}

#[tokio::test(start_paused = true)]
async fn test_submission_failure_keeps_local_result() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = AttemptController::new(Arc::new(bank), Some(Arc::new(FailingSink)));
    controller.start("web").await;
    controller.answer("capital", "Paris".into()).await.unwrap();

    let snapshot = controller.finish().await.unwrap();
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    assert_eq!(snapshot.result.unwrap().score, 1);
    assert_eq!(
        snapshot.submission,
        Some(SubmissionStatus::Failed {
            reason: "Quiz API unavailable".to_string()
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_without_sink_results_stay_local() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = AttemptController::new(Arc::new(bank.clone()), None);
    controller.start("web").await;

    let snapshot = controller.finish().await.unwrap();
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    assert_eq!(snapshot.submission, Some(SubmissionStatus::NotConfigured));
    assert!(bank.submissions().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_attempt_is_graded_only_once() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = controller_for(&bank);
    controller.start("web").await;

    controller.finish().await.unwrap();
    assert!(matches!(controller.finish().await, Err(AppError::Conflict(_))));
    assert!(matches!(controller.next().await, Err(AppError::Conflict(_))));
    assert!(matches!(
        controller.answer("capital", "Paris".into()).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(bank.submissions().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_or_empty_quiz_ends_in_error() {
    let mut empty = web_quiz(0);
    empty.quiz.id = "empty".to_string();
    empty.questions.clear();
    let bank = InMemoryQuizBank::from_entries(vec![empty]);
    let controller = controller_for(&bank);

    for quiz_id in ["empty", "missing"] {
        let snapshot = controller.start(quiz_id).await;
        assert_eq!(snapshot.status, AttemptStatus::Error);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Quiz not found or no questions available.")
        );
        assert!(snapshot.current_question.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_upstream_failure_ends_in_error() {
    let controller = AttemptController::new(Arc::new(BrokenSource), None);

    let snapshot = controller.start("web").await;
    assert_eq!(snapshot.status, AttemptStatus::Error);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Failed to load quiz. Please try again.")
    );
    assert!(matches!(controller.previous().await, Err(AppError::Conflict(_))));

    assert_eq!(controller.reset().await.status, AttemptStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_question_fails_while_loading() {
    let mut entry = web_quiz(300);
    entry.questions[0] = serde_json::from_value(json!({
        "id": "capital", "prompt": "Capital of France?", "type": "single-choice",
        "options": ["London", "Berlin"], "correct": "Paris"
    }))
    .unwrap();
    let bank = InMemoryQuizBank::from_entries(vec![entry]);
    let controller = controller_for(&bank);

    let snapshot = controller.start("web").await;
    assert_eq!(snapshot.status, AttemptStatus::Error);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Failed to load quiz. Please try again.")
    );
    assert!(snapshot.remaining_seconds.is_none());
    assert!(matches!(
        controller.answer("capital", "Paris".into()).await,
        Err(AppError::Conflict(_))
    ));
    assert!(bank.submissions().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_question_ids_fail_while_loading() {
    let mut entry = web_quiz(0);
    entry.questions[2].id = "capital".to_string();
    let bank = InMemoryQuizBank::from_entries(vec![entry]);
    let controller = controller_for(&bank);

    assert_eq!(controller.start("web").await.status, AttemptStatus::Error);
}

#[tokio::test(start_paused = true)]
async fn test_long_prompt_is_graded() {
    let mut entry = web_quiz(0);
    entry.questions[0].prompt = "Capital of France? ".repeat(150);
    entry.questions[0].id = "c".repeat(250);
    let question_id = entry.questions[0].id.clone();
    let bank = InMemoryQuizBank::from_entries(vec![entry]);
    let controller = controller_for(&bank);

    assert_eq!(controller.start("web").await.status, AttemptStatus::InProgress);
    controller.answer(&question_id, "Paris".into()).await.unwrap();

    let snapshot = controller.finish().await.unwrap();
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    assert_eq!(snapshot.result.unwrap().score, 1);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_option_labels_are_graded() {
    let mut entry = web_quiz(0);
    entry.questions[0] = serde_json::from_value(json!({
        "id": "capital", "prompt": "", "type": "single-choice",
        "options": ["Paris", "Paris", "London"], "correct": "Paris"
    }))
    .unwrap();
    let bank = InMemoryQuizBank::from_entries(vec![entry]);
    let controller = controller_for(&bank);

    assert_eq!(controller.start("web").await.status, AttemptStatus::InProgress);
    controller.answer("capital", "Paris".into()).await.unwrap();

    let snapshot = controller.finish().await.unwrap();
    assert_eq!(snapshot.status, AttemptStatus::Finished);
    assert_eq!(snapshot.result.unwrap().score, 1);
}

#[tokio::test(start_paused = true)]
async fn test_answer_to_unknown_question_is_rejected() {
    let bank = InMemoryQuizBank::from_entries(vec![web_quiz(0)]);
    let controller = controller_for(&bank);

    assert!(matches!(
        controller.answer("capital", "Paris".into()).await,
        Err(AppError::Conflict(_))
    ));

    controller.start("web").await;
    assert!(matches!(
        controller.answer("nope", "Paris".into()).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(controller.snapshot().await.answers.is_empty());
}
