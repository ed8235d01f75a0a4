// src/attempt/controller.rs

use std::sync::Arc;

use tokio::{sync::Mutex, time::Instant};
use uuid::Uuid;

use crate::{
    attempt::{
        answers::AnswerStore,
        cursor::{Cursor, Step},
        grading::{check_questions, grade},
        review::{ResultSummary, ReviewItem, review, summarize},
        timer::CountdownTimer,
    },
    error::AppError,
    models::{
        answer::AnswerValue,
        attempt::{AttemptResult, AttemptSnapshot, AttemptStatus, SubmissionStatus},
        question::Question,
        quiz::QuizInfo,
    },
    upstream::{QuizSource, ResultSink},
    utils::time::format_clock,
};

const LOAD_NOT_FOUND_MESSAGE: &str = "Quiz not found or no questions available.";
const LOAD_FAILED_MESSAGE: &str = "Failed to load quiz. Please try again.";
const GRADING_FAILED_MESSAGE: &str = "Failed to process quiz results.";

/// What ended the attempt. Only used for logging.
#[derive(Debug, Clone, Copy)]
enum FinishTrigger {
    LastQuestion,
    Manual,
    TimeExpired,
}

/// Runs one user's quiz attempts.
///
/// State machine: `idle -> loading -> in-progress -> finished`, with `error`
/// reachable from loading and grading. `reset` returns to `idle` from any
/// state. Cloning yields another handle to the same attempt.
///
/// Every attempt has an epoch. Work that outlives its attempt (a fetch, a
/// timer callback, a submission) checks the epoch before touching state, so
/// a torn-down attempt can never write into a newer one, and grading runs at
/// most once per attempt.
#[derive(Clone)]
pub struct AttemptController {
    source: Arc<dyn QuizSource>,
    sink: Option<Arc<dyn ResultSink>>,
    state: Arc<Mutex<AttemptState>>,
}

struct AttemptState {
    epoch: u64,
    attempt_id: Option<Uuid>,
    status: AttemptStatus,
    quiz: Option<QuizInfo>,
    /// Snapshot taken at start; later edits upstream do not reach it.
    questions: Vec<Question>,
    cursor: Option<Cursor>,
    answers: AnswerStore,
    timer: Option<CountdownTimer>,
    started_at: Option<Instant>,
    result: Option<AttemptResult>,
    error: Option<String>,
    submission: Option<SubmissionStatus>,
}

impl AttemptState {
    fn idle(epoch: u64) -> Self {
        Self {
            epoch,
            attempt_id: None,
            status: AttemptStatus::Idle,
            quiz: None,
            questions: Vec::new(),
            cursor: None,
            answers: AnswerStore::new(),
            timer: None,
            started_at: None,
            result: None,
            error: None,
            submission: None,
        }
    }

    /// Drops everything of the current attempt (the timer's ticker included)
    /// and opens a new epoch.
    fn teardown(&mut self) -> u64 {
        let epoch = self.epoch + 1;
        *self = AttemptState::idle(epoch);
        epoch
    }

    fn require_in_progress(&self) -> Result<(), AppError> {
        if self.status == AttemptStatus::InProgress {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "No quiz in progress (status: {})",
                self.status.as_str()
            )))
        }
    }

    fn fail(&mut self, message: &str) {
        if let Some(timer) = self.timer.as_mut() {
            timer.pause();
        }
        self.status = AttemptStatus::Error;
        self.error = Some(message.to_string());
    }

    /// Grades the attempt if it is still in progress.
    ///
    /// Returns the result when it still has to be submitted. With a sink the
    /// status stays `loading` until [`settle_submission`] runs.
    fn grade_now(&mut self, trigger: FinishTrigger, has_sink: bool) -> Option<AttemptResult> {
        if self.status != AttemptStatus::InProgress {
            return None;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.pause();
        }
        self.status = AttemptStatus::Loading;

        let Some(attempt_id) = self.attempt_id else {
            self.fail(GRADING_FAILED_MESSAGE);
            return None;
        };

        let grade = match grade(&self.questions, &self.answers) {
            Ok(grade) => grade,
            Err(e) => {
                tracing::error!("Grading attempt {} failed: {}", attempt_id, e);
                self.fail(GRADING_FAILED_MESSAGE);
                return None;
            }
        };

        let Some((quiz_id, quiz_title, duration_seconds)) = self
            .quiz
            .as_ref()
            .map(|quiz| (quiz.id.clone(), quiz.title.clone(), quiz.duration_seconds))
        else {
            self.fail(GRADING_FAILED_MESSAGE);
            return None;
        };

        let elapsed_seconds = self
            .started_at
            .map(|started| started.elapsed().as_secs())
            .unwrap_or(0);

        let result = AttemptResult {
            attempt_id,
            quiz_id,
            quiz_title,
            score: grade.score,
            total_questions: grade.total,
            answers: self.answers.snapshot(),
            outcomes: grade.outcomes,
            elapsed_seconds,
            time_taken: format_clock(elapsed_seconds, duration_seconds),
            completed_at: chrono::Utc::now(),
        };

        tracing::info!(
            "Attempt {} graded ({:?}): {}/{} in {}",
            attempt_id,
            trigger,
            result.score,
            result.total_questions,
            result.time_taken
        );

        self.result = Some(result.clone());
        if has_sink {
            self.submission = Some(SubmissionStatus::Pending);
            Some(result)
        } else {
            self.submission = Some(SubmissionStatus::NotConfigured);
            self.status = AttemptStatus::Finished;
            None
        }
    }

    fn snapshot(&self) -> AttemptSnapshot {
        let current_question = match (&self.cursor, self.status) {
            (Some(cursor), AttemptStatus::InProgress) => self
                .questions
                .get(cursor.index())
                .map(Question::to_public),
            _ => None,
        };

        AttemptSnapshot {
            attempt_id: self.attempt_id,
            status: self.status,
            quiz: self.quiz.clone(),
            current_question,
            current_index: self.cursor.as_ref().map(Cursor::index),
            total_questions: self.questions.len(),
            remaining_seconds: self.timer.as_ref().map(CountdownTimer::remaining),
            remaining_formatted: self.timer.as_ref().map(CountdownTimer::formatted),
            answers: self.answers.snapshot(),
            result: self.result.clone(),
            error: self.error.clone(),
            submission: self.submission.clone(),
        }
    }
}

impl AttemptController {
    pub fn new(source: Arc<dyn QuizSource>, sink: Option<Arc<dyn ResultSink>>) -> Self {
        Self {
            source,
            sink,
            state: Arc::new(Mutex::new(AttemptState::idle(0))),
        }
    }

    /// Starts a new attempt, tearing down the current one first.
    ///
    /// Never fails: fetch problems and empty quizzes end in the `error`
    /// state with a user-facing message.
    pub async fn start(&self, quiz_id: &str) -> AttemptSnapshot {
        let epoch = {
            let mut state = self.state.lock().await;
            let epoch = state.teardown();
            state.status = AttemptStatus::Loading;
            epoch
        };

        tracing::info!("Loading quiz {}", quiz_id);
        let fetched = tokio::try_join!(
            self.source.fetch_quiz(quiz_id),
            self.source.fetch_questions(quiz_id)
        )
        .and_then(|(quiz, questions)| {
            check_questions(&questions)?;
            Ok((quiz, questions))
        });

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!("Discarding load of quiz {}: attempt was superseded", quiz_id);
            return state.snapshot();
        }

        match fetched {
            Ok((quiz, questions)) => match Cursor::new(questions.len()) {
                Some(cursor) => {
                    let attempt_id = Uuid::new_v4();
                    tracing::info!(
                        "Attempt {} started: quiz={} questions={} duration={}s",
                        attempt_id,
                        quiz.id,
                        questions.len(),
                        quiz.duration_seconds
                    );

                    if quiz.duration_seconds > 0 {
                        let mut timer =
                            CountdownTimer::new(quiz.duration_seconds, false, self.expiry_callback(epoch));
                        timer.start();
                        state.timer = Some(timer);
                    }

                    state.attempt_id = Some(attempt_id);
                    state.quiz = Some(quiz);
                    state.questions = questions;
                    state.cursor = Some(cursor);
                    state.answers.clear();
                    state.started_at = Some(Instant::now());
                    state.status = AttemptStatus::InProgress;
                }
                None => {
                    tracing::warn!("Quiz {} has no questions", quiz_id);
                    state.fail(LOAD_NOT_FOUND_MESSAGE);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to load quiz {}: {}", quiz_id, e);
                let message = match e {
                    AppError::NotFound(_) => LOAD_NOT_FOUND_MESSAGE,
                    _ => LOAD_FAILED_MESSAGE,
                };
                state.fail(message);
            }
        }

        state.snapshot()
    }

    /// Records the answer to a question of the running attempt.
    pub async fn answer(&self, question_id: &str, value: AnswerValue) -> Result<AttemptSnapshot, AppError> {
        let mut state = self.state.lock().await;
        state.require_in_progress()?;
        if !state.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::BadRequest(format!(
                "Unknown question '{}'",
                question_id
            )));
        }

        tracing::debug!("Answer recorded for question {}", question_id);
        state.answers.set(question_id, value);
        Ok(state.snapshot())
    }

    /// Moves to the next question, or grades the attempt on the last one.
    pub async fn next(&self) -> Result<AttemptSnapshot, AppError> {
        let (epoch, pending) = {
            let mut state = self.state.lock().await;
            state.require_in_progress()?;
            let step = state
                .cursor
                .as_mut()
                .map(Cursor::next)
                .ok_or_else(|| AppError::InternalServerError("Attempt has no cursor".to_string()))?;

            match step {
                Step::Moved(index) => {
                    tracing::debug!("Moved to question {}", index);
                    return Ok(state.snapshot());
                }
                Step::Complete => (
                    state.epoch,
                    state.grade_now(FinishTrigger::LastQuestion, self.sink.is_some()),
                ),
            }
        };

        self.settle(epoch, pending).await;
        Ok(self.snapshot().await)
    }

    /// Moves back one question; stays put on the first one.
    pub async fn previous(&self) -> Result<AttemptSnapshot, AppError> {
        let mut state = self.state.lock().await;
        state.require_in_progress()?;
        if let Some(cursor) = state.cursor.as_mut() {
            cursor.previous();
        }
        Ok(state.snapshot())
    }

    /// Grades the attempt right away, wherever the cursor is.
    pub async fn finish(&self) -> Result<AttemptSnapshot, AppError> {
        let (epoch, pending) = {
            let mut state = self.state.lock().await;
            state.require_in_progress()?;
            (
                state.epoch,
                state.grade_now(FinishTrigger::Manual, self.sink.is_some()),
            )
        };

        self.settle(epoch, pending).await;
        Ok(self.snapshot().await)
    }

    /// Back to `idle` from any state, discarding the attempt.
    pub async fn reset(&self) -> AttemptSnapshot {
        let mut state = self.state.lock().await;
        if let Some(attempt_id) = state.attempt_id {
            tracing::info!("Attempt {} reset", attempt_id);
        }
        state.teardown();
        state.snapshot()
    }

    pub async fn snapshot(&self) -> AttemptSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn status(&self) -> AttemptStatus {
        self.state.lock().await.status
    }

    /// The graded result, once available.
    pub async fn result(&self) -> Option<AttemptResult> {
        self.state.lock().await.result.clone()
    }

    /// Summary and per-question review of the graded attempt.
    pub async fn review(&self) -> Result<(ResultSummary, Vec<ReviewItem>), AppError> {
        let state = self.state.lock().await;
        let result = state
            .result
            .as_ref()
            .ok_or(AppError::NotFound("No result available yet".to_string()))?;
        Ok((summarize(result), review(&state.questions, result)))
    }

    async fn settle(&self, epoch: u64, pending: Option<AttemptResult>) {
        if let (Some(result), Some(sink)) = (pending, self.sink.as_ref()) {
            settle_submission(&self.state, sink.as_ref(), epoch, result).await;
        }
    }

    /// Callback for the attempt's timer. Holds only a weak reference so a
    /// dropped controller is not kept alive by its ticker.
    fn expiry_callback(&self, epoch: u64) -> impl Fn() + Send + Sync + 'static {
        let state = Arc::downgrade(&self.state);
        let sink = self.sink.clone();
        move || {
            let state = state.clone();
            let sink = sink.clone();
            tokio::spawn(async move {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let pending = {
                    let mut guard = state.lock().await;
                    if guard.epoch != epoch {
                        return;
                    }
                    tracing::info!("Time is up for attempt {:?}", guard.attempt_id);
                    guard.grade_now(FinishTrigger::TimeExpired, sink.is_some())
                };
                if let (Some(result), Some(sink)) = (pending, sink) {
                    settle_submission(&state, sink.as_ref(), epoch, result).await;
                }
            });
        }
    }
}

/// Posts the result and moves the attempt to `finished` whatever the outcome.
async fn settle_submission(
    state: &Mutex<AttemptState>,
    sink: &dyn ResultSink,
    epoch: u64,
    result: AttemptResult,
) {
    let outcome = sink.submit_result(&result).await;

    let mut state = state.lock().await;
    if state.epoch != epoch {
        return;
    }
    state.submission = Some(match outcome {
        Ok(ack) => SubmissionStatus::Submitted { ack },
        Err(e) => {
            tracing::warn!("Submitting attempt {} failed: {}", result.attempt_id, e);
            SubmissionStatus::Failed {
                reason: e.message().to_string(),
            }
        }
    });
    state.status = AttemptStatus::Finished;
}
