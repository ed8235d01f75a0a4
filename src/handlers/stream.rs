// src/handlers/stream.rs

use std::convert::Infallible;

use axum::{
    Extension,
    extract::State,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::Utc;
use futures::stream::{self, Stream};
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    attempt::{AttemptController, AttemptRegistry},
    config::TICK_INTERVAL,
    error::AppError,
    handlers::current_attempt,
    models::{
        attempt::AttemptStatus,
        timer::{AttemptEnded, TimeExpired, TimerEvent, TimerTick},
    },
    utils::jwt::Claims,
};

/// SSE endpoint for the countdown of the caller's running attempt.
/// GET /api/attempt/stream
///
/// Emits `timer-tick` every second while the attempt runs, then one final
/// event before closing: `time-expired` when the time limit ended it, or
/// `attempt-ended` when it was finished early, reset or replaced.
pub async fn attempt_stream(
    State(attempts): State<AttemptRegistry>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let controller = current_attempt(&attempts, &claims.sub).await?;
    let snapshot = controller.snapshot().await;

    if snapshot.status != AttemptStatus::InProgress {
        return Err(AppError::Conflict("No quiz in progress".to_string()));
    }
    let attempt_id = snapshot
        .attempt_id
        .ok_or(AppError::Conflict("No quiz in progress".to_string()))?;
    if snapshot.remaining_seconds.is_none() {
        return Err(AppError::BadRequest("This quiz is not timed".to_string()));
    }

    tracing::info!("Client connected to timer stream: attempt={}", attempt_id);
    let stream = create_timer_stream(controller, attempt_id);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn create_timer_stream(
    controller: AttemptController,
    attempt_id: Uuid,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((controller, 0u64, false), move |(controller, ticks, final_sent)| async move {
        if final_sent {
            return None;
        }
        if ticks > 0 {
            sleep(TICK_INTERVAL).await;
        }

        let snapshot = controller.snapshot().await;
        let remaining = snapshot.remaining_seconds.unwrap_or(0);

        // While a result is being submitted the status is `loading`; keep ticking.
        let final_event = if snapshot.attempt_id != Some(attempt_id) {
            Some(TimerEvent::AttemptEnded(AttemptEnded {
                attempt_id,
                timestamp: Utc::now(),
                reason: "reset".to_string(),
            }))
        } else if snapshot.status != AttemptStatus::InProgress && remaining == 0 {
            Some(TimerEvent::TimeExpired(TimeExpired {
                attempt_id,
                timestamp: Utc::now(),
                message: "Time limit exceeded".to_string(),
            }))
        } else if matches!(snapshot.status, AttemptStatus::Finished | AttemptStatus::Error) {
            Some(TimerEvent::AttemptEnded(AttemptEnded {
                attempt_id,
                timestamp: Utc::now(),
                reason: snapshot.status.as_str().to_string(),
            }))
        } else {
            None
        };

        if let Some(final_event) = final_event {
            let event = Event::default()
                .event(final_event.event_name())
                .data(final_event.to_sse_data());

            tracing::info!(
                "Timer stream closing: attempt={} event={}",
                attempt_id,
                final_event.event_name()
            );
            return Some((Ok(event), (controller, ticks, true)));
        }

        let tick_event = TimerEvent::TimerTick(TimerTick {
            attempt_id,
            remaining_seconds: remaining,
            remaining_formatted: snapshot.remaining_formatted.unwrap_or_default(),
            timestamp: Utc::now(),
        });
        let event = Event::default()
            .event(tick_event.event_name())
            .data(tick_event.to_sse_data());

        Some((Ok(event), (controller, ticks + 1, false)))
    })
}
