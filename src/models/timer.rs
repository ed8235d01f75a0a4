// src/models/timer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TimerEvent {
    TimerTick(TimerTick),
    TimeExpired(TimeExpired),
    AttemptEnded(AttemptEnded),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimerTick {
    pub attempt_id: Uuid,
    pub remaining_seconds: u64,
    pub remaining_formatted: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeExpired {
    pub attempt_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// The attempt stopped before its time ran out.
/// `reason` is the attempt status (`finished`, `error`), or `reset` when the
/// attempt was discarded or replaced.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AttemptEnded {
    pub attempt_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

impl TimerEvent {
    pub fn to_sse_data(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            TimerEvent::TimerTick(_) => "timer-tick",
            TimerEvent::TimeExpired(_) => "time-expired",
            TimerEvent::AttemptEnded(_) => "attempt-ended",
        }
    }
}
