// src/attempt/timer.rs

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::{task::JoinHandle, time::Instant};

use crate::{config::TICK_INTERVAL, utils::time::format_clock};

pub type ExpiryCallback = Arc<dyn Fn() + Send + Sync>;

/// Countdown timer driving a timed attempt.
///
/// While running, a single ticker task recomputes the remaining time from an
/// absolute deadline once per [`TICK_INTERVAL`], so late ticks never
/// accumulate drift. When the remaining time hits zero the ticker stops and
/// the expiry callback runs exactly once. The ticker is aborted on pause,
/// reset and drop.
///
/// `start` spawns onto the current Tokio runtime.
pub struct CountdownTimer {
    initial_seconds: u64,
    auto_start: bool,
    remaining: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
    on_expire: ExpiryCallback,
}

impl CountdownTimer {
    pub fn new<F>(initial_seconds: u64, auto_start: bool, on_expire: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut timer = Self {
            initial_seconds,
            auto_start,
            remaining: Arc::new(AtomicU64::new(initial_seconds)),
            running: Arc::new(AtomicBool::new(false)),
            ticker: None,
            on_expire: Arc::new(on_expire),
        };
        if auto_start {
            timer.start();
        }
        timer
    }

    /// Starts or resumes the countdown. No-op when already running or when
    /// no time is left.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let remaining = self.remaining();
        if remaining == 0 {
            return;
        }
        self.abort_ticker();

        let deadline = Instant::now() + Duration::from_secs(remaining);
        self.running.store(true, Ordering::SeqCst);

        let remaining_ref = Arc::clone(&self.remaining);
        let running = Arc::clone(&self.running);
        let on_expire = Arc::clone(&self.on_expire);

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            loop {
                interval.tick().await;
                let left = deadline.saturating_duration_since(Instant::now());
                let secs = seconds_rounded(left);
                remaining_ref.store(secs, Ordering::SeqCst);
                if secs == 0 {
                    running.store(false, Ordering::SeqCst);
                    tracing::debug!("Countdown reached zero");
                    on_expire();
                    break;
                }
            }
        }));
    }

    /// Stops ticking; `remaining` keeps its last value.
    pub fn pause(&mut self) {
        self.abort_ticker();
        self.running.store(false, Ordering::SeqCst);
    }

    /// Restores the initial duration. Restarts only for auto-start timers.
    pub fn reset(&mut self) {
        self.pause();
        self.remaining.store(self.initial_seconds, Ordering::SeqCst);
        if self.auto_start {
            self.start();
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Remaining time as `MM:SS`, or `H:MM:SS` for durations of an hour or more.
    pub fn formatted(&self) -> String {
        format_clock(self.remaining(), self.initial_seconds)
    }

    fn abort_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("initial_seconds", &self.initial_seconds)
            .field("remaining", &self.remaining())
            .field("running", &self.is_running())
            .finish()
    }
}

/// Whole seconds, rounded half up.
fn seconds_rounded(left: Duration) -> u64 {
    ((left.as_millis() + 500) / 1000) as u64
}
