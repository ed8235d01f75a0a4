// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

/// A result at or above this percentage counts as passed.
pub const PASSING_SCORE_PERCENTAGE: f64 = 70.0;

/// Cadence of the countdown ticker and of the SSE timer stream.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Durations at or above this many seconds are rendered as `H:MM:SS`.
pub const HOUR_FORMAT_THRESHOLD_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote quiz API, e.g. `http://localhost:8000/api/`.
    pub quiz_api_url: Url,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    /// When set, quizzes are served from this JSON catalogue instead of the remote API.
    pub catalog_path: Option<String>,
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let raw_api_url = env::var("QUIZ_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api/".to_string());
        let quiz_api_url = parse_base_url(&raw_api_url).expect("QUIZ_API_URL must be a valid URL");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let catalog_path = env::var("QUIZ_CATALOG_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(10);

        Self {
            quiz_api_url,
            jwt_secret,
            rust_log,
            port,
            catalog_path,
            upstream_timeout_secs,
        }
    }
}

/// Parses the API base URL, forcing a trailing slash so `Url::join`
/// appends path segments instead of replacing the last one.
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}/", raw))
    }
}
