// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use quiz_attempt::config::Config;
use quiz_attempt::routes;
use quiz_attempt::state::AppState;
use quiz_attempt::upstream::{HttpQuizApi, InMemoryQuizBank, Upstream};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let upstream: Arc<dyn Upstream> = match &config.catalog_path {
        Some(path) => {
            let bank = InMemoryQuizBank::load_from_file(path)
                .await
                .expect("Failed to load quiz catalogue");
            tracing::info!("Serving quizzes from local catalogue {}", path);
            Arc::new(bank)
        }
        None => {
            let api = HttpQuizApi::new(
                config.quiz_api_url.clone(),
                Duration::from_secs(config.upstream_timeout_secs),
            )
            .expect("Failed to build quiz API client");
            tracing::info!("Using quiz API at {}", config.quiz_api_url);
            Arc::new(api)
        }
    };

    let state = AppState::new(config.clone(), upstream);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
