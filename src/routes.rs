// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, stream},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Every attempt route requires a bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (config, attempt registry, upstream).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let attempt_routes = Router::new()
        .route("/", get(attempt::get_attempt))
        .route("/start", post(attempt::start_attempt))
        .route("/answers", put(attempt::submit_answer))
        .route("/next", post(attempt::next_question))
        .route("/previous", post(attempt::previous_question))
        .route("/finish", post(attempt::finish_attempt))
        .route("/reset", post(attempt::reset_attempt))
        .route("/result", get(attempt::get_result))
        .route("/review", get(attempt::get_review))
        .route("/stream", get(stream::attempt_stream))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/attempt", attempt_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
