use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod backend;
pub mod config;
pub mod handlers;
pub mod rate_limit;
pub mod types;

use backend::SearchBackend;
use rate_limit::RateLimiter;

/// Process-wide state, built once at startup and shared across requests.
pub struct AppState {
    pub backend: SearchBackend,
    pub rate_limiter: RateLimiter,
    pub index: String,
}

pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60));

    // Layers run outermost-first on the way in: trace, then CORS, then the
    // rate limiter. CORS sits outside the limiter so preflights and 429
    // responses still carry CORS headers.
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route("/search", post(handlers::search))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
