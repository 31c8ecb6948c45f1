use std::sync::Arc;
use tracing::info;

use search_api::{app, backend::SearchBackend, config::Config, rate_limit::RateLimiter, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    info!("Starting Search API");
    info!("Backend URL: {}", config.backend_url);
    info!("Search index: {}", config.index);

    // Create HTTP client; the timeout bounds every backend call
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    // Create application state
    let state = Arc::new(AppState {
        backend: SearchBackend::new(
            http_client,
            config.backend_url.clone(),
            config.backend_key.clone(),
        ),
        rate_limiter: RateLimiter::new(config.rate_limit),
        index: config.index.clone(),
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Search API listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
