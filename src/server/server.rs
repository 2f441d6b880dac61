use std::time::Instant;

use anyhow::Result;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::debug;

use super::routes;
use super::state::ServerState;

async fn log_requests(request: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    debug!(
        "{} {} -> {} ({}ms)",
        method,
        path,
        response.status(),
        start.elapsed().as_millis()
    );
    response
}

pub fn make_app(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/mood/analyze", post(routes::analyze_mood))
        .route("/suggestions", post(routes::create_suggestions))
        .route("/suggestions/recent", get(routes::recent_suggestions))
        .route("/cache/stats", get(routes::cache_stats))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

pub async fn run_server(port: u16, state: ServerState) -> Result<()> {
    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Listening on port {}", port);
    Ok(axum::serve(listener, app).await?)
}
