//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::AppConfig;
use crate::session::DebateEngine;
use crate::AppState;

/// Create the application with all routes and middleware.
pub async fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let engine = DebateEngine::new(config.debate.clone());
    tracing::info!(
        session_secs = config.debate.session_secs,
        prompt_secs = config.debate.prompt_secs,
        seeded_judge = config.debate.judge_seed.is_some(),
        "debate engine initialized"
    );

    let timeout = Duration::from_secs(config.server.timeout_secs);
    let state = AppState {
        config: Arc::new(config),
        engine,
    };

    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
