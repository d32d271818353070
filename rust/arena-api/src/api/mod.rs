//! HTTP API routes.

pub mod debate;
pub mod events;
pub mod health;

use axum::Router;

use crate::AppState;

/// Create the combined API router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(debate::router())
        .merge(events::router())
        .merge(health::router())
}
