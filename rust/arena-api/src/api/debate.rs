//! Debate endpoints: start a session, submit an argument, end a session.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::AppState;

/// Create the debate router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session/start", post(start_session))
        .route("/api/argument", post(submit_argument))
        .route("/api/session/{id}/end", post(end_session))
}

/// Start-session request.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// The user's opening message; the debate topic is derived from it.
    pub initial_message: String,
    /// Room/category string. Opaque, optional.
    #[serde(default)]
    pub room: String,
}

/// Start-session response.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    /// The scripted topic-setting reply.
    pub message: String,
}

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, EngineError> {
    let outcome = state.engine.start(&req.initial_message, &req.room)?;
    Ok(Json(StartSessionResponse {
        session_id: outcome.session_id,
        message: outcome.message,
    }))
}

/// Argument submission request.
#[derive(Debug, Deserialize)]
pub struct ArgumentRequest {
    pub session_id: String,
    pub message: String,
}

/// One completed round.
#[derive(Debug, Serialize)]
pub struct ArgumentResponse {
    /// The agent's rebuttal.
    pub bot_response: String,
    pub user_points: u32,
    pub bot_points: u32,
    /// Session seconds remaining.
    pub time_remaining: u64,
    /// The ruling, or the judge-unavailable sentinel.
    pub judge_explanation: String,
    /// Rotating thinking-status line.
    pub status_update: String,
    pub session_active: bool,
}

async fn submit_argument(
    State(state): State<AppState>,
    Json(req): Json<ArgumentRequest>,
) -> Result<Json<ArgumentResponse>, EngineError> {
    let outcome = state.engine.submit(&req.session_id, &req.message).await?;
    Ok(Json(ArgumentResponse {
        bot_response: outcome.bot_response,
        user_points: outcome.user_points,
        bot_points: outcome.agent_points,
        time_remaining: outcome.time_remaining,
        judge_explanation: outcome.judge_explanation,
        status_update: outcome.status_update,
        session_active: outcome.session_active,
    }))
}

/// End-session response.
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    /// Non-empty summary; identical on repeated calls.
    pub final_report: String,
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EndSessionResponse>, EngineError> {
    let final_report = state.engine.end(&id).await?;
    Ok(Json(EndSessionResponse { final_report }))
}
