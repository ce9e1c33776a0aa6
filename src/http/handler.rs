//! HTTP handlers for the question page API

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::pipeline::{Agent, AgentError, NoopObserver};

/// Shared state behind the routes
pub struct AppState {
    pub agent: Agent,
    /// Graph instance name, reported by `/api/status`
    pub instance_name: String,
    /// Database name, reported by `/api/status`
    pub database: String,
}

/// Request for answering a question
#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Handler for questions
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> impl IntoResponse {
    match state.agent.ask(&payload.question, &NoopObserver).await {
        Ok(report) => Json(report).into_response(),
        Err(e @ AgentError::EmptyQuestion) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Handler for system status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "graph": {
            "instance": state.instance_name,
            "database": state.database,
        }
    }))
}
