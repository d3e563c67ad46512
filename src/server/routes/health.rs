//! Health check endpoint.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub subscribers: usize,
    pub uptime_secs: i64,
    pub started_at: DateTime<Utc>,
}

/// GET /health - Liveness and connection count
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        subscribers: state.hub.subscriber_count(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds().max(0),
        started_at: state.started_at,
    })
}
