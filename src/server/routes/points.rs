//! Read-only scoreboard endpoint.
//!
//! Changes go through the WebSocket so every viewer is notified; this route
//! only serves the current totals.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::server::state::AppState;
use crate::store::CounterSet;

/// GET /api/points - Current points per house
pub async fn get_points(State(state): State<Arc<AppState>>) -> Json<CounterSet> {
    Json(state.store().snapshot())
}
