// ============================
// coderoom-backend-lib/src/handlers/live.rs
// ============================
//! Liveness and readiness endpoints.
use crate::transport::Transport;
use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz<T: Transport + Clone>(State(state): State<Arc<AppState<T>>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connections": state.transport.connection_count(),
        "rooms": state.coordinator.room_count(),
    }))
}
