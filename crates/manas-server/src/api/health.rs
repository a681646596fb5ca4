//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub capabilities: BTreeMap<&'static str, bool>,
}

/// Liveness plus which capabilities loaded at startup
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        capabilities: state.registry.availability(),
    })
}
