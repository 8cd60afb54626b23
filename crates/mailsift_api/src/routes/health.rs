//! Health check route

use crate::AppState;
use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: SystemTime,
    pub enabled_validators: usize,
    pub total_validators: usize,
    pub cache_size: u64,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let validators = state.checker.validators();
    let enabled = validators.values().filter(|on| **on).count();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: SystemTime::now(),
        enabled_validators: enabled,
        total_validators: validators.len(),
        cache_size: state.config.cache_size,
    })
}
