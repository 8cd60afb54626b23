//! Root endpoint with the API index

use crate::AppState;
use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /
///
/// Service name, version, endpoint index, and the validator map.
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": "Email Validation API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /validate": "Validate single email address",
            "POST /batch": "Validate multiple email addresses",
            "GET /validators": "List available validators",
            "PUT /validators/:name": "Enable/disable specific validator",
            "GET /health": "Health check endpoint",
        },
        "validators": state.checker.validators(),
    }))
}
