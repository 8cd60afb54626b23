//! API Routes Module
//!
//! Endpoints grouped by concern:
//! - `index`: service documentation at the root
//! - `validate`: single and batch validation
//! - `validators`: listing and runtime enable/disable
//! - `health`: health check

pub mod health;
pub mod index;
pub mod validate;
pub mod validators;

use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

/// Maximum number of addresses accepted in one batch request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Build all API routes with the shared application state applied.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index::index_handler))
        .route("/validate", post(validate::validate_handler))
        .route("/batch", post(validate::batch_handler))
        .route("/validators", get(validators::list_handler))
        .route("/validators/:name", put(validators::set_enabled_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}
