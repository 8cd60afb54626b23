//! Validator listing and runtime management

use crate::api_handler::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::Json;
use mailsift_core::CheckerName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ValidatorsResponse {
    pub validators: HashMap<CheckerName, bool>,
}

/// GET /validators
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Json<ValidatorsResponse> {
    Json(ValidatorsResponse {
        validators: state.checker.validators(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SetEnabledResponse {
    pub validator: CheckerName,
    pub enabled: bool,
    pub message: String,
}

/// PUT /validators/:name
///
/// Enable or disable one validator. Unknown names yield 404.
pub async fn set_enabled_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Result<Json<SetEnabledRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<SetEnabledResponse> {
    let Json(request) = body?;
    let validator: CheckerName = name
        .parse()
        .map_err(|_| ApiError::NotFound(format!("validator {} not found", name)))?;

    state
        .checker
        .set_validator_enabled(validator, request.enabled)?;

    let state_word = if request.enabled { "enabled" } else { "disabled" };
    info!("Validator {} {}", validator, state_word);

    Ok(Json(SetEnabledResponse {
        validator,
        enabled: request.enabled,
        message: format!("Validator {} {}", validator, state_word),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use mailsift_core::EmailChecker;
    use pretty_assertions::assert_eq;

    fn test_state() -> Arc<AppState> {
        let config = AppConfig::default();
        let checker = EmailChecker::new(config.checker_config()).unwrap();
        Arc::new(AppState { checker, config })
    }

    #[tokio::test]
    async fn unknown_validator_name_is_not_found() {
        let err = set_enabled_handler(
            State(test_state()),
            Path("dnsbl".to_string()),
            Ok(Json(SetEnabledRequest { enabled: true })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn known_but_unconstructed_validator_is_not_found() {
        // `disposable` parses but was never constructed (no list file).
        let err = set_enabled_handler(
            State(test_state()),
            Path("disposable".to_string()),
            Ok(Json(SetEnabledRequest { enabled: true })),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn toggling_a_validator_round_trips() {
        let state = test_state();

        let Json(response) = set_enabled_handler(
            State(Arc::clone(&state)),
            Path("mx".to_string()),
            Ok(Json(SetEnabledRequest { enabled: true })),
        )
        .await
        .unwrap();
        assert_eq!(response.validator, CheckerName::Mx);
        assert!(response.enabled);

        let Json(listing) = list_handler(State(state)).await;
        assert_eq!(listing.validators[&CheckerName::Mx], true);
    }
}
