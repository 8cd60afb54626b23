//! Single and batch validation handlers

use crate::api_handler::{
    parse_validator_names, ApiError, ApiResult, BatchRequest, BatchResponse, ValidateRequest,
};
use crate::routes::MAX_BATCH_SIZE;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use futures::future::join_all;
use mailsift_core::CheckResult;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// POST /validate
///
/// Validate one address with all enabled validators, or the requested
/// subset.
#[instrument(skip_all, fields(request_id))]
pub async fn validate_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<CheckResult> {
    let Json(request) = body?;
    let request_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", request_id.as_str());

    if request.email.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Email is required".to_string()));
    }
    if request.timeout.is_some() {
        debug!("Per-request timeout is not supported; ignoring");
    }

    info!("Validating email");
    let validators = parse_validator_names(&request.validators);
    let result = state.checker.check_with(&request.email, &validators).await;

    debug!(
        "Validation completed in {:?}, valid={}",
        result.duration, result.is_valid
    );
    Ok(Json(result))
}

/// POST /batch
///
/// Validate up to [`MAX_BATCH_SIZE`] addresses concurrently. Results come
/// back in input order with aggregate counters.
#[instrument(skip_all, fields(request_id, batch_size))]
pub async fn batch_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<BatchResponse> {
    let Json(request) = body?;
    let request_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", request_id.as_str());
    tracing::Span::current().record("batch_size", request.emails.len());

    if request.emails.is_empty() {
        return Err(ApiError::InvalidRequest(
            "At least one email is required".to_string(),
        ));
    }
    if request.timeout.is_some() {
        debug!("Per-request timeout is not supported; ignoring");
    }
    if request.emails.len() > MAX_BATCH_SIZE {
        return Err(ApiError::InvalidRequest(format!(
            "Maximum {} emails per batch",
            MAX_BATCH_SIZE
        )));
    }

    info!("Validating batch of {} emails", request.emails.len());
    let validators = parse_validator_names(&request.validators);

    // join_all preserves input order.
    let checks = request.emails.iter().map(|email| {
        let checker = state.checker.clone();
        let validators = validators.clone();
        async move { checker.check_with(email, &validators).await }
    });
    let results = join_all(checks).await;

    Ok(Json(BatchResponse::from_results(results)))
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

    fn batch(emails: Vec<String>) -> Result<Json<BatchRequest>, JsonRejection> {
        Ok(Json(BatchRequest {
            emails,
            validators: Vec::new(),
            timeout: None,
        }))
    }

    #[tokio::test]
    async fn validate_requires_an_email() {
        let request = Ok(Json(ValidateRequest {
            email: "  ".to_string(),
            validators: Vec::new(),
            timeout: None,
        }));
        let err = validate_handler(State(test_state()), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let err = batch_handler(State(test_state()), batch(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected() {
        let emails = vec!["a@x.com".to_string(); MAX_BATCH_SIZE + 1];
        let err = batch_handler(State(test_state()), batch(emails))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn full_batch_keeps_input_order() {
        let emails: Vec<String> = (0..MAX_BATCH_SIZE).map(|i| format!("user{}@x.com", i)).collect();
        let Json(response) = batch_handler(State(test_state()), batch(emails.clone()))
            .await
            .unwrap();

        assert_eq!(response.results.len(), MAX_BATCH_SIZE);
        assert_eq!(response.summary.total, MAX_BATCH_SIZE);
        for (email, result) in emails.iter().zip(&response.results) {
            assert_eq!(&result.email, email);
        }
    }

    #[tokio::test]
    async fn duplicate_batch_entries_are_served_in_order() {
        let state = test_state();

        // Warm the cache so the duplicate below is a guaranteed hit.
        batch_handler(
            State(Arc::clone(&state)),
            batch(vec!["a@x.com".to_string(), "b@x.com".to_string()]),
        )
        .await
        .unwrap();

        let emails = vec![
            "a@x.com".to_string(),
            "b@x.com".to_string(),
            "a@x.com".to_string(),
        ];
        let Json(response) = batch_handler(State(state), batch(emails)).await.unwrap();

        let returned: Vec<&str> = response.results.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(returned, vec!["a@x.com", "b@x.com", "a@x.com"]);
        // Both occurrences come from the same cached entry.
        assert_eq!(
            serde_json::to_value(&response.results[0]).unwrap(),
            serde_json::to_value(&response.results[2]).unwrap()
        );
    }
}
