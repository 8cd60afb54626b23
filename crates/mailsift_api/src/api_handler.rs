//! Shared API types and error handling
//!
//! Request/response bodies and the error-to-status mapping used across all
//! endpoints.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use mailsift_core::{CheckResult, CheckerName, EngineError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Body of `POST /validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub email: String,
    /// Specific validators to run; empty means "all enabled".
    #[serde(default)]
    pub validators: Vec<String>,
    /// Accepted for wire compatibility; per-request timeouts are not
    /// supported.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Body of `POST /batch`.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub emails: Vec<String>,
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Aggregate counters over a batch response.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub disposable: usize,
    pub free: usize,
    pub role: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<CheckResult>,
    pub summary: BatchSummary,
}

impl BatchResponse {
    pub fn from_results(results: Vec<CheckResult>) -> Self {
        let valid = results.iter().filter(|r| r.is_valid).count();
        let flagged = |pick: fn(&mailsift_core::CheckSummary) -> bool| {
            results
                .iter()
                .filter(|r| r.summary.as_ref().is_some_and(pick))
                .count()
        };

        let summary = BatchSummary {
            total: results.len(),
            valid,
            invalid: results.len() - valid,
            disposable: flagged(|s| s.is_disposable),
            free: flagged(|s| s.is_free),
            role: flagged(|s| s.is_role),
        };

        Self { results, summary }
    }
}

/// Resolve requested validator names, skipping unknown ones.
pub fn parse_validator_names(names: &[String]) -> Vec<CheckerName> {
    names
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                debug!("Ignoring unknown validator name {:?}", name);
                None
            }
        })
        .collect()
}

/// API-level failures mapped onto HTTP statuses.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson(#[from] JsonRejection),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::UnknownChecker(_) => ApiError::NotFound(e.to_string()),
            other => ApiError::InvalidRequest(other.to_string()),
        }
    }
}

/// Error body returned to callers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidJson(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mailsift_core::CheckSummary;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::time::{Duration, SystemTime};

    fn result(is_valid: bool, summary: CheckSummary) -> CheckResult {
        CheckResult {
            email: "a@x.com".to_string(),
            timestamp: SystemTime::now(),
            duration: Duration::ZERO,
            results: HashMap::new(),
            is_valid,
            summary: Some(summary),
        }
    }

    #[test]
    fn batch_summary_counts_flags() {
        let results = vec![
            result(true, CheckSummary::default()),
            result(
                false,
                CheckSummary {
                    is_disposable: true,
                    ..Default::default()
                },
            ),
            result(
                false,
                CheckSummary {
                    is_free: true,
                    is_role: true,
                    ..Default::default()
                },
            ),
        ];

        let response = BatchResponse::from_results(results);
        assert_eq!(response.summary.total, 3);
        assert_eq!(response.summary.valid, 1);
        assert_eq!(response.summary.invalid, 2);
        assert_eq!(response.summary.disposable, 1);
        assert_eq!(response.summary.free, 1);
        assert_eq!(response.summary.role, 1);
    }

    #[test]
    fn unknown_validator_names_are_skipped() {
        let names = vec![
            "syntax".to_string(),
            "bogus".to_string(),
            "mx".to_string(),
        ];
        assert_eq!(
            parse_validator_names(&names),
            vec![CheckerName::Syntax, CheckerName::Mx]
        );
    }
}
