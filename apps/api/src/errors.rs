use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis_client::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The analysis service answered with an error of its own. The message is
    /// meant for the user and is passed through.
    #[error("Analysis rejected: {0}")]
    AnalysisRejected(String),

    #[error("Analysis service error: {0}")]
    Upstream(String),

    #[error("Analysis service timed out")]
    UpstreamTimeout,
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Service(message) => AppError::AnalysisRejected(message),
            AnalysisError::Http(e) if e.is_timeout() => AppError::UpstreamTimeout,
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::AnalysisRejected(msg) => {
                tracing::warn!("Analysis rejected: {msg}");
                (StatusCode::BAD_GATEWAY, "ANALYSIS_REJECTED", msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Analysis service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The job analysis service is unavailable".to_string(),
                )
            }
            AppError::UpstreamTimeout => {
                tracing::error!("Analysis service timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "The job analysis took too long. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("Job title is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_errors_map_to_gateway_statuses() {
        assert_eq!(
            AppError::Upstream("connection refused".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::UpstreamTimeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_service_error_is_passed_through() {
        let err = AppError::from(AnalysisError::Service(
            "No valid job descriptions to analyze.".to_string(),
        ));
        assert!(
            matches!(err, AppError::AnalysisRejected(ref m) if m == "No valid job descriptions to analyze.")
        );
    }

    #[test]
    fn test_api_error_becomes_upstream() {
        let err = AppError::from(AnalysisError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
