//! Mapping of domain errors to HTTP responses.
//!
//! Error bodies are plain text `Error: <message>`, except for bulk partial
//! failures which carry the per-item report as JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DocflowError;

/// Route family an error was raised on
///
/// Store failures are reported as 400 on save and update routes and as 500
/// on the process route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Write,
    Process,
}

#[derive(Debug)]
enum ErrorBody {
    Text(String),
    Json(serde_json::Value),
}

/// Error response returned by handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Text error with the given status
    pub fn new(status: StatusCode, message: impl std::fmt::Display) -> Self {
        Self {
            status,
            body: ErrorBody::Text(format!("Error: {message}")),
        }
    }

    pub fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Maps a domain error raised on a route of the given family
    pub fn from_domain(err: DocflowError, context: ErrorContext) -> Self {
        let status = match (&err, context) {
            (DocflowError::Validation(_), _) | (DocflowError::Conflict { .. }, _) => {
                StatusCode::BAD_REQUEST
            }
            (DocflowError::NotFound(_), _) => StatusCode::NOT_FOUND,
            (DocflowError::Store(_), ErrorContext::Write) => StatusCode::BAD_REQUEST,
            (DocflowError::Store(_), ErrorContext::Process)
            | (DocflowError::PartialFailure(_), _)
            | (DocflowError::Configuration(_), _)
            | (DocflowError::Serialization(_), _)
            | (DocflowError::Io(_), _) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(
                error = %err,
                status = status.as_u16(),
                transient = err.is_transient(),
                "Request failed"
            );
        } else {
            tracing::debug!(
                error = %err,
                status = status.as_u16(),
                transient = err.is_transient(),
                "Request rejected"
            );
        }

        match err {
            DocflowError::PartialFailure(failure) => Self {
                status,
                body: ErrorBody::Json(json!({
                    "error": format!("Bulk write error: {failure}"),
                    "summary": failure.summary,
                    "failures": failure.failures,
                })),
            },
            other => Self::new(status, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.body {
            ErrorBody::Text(text) => (self.status, text).into_response(),
            ErrorBody::Json(value) => (self.status, Json(value)).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BulkItemFailure, BulkWriteFailure, BulkWriteSummary, StoreError,
    };
    use test_case::test_case;

    fn timeout() -> DocflowError {
        StoreError::Timeout {
            operation: "update_one".to_string(),
            budget_ms: 10,
        }
        .into()
    }

    #[test_case(DocflowError::Validation("x".into()), ErrorContext::Write, StatusCode::BAD_REQUEST ; "validation")]
    #[test_case(DocflowError::Conflict { key: "k".into(), message: "dup".into() }, ErrorContext::Write, StatusCode::BAD_REQUEST ; "conflict")]
    #[test_case(DocflowError::NotFound("b".into()), ErrorContext::Process, StatusCode::NOT_FOUND ; "not found")]
    #[test_case(timeout(), ErrorContext::Write, StatusCode::BAD_REQUEST ; "store error on write")]
    #[test_case(timeout(), ErrorContext::Process, StatusCode::INTERNAL_SERVER_ERROR ; "store error on process")]
    #[test_case(DocflowError::Serialization("bad".into()), ErrorContext::Write, StatusCode::INTERNAL_SERVER_ERROR ; "serialization")]
    fn test_status_mapping(err: DocflowError, context: ErrorContext, expected: StatusCode) {
        assert_eq!(ApiError::from_domain(err, context).status(), expected);
    }

    #[tokio::test]
    async fn test_text_body() {
        let response = ApiError::bad_request("boom").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Error: boom");
    }

    #[tokio::test]
    async fn test_partial_failure_body() {
        let failure = BulkWriteFailure {
            summary: BulkWriteSummary {
                submitted_count: 2,
                matched_count: 1,
                modified_count: 1,
            },
            failures: vec![BulkItemFailure {
                index: 1,
                key: "k2".to_string(),
                message: "write conflict".to_string(),
            }],
        };
        let response = ApiError::from_domain(
            DocflowError::PartialFailure(failure),
            ErrorContext::Process,
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["summary"]["matchedCount"], 1);
        assert_eq!(json["failures"][0]["key"], "k2");
        assert_eq!(json["failures"][0]["index"], 1);
    }
}
