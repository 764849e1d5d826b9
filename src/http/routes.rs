//! HTTP route definitions and handlers.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::error::{ApiError, ApiResult, ErrorContext};
use super::state::AppState;
use crate::domain::{DocumentId, NewBatch, NewDocument, TransitionTarget};

/// JSON extractor that answers malformed bodies with 400 instead of 422
///
/// The body is parsed whatever the `Content-Type` header says. Preserves
/// 413 Payload Too Large for body limit errors.
pub struct JsonBadRequest<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBadRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                StatusCode::PAYLOAD_TOO_LARGE
            } else {
                StatusCode::BAD_REQUEST
            };
            ApiError::new(status, rejection.body_text())
        })?;

        serde_json::from_slice(&bytes)
            .map(JsonBadRequest)
            .map_err(|e| {
                ApiError::bad_request(format!("Failed to parse the request body as JSON: {e}"))
            })
    }
}

/// Default request body size limit (1MB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Creates the HTTP router with the default body size limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
///
/// # Arguments
///
/// * `state` - Application state with the lifecycle service
/// * `body_limit` - Maximum request body size in bytes
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/save", post(save_document))
        .route("/batch/save", post(save_batch))
        .route("/update/:key/verified", put(update_to_verified))
        .route("/update/:key/rejected", put(update_to_rejected))
        .route("/process/:document_id", put(process_batch))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
}

async fn root(State(state): State<AppState>) -> impl IntoResponse {
    format!("This is the main page. Port used: {}", state.port)
}

/// Liveness of the store connection
///
/// Returns `UP`, or 503 with the store error text.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.health().await {
        Ok(()) => (StatusCode::OK, "UP".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Store Unhealthy: {e}"),
            )
        }
    }
}

async fn save_document(
    State(state): State<AppState>,
    JsonBadRequest(body): JsonBadRequest<NewDocument>,
) -> ApiResult<impl IntoResponse> {
    let document = state
        .service
        .save_document(body)
        .await
        .map_err(|e| ApiError::from_domain(e, ErrorContext::Write))?;
    Ok(Json(document))
}

async fn save_batch(
    State(state): State<AppState>,
    JsonBadRequest(body): JsonBadRequest<NewBatch>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .save_batch(body)
        .await
        .map_err(|e| ApiError::from_domain(e, ErrorContext::Write))?;
    Ok(Json(json!({ "id": id })))
}

async fn update_to_verified(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<String> {
    update_to_state(&state, &key, TransitionTarget::Verified).await
}

async fn update_to_rejected(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<String> {
    update_to_state(&state, &key, TransitionTarget::Rejected).await
}

async fn update_to_state(state: &AppState, key: &str, target: TransitionTarget) -> ApiResult<String> {
    let outcome = state
        .service
        .transition(key, target)
        .await
        .map_err(|e| ApiError::from_domain(e, ErrorContext::Write))?;
    Ok(outcome.to_string())
}

async fn process_batch(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let batch_id = DocumentId::new(document_id).map_err(ApiError::bad_request)?;
    let summary = state
        .service
        .process_batch(&batch_id)
        .await
        .map_err(|e| ApiError::from_domain(e, ErrorContext::Process))?;
    Ok(Json(summary))
}
