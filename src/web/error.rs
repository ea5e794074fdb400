use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::analysis::AnalysisError;
use crate::search::KnowledgeBaseError;

/// API-layer error type
#[derive(Debug)]
pub enum ApiError {
    /// 400 - Bad request (invalid input)
    BadRequest(String),

    /// 404 - Unknown route
    NotFound(String),

    /// 500 - Internal error
    Internal(String),

    /// 503 - Knowledge base not built yet
    Unavailable(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
        };

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        }

        let body = ErrorBody {
            error: error_type.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<KnowledgeBaseError> for ApiError {
    fn from(err: KnowledgeBaseError) -> Self {
        match err {
            KnowledgeBaseError::NotReady => ApiError::Unavailable(
                "Knowledge base is empty. Upload papers or load the examples first.".into(),
            ),
            KnowledgeBaseError::Empty | KnowledgeBaseError::DuplicateDocument(_) => {
                ApiError::BadRequest(err.to_string())
            }
            KnowledgeBaseError::Storage(_) | KnowledgeBaseError::Serialization(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Background task failed: {}", err))
    }
}
