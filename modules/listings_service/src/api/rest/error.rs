//! HTTP error mapping to `{"error": "..."}` bodies

use crate::contract::ListingsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Not found")]
    pub error: String,
}

/// An HTTP error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Map domain errors to HTTP errors
pub fn map_domain_error(error: ListingsError) -> ApiError {
    match error {
        ListingsError::NotFound { resource, id } => {
            tracing::debug!("{} {} not found", resource, id);
            ApiError::not_found()
        }
        ListingsError::MalformedRequest => ApiError::new(StatusCode::BAD_REQUEST, "Not a JSON"),
        ListingsError::MissingField { field } => {
            ApiError::new(StatusCode::BAD_REQUEST, format!("Missing {}", field))
        }
        ListingsError::Validation { message } => ApiError::new(StatusCode::BAD_REQUEST, message),
        ListingsError::Internal => {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

impl From<ListingsError> for ApiError {
    fn from(error: ListingsError) -> Self {
        map_domain_error(error)
    }
}
