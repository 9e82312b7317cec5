//! Service error → HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use slotwise_service::ServiceError;

use crate::payload::ErrorBody;

pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, field, message) = match &self.0 {
            ServiceError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Some(field.clone()),
                message.clone(),
            ),
            ServiceError::InvalidRecurrence(message) => (
                StatusCode::BAD_REQUEST,
                Some("recurrence_rule".to_string()),
                message.clone(),
            ),
            ServiceError::ResourceNotFound(id) => (
                StatusCode::NOT_FOUND,
                None,
                format!("resource {id} not found"),
            ),
            ServiceError::Storage(err) => {
                error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    None,
                    "storage unavailable".to_string(),
                )
            }
            ServiceError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                None,
                "request cancelled".to_string(),
            ),
        };

        (
            status,
            Json(ErrorBody {
                status: "error",
                message,
                field,
            }),
        )
            .into_response()
    }
}

/// A malformed request body or query string, reported as a 400 with the
/// extractor's own description.
pub fn bad_request(detail: impl ToString) -> ApiError {
    ApiError(ServiceError::Validation {
        field: "request".to_string(),
        message: detail.to_string(),
    })
}
