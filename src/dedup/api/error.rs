use crate::dedup::service::ServiceError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// JSON error body `{ "message": ... }` with a status code.
///
/// Dependency failures are logged in full here and replaced by the route's
/// generic message before leaving the process.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn from_service(err: ServiceError, public_message: &str) -> Self {
        match err {
            ServiceError::Validation(message) => Self {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            ServiceError::Dependency { stage, cause } => {
                tracing::error!(
                    name: "request.dependency_failed",
                    stage = %stage,
                    error = ?cause,
                    "{public_message}"
                );
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: public_message.to_string(),
                }
            }
        }
    }
}

/// Malformed or mistyped request bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(
            name: "request.body_rejected",
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "Rejected request body"
        );
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid request body.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}
