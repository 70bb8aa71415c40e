//! Mapping from core errors to HTTP responses.

use api_shared::ErrorEnvelope;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sencare_core::RecordError;

/// Message returned for store failures; the cause is only logged.
pub const INTERNAL_ERROR_MSG: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    Record(RecordError),
    /// The request body was not valid JSON for the endpoint.
    InvalidBody(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::Record(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidBody(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Record(RecordError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Record(err) if err.is_not_found() => (StatusCode::NOT_FOUND, err.to_string()),
            ApiError::Record(err) => {
                tracing::error!("store error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MSG.into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_client_error() {
            tracing::debug!("request rejected ({}): {}", status, message);
        }
        (status, Json(ErrorEnvelope::new(message))).into_response()
    }
}

/// Unwraps a JSON body, turning a rejection into a 400 error envelope.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}
