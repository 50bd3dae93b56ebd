//! Maps [`CoreError`] onto HTTP status classes: request-scoped errors get a short `{"error": "..."}` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use colorsync_core::error::CoreError;
use colorsync_core::protocol::ErrorBody;

pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::AuthMissing | CoreError::AuthInvalid => StatusCode::UNAUTHORIZED,
            CoreError::AuthMismatch => StatusCode::FORBIDDEN,
            CoreError::UnknownPlayer => StatusCode::NOT_FOUND,
            CoreError::AlreadyQueued => StatusCode::CONFLICT,
            CoreError::RoomNotFound(_) | CoreError::GameNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::GameNotJoinable => StatusCode::CONFLICT,
            CoreError::Transient(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}
