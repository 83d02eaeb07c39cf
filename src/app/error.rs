use crate::utils::error::WaitlistError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub message: String,
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Request failed ({:?}): {}", self.category(), self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorBody {
            ok: false,
            message: self.user_friendly_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Unreadable JSON bodies get the same `{ ok, message }` envelope as every
/// other failure.
pub fn json_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, WaitlistError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| WaitlistError::validation(rejection.body_text()))
}
