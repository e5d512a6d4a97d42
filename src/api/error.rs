//! Mapping of service errors onto HTTP responses

use crate::error::TableMatcherError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Error returned by every API handler; renders as `{"error": message}`
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match TableMatcherError::find(&self.0) {
            Some(TableMatcherError::InvalidRequest { .. })
            | Some(TableMatcherError::InsufficientPlayers { .. }) => StatusCode::BAD_REQUEST,
            Some(TableMatcherError::PlayerNotFound { .. })
            | Some(TableMatcherError::MatchNotFound { .. }) => StatusCode::NOT_FOUND,
            Some(TableMatcherError::PlayerInMatch { .. })
            | Some(TableMatcherError::SessionInactive) => StatusCode::CONFLICT,
            Some(TableMatcherError::StorageError { .. })
            | Some(TableMatcherError::ConfigurationError { .. })
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unwrap a JSON body, reporting a bad one as `InvalidRequest`
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(TableMatcherError::InvalidRequest {
            reason: rejection.body_text(),
        }
        .into()),
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
