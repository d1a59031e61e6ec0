use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stemtutor_orchestration::{ErrorKind, TutorError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Tutor(#[from] TutorError),
    /// Every provider failed and no canned content applied.
    #[error("{message}")]
    Provider { kind: ErrorKind, message: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
}

/// HTTP status for the final failure of a chain.
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::AuthFailed => StatusCode::UNAUTHORIZED,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::NetworkUnreachable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::InvalidResponse => StatusCode::BAD_GATEWAY,
        ErrorKind::ServerError | ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::Tutor(TutorError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, None),
            ApiError::Tutor(TutorError::NotConfigured(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, None)
            }
            ApiError::Provider { kind, .. } => (status_for_kind(*kind), Some(*kind)),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            error_kind: kind,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
