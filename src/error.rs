use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can surface, mapped onto the HTTP status the
/// client sees. Storage and other unexpected failures collapse into
/// `Internal` and never leak detail past the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("coordinates are outside the allowed area")]
    OutOfBounds,

    #[error("invalid timestamp: {0}")]
    InvalidFormat(String),

    #[error("expiry must be in the future")]
    InvalidExpiry,

    #[error("missing bearer token")]
    AuthMissing,

    #[error("token expired")]
    AuthExpired,

    #[error("invalid or malformed token")]
    AuthInvalid,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UnknownUser,

    #[error("you may not modify this pin")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::OutOfBounds
            | ApiError::InvalidFormat(_)
            | ApiError::InvalidExpiry => StatusCode::BAD_REQUEST,
            ApiError::AuthMissing
            | ApiError::AuthExpired
            | ApiError::AuthInvalid
            | ApiError::InvalidCredentials
            | ApiError::UnknownUser => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_error_kinds() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::OutOfBounds.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AuthExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("pin").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Conflict("taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_detail_is_not_leaked() {
        let resp = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
