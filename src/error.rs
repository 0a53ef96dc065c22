use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Caller-visible failures. Every variant maps to exactly one status
/// code; nothing here is retried internally.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    #[error("Inactive user account")]
    InactiveAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidToken | ApiError::UnknownSubject | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InactiveAccount | ApiError::AccountDisabled | ApiError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            ApiError::DuplicateEmail | ApiError::DuplicateUsername | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            // Internal causes are logged, never shown to the caller.
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::UnknownSubject.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn denials_map_to_403() {
        assert_eq!(ApiError::InactiveAccount.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::AccountDisabled.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Forbidden("Not authorized to access this analysis").status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn conflicts_map_to_400_and_absence_to_404() {
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::DuplicateUsername.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Analysis with id x".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unknown_and_wrong_password_share_one_message() {
        // Enumeration safety: both login failure paths surface the
        // exact same error kind and text.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
    }
}
