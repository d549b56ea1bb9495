//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No session, or wrong credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Rejected input
    #[error("{0}")]
    BadRequest(String),

    /// Too many failed login attempts
    #[error("Too many login attempts, try again later")]
    TooManyAttempts,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    pub fn unauthorized() -> Self {
        AuthError::Unauthorized("Authentication credentials were not provided".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_body() {
        let response = AuthError::Forbidden("Managers only".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Managers only");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::TooManyAttempts.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::BadRequest(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
