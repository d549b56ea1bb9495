//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// No session where one is required
    #[error("Authentication credentials were not provided")]
    Unauthorized,

    /// Authenticated but lacking the capability
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invisible record
    #[error("{0}")]
    NotFound(String),

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map a repository failure, turning constraint violations into 400s.
    ///
    /// Anything else is logged and reported as a 500.
    pub fn from_repository(err: anyhow::Error, action: &str) -> Self {
        let code = err
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .and_then(|e| e.code().map(|c| c.into_owned()));

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => {
                ApiError::BadRequest("A record with these values already exists".to_string())
            }
            Some(FOREIGN_KEY_VIOLATION) => ApiError::BadRequest(
                "A referenced record does not exist or is still in use".to_string(),
            ),
            Some(CHECK_VIOLATION) => {
                ApiError::BadRequest("A value is outside the allowed range".to_string())
            }
            _ => {
                error!("Failed to {}: {}", action, err);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ApiError::Database(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let response = ApiError::NotFound("Machine not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await["error"], "Machine not found");
    }

    #[tokio::test]
    async fn test_database_error_is_not_leaked() {
        let err = ApiError::Database(common::error::DatabaseError::Configuration(
            "secret dsn".to_string(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["error"], "Database error");
    }

    #[test]
    fn test_non_database_failure_maps_to_500() {
        let err = ApiError::from_repository(anyhow::anyhow!("boom"), "list machines");
        assert!(matches!(err, ApiError::InternalServerError));
    }

    #[test]
    fn test_row_not_found_maps_to_500() {
        let err = ApiError::from_repository(sqlx::Error::RowNotFound.into(), "load machine");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
