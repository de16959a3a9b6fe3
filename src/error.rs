//! Unified API error type for almacen-server
//!
//! One enum covers both layers: business-rule errors carry their message
//! straight to the client, infrastructure errors (sqlx, JWT signing) are
//! logged server-side and collapse to a generic 500. `From` impls keep `?`
//! propagation free of manual `.map_err` boilerplate.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing/invalid input, insufficient stock, invalid status value (400)
    #[error("{0}")]
    Validation(String),
    /// Missing credentials or wrong password (401)
    #[error("{0}")]
    Unauthorized(String),
    /// Invalid or expired token (403)
    #[error("{0}")]
    Forbidden(String),
    /// Missing entity (404)
    #[error("{0}")]
    NotFound(String),
    /// Operation not valid in the entity's current state (409)
    #[error("{0}")]
    Conflict(String),
    /// Anything else; detail stays in the server log (500)
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        ApiError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        tracing::error!(error = %e, "JWT error");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_hides_detail() {
        // The client-facing message never carries infrastructure detail
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
