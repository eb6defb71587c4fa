//! Error response handling for the session endpoints.
//!
//! Implements `IntoResponse` for `AuthError` with a fixed status mapping
//! and `{"detail": ...}` JSON bodies. Server-side failures are logged here
//! and surfaced with a generic message; client failures surface their
//! canonical text unchanged.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "request failed with server error");
        }

        let status = status_code(&self);
        let body = json!({ "detail": self.canonical_message() });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an error kind to its HTTP status.
fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidCredentials
        | AuthError::TokenInvalid
        | AuthError::TokenWrongType { .. }
        | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,

        AuthError::AccountInactive | AuthError::AccountUnverified => StatusCode::FORBIDDEN,

        AuthError::IdentityAlreadyRegistered => StatusCode::CONFLICT,

        AuthError::InvalidOrExpiredSecret
        | AuthError::InvalidCurrentPassword
        | AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,

        AuthError::NotFound { .. } => StatusCode::NOT_FOUND,

        AuthError::Storage { .. }
        | AuthError::Configuration { .. }
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_invalid_credentials_response() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Invalid email or password");
    }

    #[tokio::test]
    async fn test_inactive_is_forbidden() {
        let response = AuthError::AccountInactive.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_duplicate_identity_is_conflict() {
        let response = AuthError::IdentityAlreadyRegistered.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_revoked_token_response() {
        let response = AuthError::TokenRevoked.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let response = AuthError::storage("connection pool exhausted").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let detail = json["detail"].as_str().unwrap();
        assert!(!detail.contains("connection pool"));
    }
}
