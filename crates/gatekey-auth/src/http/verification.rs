//! Email verification handlers.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::AuthError;

use super::{AuthState, MessageResponse, current_user};

/// Body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    /// The 6-digit code from the verification email.
    pub code: String,
}

/// Handler for POST /auth/request-verification. Requires authentication.
///
/// Issues a fresh 6-digit code, replacing any outstanding one.
pub async fn request_verification_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let user = current_user(&state, &headers).await?;

    if user.is_verified() {
        return Ok(Json(MessageResponse::new("Email is already verified")));
    }

    let code = state.service.request_email_verification(&user).await?;
    if let Some(ref callback) = state.on_verification_issued {
        callback(&user.email, &code);
    } else {
        warn!("verification code issued but no delivery callback is configured");
    }

    Ok(Json(MessageResponse::new("Verification code sent")))
}

/// Handler for POST /auth/verify-email. Requires authentication.
pub async fn verify_email_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = current_user(&state, &headers).await?;
    state
        .service
        .verify_email_with_code(&user, &request.code)
        .await?;
    Ok(Json(MessageResponse::new("Email verified")))
}
