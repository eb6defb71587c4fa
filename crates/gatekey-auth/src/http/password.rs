//! Password reset and change handlers.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AuthError;

use super::{AuthState, MessageResponse, current_user};

// =============================================================================
// Request Types
// =============================================================================

/// Body for `POST /auth/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    /// Email address to send the reset link to.
    pub email: String,
}

/// Query parameters for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordQuery {
    /// The reset secret from the emailed link.
    pub token: String,
}

/// Body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    /// The replacement password.
    pub new_password: String,
}

/// Body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// The current password, re-confirmed.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handler for POST /auth/forgot-password.
///
/// Enumeration-safe: responds 200 with the same message whether or not the
/// email is registered. An unknown email is absorbed here; only a backend
/// failure surfaces as an error.
pub async fn forgot_password_handler(
    State(state): State<AuthState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    match state.service.forgot_password(&request.email).await {
        Ok(reset) => {
            if let Some(ref callback) = state.on_reset_issued {
                callback(&request.email, &reset);
            } else {
                warn!("reset secret issued but no delivery callback is configured");
            }
        }
        Err(AuthError::NotFound { .. }) => {
            debug!("password reset requested for unknown email");
        }
        Err(e) => return Err(e),
    }

    Ok(Json(MessageResponse::new(
        "If the email is registered, a reset link has been sent",
    )))
}

/// Handler for POST /auth/reset-password.
///
/// The secret arrives as the `token` query parameter (as embedded in the
/// reset link); the new password travels in the JSON body.
pub async fn reset_password_handler(
    State(state): State<AuthState>,
    Query(query): Query<ResetPasswordQuery>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<impl IntoResponse, AuthError> {
    state
        .service
        .reset_password(&query.token, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// Handler for POST /auth/change-password. Requires authentication.
pub async fn change_password_handler(
    State(state): State<AuthState>,
    headers: axum::http::HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = current_user(&state, &headers).await?;
    state
        .service
        .change_password(&user, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password has been changed")))
}
