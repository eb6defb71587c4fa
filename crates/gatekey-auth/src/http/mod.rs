//! HTTP handlers for the session lifecycle endpoints.
//!
//! This module provides Axum handlers and a ready-made [`router`] covering:
//!
//! - `POST /auth/register` - Create an account and receive a token pair
//! - `POST /auth/login` - Exchange credentials for a token pair
//! - `POST /auth/refresh` - Rotate a refresh token
//! - `POST /auth/logout` - Revoke the current access token
//! - `GET /auth/me` - The authenticated user
//! - `POST /auth/forgot-password` - Request a password reset link
//! - `POST /auth/reset-password` - Consume a reset secret
//! - `POST /auth/change-password` - Change the password while logged in
//! - `POST /auth/request-verification` - Request an email verification code
//! - `POST /auth/verify-email` - Submit a verification code
//!
//! Tokens travel either as `Authorization: Bearer` headers or as HttpOnly
//! cookies; every endpoint that mints a pair also sets both cookies with
//! max-ages matching the token TTLs.

pub mod error;
pub mod password;
pub mod session;
pub mod verification;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::routing::{get, post};
use serde::Serialize;
use time::OffsetDateTime;

use crate::config::CookieConfig;
use crate::error::AuthError;
use crate::session::{PasswordReset, SessionService};
use crate::storage::User;

pub use session::{LoginRequest, RegisterRequest, RegisterResponse, TokenPairResponse};

// =============================================================================
// State Types
// =============================================================================

/// Callback invoked when a password reset secret is issued.
///
/// Receives the target email and the reset payload. Delivering the email is
/// the host application's concern; hooking it in here keeps this crate free
/// of a mailer dependency.
pub type ResetIssuedCallback = Arc<dyn Fn(&str, &PasswordReset) + Send + Sync>;

/// Callback invoked when an email verification code is issued.
///
/// Receives the target email and the plaintext code.
pub type VerificationIssuedCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Shared state for all session endpoints.
#[derive(Clone)]
pub struct AuthState {
    /// The session lifecycle service.
    pub service: Arc<SessionService>,
    /// Optional hook for delivering reset links.
    pub on_reset_issued: Option<ResetIssuedCallback>,
    /// Optional hook for delivering verification codes.
    pub on_verification_issued: Option<VerificationIssuedCallback>,
}

impl AuthState {
    /// Creates state around a session service.
    #[must_use]
    pub fn new(service: Arc<SessionService>) -> Self {
        Self {
            service,
            on_reset_issued: None,
            on_verification_issued: None,
        }
    }

    /// Sets the callback invoked when a reset secret is issued.
    #[must_use]
    pub fn with_reset_issued_callback(mut self, callback: ResetIssuedCallback) -> Self {
        self.on_reset_issued = Some(callback);
        self
    }

    /// Sets the callback invoked when a verification code is issued.
    #[must_use]
    pub fn with_verification_issued_callback(
        mut self,
        callback: VerificationIssuedCallback,
    ) -> Self {
        self.on_verification_issued = Some(callback);
        self
    }
}

/// Builds a router exposing all session endpoints under `/auth`.
pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/register", post(session::register_handler))
        .route("/auth/login", post(session::login_handler))
        .route("/auth/refresh", post(session::refresh_handler))
        .route("/auth/logout", post(session::logout_handler))
        .route("/auth/me", get(session::me_handler))
        .route("/auth/forgot-password", post(password::forgot_password_handler))
        .route("/auth/reset-password", post(password::reset_password_handler))
        .route("/auth/change-password", post(password::change_password_handler))
        .route(
            "/auth/request-verification",
            post(verification::request_verification_handler),
        )
        .route("/auth/verify-email", post(verification::verify_email_handler))
        .with_state(state)
}

// =============================================================================
// Response Types
// =============================================================================

/// Generic message-only response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A user as exposed over the API. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// Unique identifier.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the account is active.
    pub active: bool,
    /// Whether the email address has been verified.
    pub verified: bool,
    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            active: user.active,
            verified: user.verified,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Token Extraction
// =============================================================================

/// Extracts a Bearer token from the Authorization header.
fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// Extracts a named token cookie, if cookie transport is enabled.
fn extract_token_from_cookie(
    headers: &HeaderMap,
    cookies: &CookieConfig,
    cookie_name: &str,
) -> Option<String> {
    if !cookies.enabled {
        return None;
    }

    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=')
            && name.trim() == cookie_name
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Extracts the access token from header or cookie.
fn extract_access_token(headers: &HeaderMap, cookies: &CookieConfig) -> Option<String> {
    extract_token_from_header(headers)
        .or_else(|| extract_token_from_cookie(headers, cookies, &cookies.access_token_name))
}

/// Extracts the refresh token from cookie or header.
fn extract_refresh_token(headers: &HeaderMap, cookies: &CookieConfig) -> Option<String> {
    extract_token_from_cookie(headers, cookies, &cookies.refresh_token_name)
        .or_else(|| extract_token_from_header(headers))
}

/// Resolves the authenticated user for a request.
async fn current_user(state: &AuthState, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = extract_access_token(headers, &state.service.config().cookies)
        .ok_or(AuthError::TokenInvalid)?;
    state.service.authenticate(&token).await
}
