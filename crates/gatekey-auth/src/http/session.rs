//! Registration, login, refresh, and logout handlers.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;
use crate::session::{NewUser, TokenPair};

use super::{
    AuthState, MessageResponse, UserSummary, current_user, extract_access_token,
    extract_refresh_token,
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Token pair as returned to clients.
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    /// Short-lived access token.
    pub access_token: String,
    /// Single-use refresh token.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer",
        }
    }
}

/// Response from `POST /auth/register`.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The created user.
    pub user: UserSummary,
    /// Short-lived access token.
    pub access_token: String,
    /// Single-use refresh token.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handler for POST /auth/register.
///
/// Creates an account and returns 201 with the user and its first token
/// pair; both tokens are also set as cookies.
pub async fn register_handler(
    State(state): State<AuthState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, AuthError> {
    let (user, pair) = state
        .service
        .register(NewUser {
            email: request.email,
            password: request.password,
            name: request.name,
        })
        .await?;

    let cookies = token_cookie_headers(&state, &pair);
    let body = RegisterResponse {
        user: user.into(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "bearer",
    };
    Ok((StatusCode::CREATED, cookies, Json(body)).into_response())
}

/// Handler for POST /auth/login.
pub async fn login_handler(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let pair = state.service.login(&request.email, &request.password).await?;

    let cookies = token_cookie_headers(&state, &pair);
    Ok((StatusCode::OK, cookies, Json(TokenPairResponse::from(pair))).into_response())
}

/// Handler for POST /auth/refresh.
///
/// The refresh token is read from its cookie, falling back to the
/// Authorization header for cookie-less clients.
pub async fn refresh_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    let token = extract_refresh_token(&headers, &state.service.config().cookies)
        .ok_or(AuthError::TokenInvalid)?;
    let pair = state.service.refresh(&token).await?;

    let cookies = token_cookie_headers(&state, &pair);
    Ok((StatusCode::OK, cookies, Json(TokenPairResponse::from(pair))).into_response())
}

/// Handler for POST /auth/logout.
///
/// Lenient: revokes the access token when one is presented and valid, but
/// returns 200 and clears both token cookies regardless, so a client with
/// a stale token can always sign out.
pub async fn logout_handler(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let cookies = &state.service.config().cookies;

    if let Some(token) = extract_access_token(&headers, cookies) {
        if let Err(e) = state.service.logout(&token).await {
            debug!(error = %e, "token not revocable during logout");
        }
    } else {
        debug!("no access token presented during logout");
    }

    let mut response_headers = HeaderMap::new();
    for name in [&cookies.access_token_name, &cookies.refresh_token_name] {
        if let Ok(value) = HeaderValue::from_str(&cookies.build_clear_cookie(name)) {
            response_headers.append(SET_COOKIE, value);
        }
    }

    (
        StatusCode::OK,
        response_headers,
        Json(MessageResponse::new("Logged out successfully")),
    )
        .into_response()
}

/// Handler for GET /auth/me.
pub async fn me_handler(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<UserSummary>, AuthError> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(user.into()))
}

// =============================================================================
// Helpers
// =============================================================================

/// Builds Set-Cookie headers carrying both tokens of a pair.
///
/// Cookie max-ages track the configured token lifetimes so cookie and
/// token expire together. Empty when cookie transport is disabled.
fn token_cookie_headers(state: &AuthState, pair: &TokenPair) -> HeaderMap {
    let config = state.service.config();
    let cookies = &config.cookies;

    let mut headers = HeaderMap::new();
    let built = [
        cookies.build_cookie(
            &cookies.access_token_name,
            &pair.access_token,
            config.access_token_lifetime.as_secs(),
        ),
        cookies.build_cookie(
            &cookies.refresh_token_name,
            &pair.refresh_token,
            config.refresh_token_lifetime.as_secs(),
        ),
    ];
    for cookie in built.into_iter().flatten() {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(SET_COOKIE, value);
        }
    }
    headers
}
