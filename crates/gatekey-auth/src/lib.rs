//! # gatekey-auth
//!
//! Credential token lifecycle and revocation core for the Gatekey server.
//!
//! This crate provides:
//! - Signed access/refresh token minting and verification
//! - Refresh token rotation with revoke-before-mint semantics
//! - A token revocation list honored on every verification
//! - Single-use password reset secrets and 6-digit email verification codes
//! - Argon2 password hashing
//! - Axum HTTP handlers for the session endpoints
//!
//! ## Overview
//!
//! The system is built around the [`session::SessionService`], which
//! composes a token codec, a revocation list, and the credential stores
//! behind storage traits. Backends implement the traits in [`storage`];
//! the `gatekey-auth-memory` crate ships in-memory implementations.
//!
//! ## Modules
//!
//! - [`config`] - Token signing, lifetime, and cookie configuration
//! - [`clock`] - Injectable wall-clock used for all expiry decisions
//! - [`token`] - Token minting and verification
//! - [`password`] - Argon2 password hashing
//! - [`secret`] - Reset secret and verification code generation
//! - [`session`] - The session lifecycle service
//! - [`storage`] - Storage traits for users, revocations, and secrets
//! - [`http`] - Axum HTTP handlers for the session endpoints

pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod password;
pub mod secret;
pub mod session;
pub mod storage;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigError, CookieConfig, MIN_SECRET_LENGTH};
pub use error::{AuthError, ErrorCategory};
pub use http::{
    AuthState, LoginRequest, MessageResponse, RegisterRequest, RegisterResponse,
    TokenPairResponse, UserSummary, router,
};
pub use session::{NewUser, PasswordReset, SessionService, TokenPair};
pub use storage::{
    EmailVerificationCode, PasswordResetToken, ResetTokenStorage, RevokedTokenStorage, User,
    UserStorage, VerificationCodeStorage,
};
pub use token::{TokenClaims, TokenCodec, TokenType};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use gatekey_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{AuthConfig, ConfigError, CookieConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{AuthState, router};
    pub use crate::session::{NewUser, PasswordReset, SessionService, TokenPair};
    pub use crate::storage::{
        EmailVerificationCode, PasswordResetToken, ResetTokenStorage, RevokedTokenStorage, User,
        UserStorage, VerificationCodeStorage,
    };
    pub use crate::token::{TokenClaims, TokenCodec, TokenType};
}
