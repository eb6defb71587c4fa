//! Authentication error types.
//!
//! This module defines all error kinds that can occur during credential
//! and token lifecycle operations. Every variant that reaches a caller is
//! an expected, user-facing outcome; backend failures are kept strictly
//! separate so an outage is never reported as a credentials problem.

use std::fmt;

/// Errors that can occur during authentication and token lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity does not exist or the password does not match.
    ///
    /// Both cases produce this exact variant so the two failure modes are
    /// externally indistinguishable (identity enumeration prevention).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists and the credentials are correct, but the account
    /// has been deactivated.
    #[error("User account is inactive")]
    AccountInactive,

    /// The account's email address has not been verified.
    #[error("Email not verified")]
    AccountUnverified,

    /// The token is malformed, carries a bad signature, or has expired.
    ///
    /// All three causes collapse into this single variant so callers cannot
    /// distinguish a forged token from a stale one.
    #[error("Could not validate credentials")]
    TokenInvalid,

    /// The token decoded correctly but is of the wrong type for this
    /// checkpoint (e.g. a refresh token presented as an access token).
    #[error("Invalid token type, expected {expected} token")]
    TokenWrongType {
        /// The token type this checkpoint requires.
        expected: String,
    },

    /// The token has been explicitly revoked.
    #[error("Token has been revoked")]
    TokenRevoked,

    /// A reset secret or verification code is unknown, expired, or already
    /// consumed. One variant for all three causes, deliberately.
    #[error("Invalid or expired token")]
    InvalidOrExpiredSecret,

    /// The current password supplied to a password change does not match.
    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    /// The email address is already registered.
    #[error("Email already registered")]
    IdentityAlreadyRegistered,

    /// The request payload failed validation (e.g. password too short).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `TokenWrongType` error.
    #[must_use]
    pub fn token_wrong_type(expected: impl Into<String>) -> Self {
        Self::TokenWrongType {
            expected: expected.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an expected client-facing outcome (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a backend failure (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this is a token-related error.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::TokenInvalid | Self::TokenWrongType { .. } | Self::TokenRevoked
        )
    }

    /// Returns the stable message safe to surface to a caller.
    ///
    /// Client errors expose their own display text, which is fixed per kind.
    /// Backend failures always map to one generic sentence; the originating
    /// error text is for logs only and must never reach a user-facing field.
    #[must_use]
    pub fn canonical_message(&self) -> String {
        if self.is_server_error() {
            "An error occurred while processing your request.".to_string()
        } else {
            self.to_string()
        }
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCredentials
            | Self::AccountInactive
            | Self::AccountUnverified
            | Self::InvalidCurrentPassword
            | Self::IdentityAlreadyRegistered => ErrorCategory::Authentication,
            Self::TokenInvalid | Self::TokenWrongType { .. } | Self::TokenRevoked => {
                ErrorCategory::Token
            }
            Self::InvalidOrExpiredSecret => ErrorCategory::Secret,
            Self::InvalidRequest { .. } | Self::NotFound { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential verification errors.
    Authentication,
    /// Signed token errors (validation, type, revocation).
    Token,
    /// Single-use secret errors (reset secrets, verification codes).
    Secret,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::Secret => write!(f, "secret"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
