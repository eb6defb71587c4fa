//! Password reset secret storage.
//!
//! A reset secret is a standalone opaque credential, not a signed
//! claim-bearing token: it is bound to a user, expires, and is valid for
//! exactly one successful consumption.
//!
//! # Security
//!
//! Secrets are stored as SHA-256 hashes only; the plaintext value exists
//! solely in the reset link handed to the user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::secret;

/// A persisted password reset secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    /// SHA-256 hash of the secret value. The plaintext is never stored.
    pub secret_hash: String,

    /// ID of the user this secret can reset.
    pub user_id: String,

    /// When this secret expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Whether this secret has already been consumed.
    pub used: bool,

    /// When this secret was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PasswordResetToken {
    /// Creates an unused reset record for a plaintext secret.
    #[must_use]
    pub fn new(
        plaintext_secret: &str,
        user_id: impl Into<String>,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            secret_hash: secret::hash_secret(plaintext_secret),
            user_id: user_id.into(),
            expires_at,
            used: false,
            created_at,
        }
    }

    /// Returns `true` if this secret has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Storage trait for password reset secrets.
#[async_trait]
pub trait ResetTokenStorage: Send + Sync {
    /// Persists a new reset record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn create(&self, token: &PasswordResetToken) -> AuthResult<()>;

    /// Atomically consumes the reset record for a secret hash.
    ///
    /// Marks the record used and returns it, but only if it existed and
    /// was not already used. Returns `None` for unknown or already-used
    /// secrets — from that point on, no caller can consume it again, which
    /// is what makes the secret single-use under concurrency. Expiry is
    /// not checked here; the caller decides against its own clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn consume(&self, secret_hash: &str) -> AuthResult<Option<PasswordResetToken>>;

    /// Deletes expired reset records.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_new_hashes_secret() {
        let now = OffsetDateTime::now_utc();
        let token = PasswordResetToken::new("plain-secret", "user-1", now, now + Duration::HOUR);

        assert_ne!(token.secret_hash, "plain-secret");
        assert_eq!(token.secret_hash, secret::hash_secret("plain-secret"));
        assert!(!token.used);
    }

    #[test]
    fn test_is_expired() {
        let now = OffsetDateTime::now_utc();
        let token = PasswordResetToken::new("s", "user-1", now, now + Duration::HOUR);

        assert!(!token.is_expired(now));
        assert!(!token.is_expired(now + Duration::minutes(59)));
        assert!(token.is_expired(now + Duration::HOUR));
        assert!(token.is_expired(now + Duration::hours(2)));
    }
}
