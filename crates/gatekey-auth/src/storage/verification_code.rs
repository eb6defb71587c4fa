//! Email verification code storage.
//!
//! A verification code is a 6-digit numeric secret bound to a user with an
//! expiry. It is consumed on successful match and invalid thereafter; a
//! fresh request replaces any outstanding code for the same user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

/// A persisted email verification code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationCode {
    /// ID of the user this code verifies.
    pub user_id: String,

    /// The 6-digit numeric code.
    pub code: String,

    /// When this code expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When this code was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl EmailVerificationCode {
    /// Returns `true` if this code has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Storage trait for email verification codes, keyed by user ID.
#[async_trait]
pub trait VerificationCodeStorage: Send + Sync {
    /// Stores a code for a user, replacing any outstanding one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn store(&self, code: &EmailVerificationCode) -> AuthResult<()>;

    /// Returns the outstanding code for a user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_user(&self, user_id: &str) -> AuthResult<Option<EmailVerificationCode>>;

    /// Deletes the outstanding code for a user.
    ///
    /// Called on successful verification; deleting an absent code is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, user_id: &str) -> AuthResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_is_expired() {
        let now = OffsetDateTime::now_utc();
        let code = EmailVerificationCode {
            user_id: "user-1".to_string(),
            code: "123456".to_string(),
            expires_at: now + Duration::minutes(15),
            created_at: now,
        };

        assert!(!code.is_expired(now));
        assert!(code.is_expired(now + Duration::minutes(15)));
    }
}
