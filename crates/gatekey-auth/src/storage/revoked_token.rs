//! Revocation list (blacklist) storage trait.
//!
//! Records tokens that must no longer be honored, keyed on the exact
//! presented token string, and answers membership queries. A token on this
//! list is rejected for the remainder of its natural TTL even though its
//! signature stays mathematically valid.
//!
//! # Consistency requirement
//!
//! Once `record` (or `record_if_new`) returns successfully, every
//! subsequent `is_revoked` call for that exact token string — from any
//! concurrent caller — must return `true`. This is the single
//! correctness-critical guarantee of the revocation model.
//!
//! # Implementation notes
//!
//! - Implementations should store token strings hashed (e.g. SHA-256),
//!   never as plaintext bearer credentials.
//! - `is_revoked` runs on every access and refresh verification, after the
//!   cheap signature/expiry checks; lookups must be fast.
//! - Records for tokens past their natural expiry carry no further value
//!   and may be compacted away.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::AuthResult;

/// Storage trait for the token revocation list.
#[async_trait]
pub trait RevokedTokenStorage: Send + Sync {
    /// Marks a token string as revoked.
    ///
    /// `expires_at` is the token's own expiration instant; it exists only
    /// to let implementations compact records that can no longer matter.
    ///
    /// # Idempotency
    ///
    /// Recording an already-revoked token succeeds as a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn record(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()>;

    /// Atomically marks a token as revoked if it is not already.
    ///
    /// Returns `true` if this call recorded the revocation (first revoker),
    /// or `false` if the token was already on the list. Refresh rotation
    /// uses this to guarantee that of two racing requests presenting the
    /// same refresh token, exactly one mints a successor pair.
    ///
    /// # Atomicity
    ///
    /// The check and the write must be a single atomic step. A common
    /// approach is a conditional insert:
    ///
    /// ```sql
    /// INSERT INTO revoked_tokens (token_hash, expires_at)
    /// VALUES ($1, $2)
    /// ON CONFLICT (token_hash) DO NOTHING
    /// RETURNING token_hash
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn record_if_new(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<bool>;

    /// Checks whether a token string has been revoked. Exact-match lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn is_revoked(&self, token: &str) -> AuthResult<bool>;

    /// Deletes revocation records whose token has passed natural expiry.
    ///
    /// Optional compaction; correctness does not depend on it since an
    /// expired token already fails the expiry check upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
