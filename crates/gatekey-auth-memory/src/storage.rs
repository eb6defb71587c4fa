//! In-memory implementations of the authentication storage traits.
//!
//! All backends share the same shape: a `tokio::sync::RwLock` around a
//! `HashMap`, with conditional mutations done under the write lock so the
//! single-use guarantees hold across concurrent tasks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use gatekey_auth::clock::{Clock, SystemClock};
use gatekey_auth::error::AuthError;
use gatekey_auth::secret;
use gatekey_auth::storage::{
    EmailVerificationCode, PasswordResetToken, ResetTokenStorage, RevokedTokenStorage, User,
    UserStorage, VerificationCodeStorage,
};
use gatekey_auth::AuthResult;

// =============================================================================
// Users
// =============================================================================

/// In-memory user storage keyed by user ID.
#[derive(Default)]
pub struct MemoryUserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStorage {
    /// Creates an empty user store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::IdentityAlreadyRegistered);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AuthError::not_found(format!("user {}", user.id)));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

// =============================================================================
// Revocation list
// =============================================================================

/// In-memory token revocation list.
///
/// Tokens are keyed by their SHA-256 hash, never by the bearer value
/// itself, so a memory dump does not yield usable credentials.
pub struct MemoryRevokedTokenStorage {
    revoked: RwLock<HashMap<String, OffsetDateTime>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryRevokedTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRevokedTokenStorage {
    /// Creates an empty revocation list using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty revocation list with an injected clock.
    ///
    /// The clock only affects [`RevokedTokenStorage::cleanup_expired`];
    /// membership checks are clock-free.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            revoked: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl RevokedTokenStorage for MemoryRevokedTokenStorage {
    async fn record(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        self.revoked
            .write()
            .await
            .entry(secret::hash_secret(token))
            .or_insert(expires_at);
        Ok(())
    }

    async fn record_if_new(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<bool> {
        let mut revoked = self.revoked.write().await;
        let key = secret::hash_secret(token);
        if revoked.contains_key(&key) {
            return Ok(false);
        }
        revoked.insert(key, expires_at);
        Ok(true)
    }

    async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        Ok(self
            .revoked
            .read()
            .await
            .contains_key(&secret::hash_secret(token)))
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        Ok((before - revoked.len()) as u64)
    }
}

// =============================================================================
// Password reset secrets
// =============================================================================

/// In-memory password reset secret storage, keyed by secret hash.
pub struct MemoryResetTokenStorage {
    tokens: RwLock<HashMap<String, PasswordResetToken>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryResetTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResetTokenStorage {
    /// Creates an empty reset secret store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty reset secret store with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl ResetTokenStorage for MemoryResetTokenStorage {
    async fn create(&self, token: &PasswordResetToken) -> AuthResult<()> {
        self.tokens
            .write()
            .await
            .insert(token.secret_hash.clone(), token.clone());
        Ok(())
    }

    async fn consume(&self, secret_hash: &str) -> AuthResult<Option<PasswordResetToken>> {
        // Mark-used and read under one write lock; that is the whole
        // single-use guarantee.
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(secret_hash) {
            Some(record) if !record.used => {
                record.used = true;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = self.clock.now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, record| !record.is_expired(now));
        Ok((before - tokens.len()) as u64)
    }
}

// =============================================================================
// Email verification codes
// =============================================================================

/// In-memory verification code storage, keyed by user ID.
#[derive(Default)]
pub struct MemoryVerificationCodeStorage {
    codes: RwLock<HashMap<String, EmailVerificationCode>>,
}

impl MemoryVerificationCodeStorage {
    /// Creates an empty code store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationCodeStorage for MemoryVerificationCodeStorage {
    async fn store(&self, code: &EmailVerificationCode) -> AuthResult<()> {
        self.codes
            .write()
            .await
            .insert(code.user_id.clone(), code.clone());
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> AuthResult<Option<EmailVerificationCode>> {
        Ok(self.codes.read().await.get(user_id).cloned())
    }

    async fn delete(&self, user_id: &str) -> AuthResult<()> {
        self.codes.write().await.remove(user_id);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
