//! Session lifecycle manager.
//!
//! Orchestrates registration, login, access-token verification, refresh
//! rotation, logout, password reset, password change, and email
//! verification by composing the token codec, the revocation store, the
//! credential hasher, and the secret generator.
//!
//! Every operation is request-scoped and a single attempt: auth failures
//! are not transient and nothing here retries. Backend failures surface as
//! `Storage` errors, distinct from every credential failure kind, so an
//! outage can never be mistaken for a bad password.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::{AuthConfig, ConfigError};
use crate::error::AuthError;
use crate::password;
use crate::secret;
use crate::storage::{
    EmailVerificationCode, PasswordResetToken, ResetTokenStorage, RevokedTokenStorage, User,
    UserStorage, VerificationCodeStorage,
};
use crate::token::{TokenCodec, TokenType};
use crate::AuthResult;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// Result Types
// ============================================================================

/// An access/refresh token pair minted for one subject.
///
/// The transport layer hands each token to the client with a max-age equal
/// to its configured TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token; single-use under rotation.
    pub refresh_token: String,
}

/// Input for registering a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Email address; becomes the token subject.
    pub email: String,
    /// Plaintext password, hashed before persistence.
    pub password: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Outcome of a forgot-password request.
///
/// Embedding the secret into an outbound email is the caller's concern.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    /// The plaintext reset secret, valid for one consumption.
    pub secret: String,
    /// Ready-made reset link carrying the secret as a query parameter.
    pub reset_link: String,
}

// ============================================================================
// Session Service
// ============================================================================

/// Orchestrates all credential and token lifecycle flows.
pub struct SessionService {
    /// Token codec for minting and verifying signed tokens.
    codec: TokenCodec,

    /// User store collaborator.
    users: Arc<dyn UserStorage>,

    /// Token revocation list.
    revoked_tokens: Arc<dyn RevokedTokenStorage>,

    /// Password reset secret store.
    reset_tokens: Arc<dyn ResetTokenStorage>,

    /// Email verification code store.
    verification_codes: Arc<dyn VerificationCodeStorage>,

    /// Injected clock for expiry computation.
    clock: Arc<dyn Clock>,

    /// Process-wide configuration.
    config: AuthConfig,
}

impl SessionService {
    /// Creates a new session service.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserStorage>,
        revoked_tokens: Arc<dyn RevokedTokenStorage>,
        reset_tokens: Arc<dyn ResetTokenStorage>,
        verification_codes: Arc<dyn VerificationCodeStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let codec = TokenCodec::new(&config, clock.clone())?;
        Ok(Self {
            codec,
            users,
            revoked_tokens,
            reset_tokens,
            verification_codes,
            clock,
            config,
        })
    }

    /// Returns the configuration this service was built with.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Registration and login
    // ------------------------------------------------------------------------

    /// Registers a new user and mints their first token pair.
    ///
    /// The new account starts active and unverified.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the password is shorter than
    ///   [`MIN_PASSWORD_LENGTH`]
    /// - `IdentityAlreadyRegistered` if the email is taken
    pub async fn register(&self, new_user: NewUser) -> AuthResult<(User, TokenPair)> {
        validate_password(&new_user.password)?;

        if self.users.find_by_email(&new_user.email).await?.is_some() {
            return Err(AuthError::IdentityAlreadyRegistered);
        }

        let password_hash = hash_new_password(&new_user.password)?;
        let mut user = User::new(&new_user.email, password_hash);
        if let Some(name) = new_user.name {
            user = user.with_name(name);
        }

        self.users.create(&user).await?;
        let pair = self.mint_pair(&user.email)?;

        info!(user_id = %user.id, "registered new user");
        Ok((user, pair))
    }

    /// Authenticates an email/password pair and mints a token pair.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown identity or wrong password —
    ///   the two cases are externally indistinguishable
    /// - `AccountInactive` when the credentials are correct but the account
    ///   is deactivated (checked after the password so a deactivated account
    ///   cannot be probed without knowing its password)
    pub async fn login(&self, email: &str, password_attempt: &str) -> AuthResult<TokenPair> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_stored_password(password_attempt, &user.password_hash)? {
            debug!(user_id = %user.id, "password mismatch on login");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active() {
            return Err(AuthError::AccountInactive);
        }

        info!(user_id = %user.id, "user logged in");
        self.mint_pair(&user.email)
    }

    // ------------------------------------------------------------------------
    // Token verification
    // ------------------------------------------------------------------------

    /// Verifies an access token and loads its user.
    ///
    /// The check sequence is fixed: signature/expiry, type tag, revocation
    /// list, then user lookup — cheapest and most local first, so the
    /// revocation backend is never consulted for clearly-invalid tokens.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` for malformed/forged/expired tokens, or when the
    ///   subject no longer exists
    /// - `TokenWrongType` when handed a refresh token
    /// - `TokenRevoked` when the token is on the revocation list
    /// - `AccountInactive` when the subject's account is deactivated
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<User> {
        let claims = self.codec.verify(access_token, TokenType::Access)?;

        if self.revoked_tokens.is_revoked(access_token).await? {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if !user.is_active() {
            return Err(AuthError::AccountInactive);
        }

        Ok(user)
    }

    /// Verifies an access token and additionally requires a verified email.
    ///
    /// # Errors
    ///
    /// As [`authenticate`](Self::authenticate), plus `AccountUnverified`.
    pub async fn authenticate_verified(&self, access_token: &str) -> AuthResult<User> {
        let user = self.authenticate(access_token).await?;
        if !user.is_verified() {
            return Err(AuthError::AccountUnverified);
        }
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Refresh rotation and logout
    // ------------------------------------------------------------------------

    /// Rotates a refresh token: revokes the presented token and mints a
    /// fresh access/refresh pair.
    ///
    /// A refresh token mints at most one successor pair. The revocation is
    /// an atomic conditional write, so of two racing requests presenting
    /// the same token, exactly one receives a new pair and the other fails
    /// `TokenRevoked`. The revoke completes before the new pair exists;
    /// if minting then fails, the session is stranded rather than the
    /// revocation bypassed (fail-closed).
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` / `TokenWrongType` from codec verification, or when
    ///   the subject no longer exists
    /// - `TokenRevoked` when the token was already rotated or revoked
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.codec.verify(refresh_token, TokenType::Refresh)?;

        if self.revoked_tokens.is_revoked(refresh_token).await? {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        // Single-use rotation: the conditional write is the gate. A racer
        // that lost the race sees `false` here even though the is_revoked
        // check above passed for both.
        let newly_revoked = self
            .revoked_tokens
            .record_if_new(refresh_token, TokenCodec::expiry_of(&claims))
            .await?;
        if !newly_revoked {
            warn!(user_id = %user.id, "refresh token replay rejected");
            return Err(AuthError::TokenRevoked);
        }

        debug!(user_id = %user.id, "rotated refresh token");
        self.mint_pair(&user.email)
    }

    /// Revokes an access token for the remainder of its natural TTL.
    ///
    /// Idempotent: logging out twice with the same token succeeds.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` / `TokenWrongType` from codec verification
    pub async fn logout(&self, access_token: &str) -> AuthResult<()> {
        let claims = self.codec.verify(access_token, TokenType::Access)?;

        self.revoked_tokens
            .record(access_token, TokenCodec::expiry_of(&claims))
            .await?;

        info!(subject = %claims.sub, "access token revoked on logout");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Password reset and change
    // ------------------------------------------------------------------------

    /// Creates a single-use password reset secret for an identity.
    ///
    /// The secret is persisted hashed with an expiry; the plaintext value
    /// and a ready-made link are returned for the caller to deliver.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown email. The transport layer flattens this
    ///   into an enumeration-safe response; the distinction exists only at
    ///   this boundary.
    pub async fn forgot_password(&self, email: &str) -> AuthResult<PasswordReset> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::not_found("no user with that email"))?;

        let now = self.clock.now();
        let plaintext = secret::generate_reset_secret();
        let record = PasswordResetToken::new(
            &plaintext,
            &user.id,
            now,
            now + self.config.reset_secret_lifetime,
        );
        self.reset_tokens.create(&record).await?;

        info!(user_id = %user.id, "password reset secret issued");
        Ok(PasswordReset {
            reset_link: self.config.reset_link(&plaintext),
            secret: plaintext,
        })
    }

    /// Consumes a reset secret and overwrites the user's password hash.
    ///
    /// The consume is atomic: once any attempt succeeds, every later
    /// attempt with the same secret — correct new password or not — fails
    /// `InvalidOrExpiredSecret`.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for a too-short new password (checked before the
    ///   secret is burned)
    /// - `InvalidOrExpiredSecret` for an unknown, expired, or already-used
    ///   secret — one kind for all three causes
    pub async fn reset_password(&self, reset_secret: &str, new_password: &str) -> AuthResult<()> {
        validate_password(new_password)?;

        let record = self
            .reset_tokens
            .consume(&secret::hash_secret(reset_secret))
            .await?
            .ok_or(AuthError::InvalidOrExpiredSecret)?;

        let now = self.clock.now();
        if record.is_expired(now) {
            return Err(AuthError::InvalidOrExpiredSecret);
        }

        let mut user = self
            .users
            .find_by_id(&record.user_id)
            .await?
            .ok_or(AuthError::InvalidOrExpiredSecret)?;

        user.password_hash = hash_new_password(new_password)?;
        user.updated_at = now;
        self.users.update(&user).await?;

        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }

    /// Changes an authenticated user's password.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for a too-short new password
    /// - `InvalidCurrentPassword` when the current password doesn't match
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        validate_password(new_password)?;

        if !verify_stored_password(current_password, &user.password_hash)? {
            return Err(AuthError::InvalidCurrentPassword);
        }

        let mut updated = user.clone();
        updated.password_hash = hash_new_password(new_password)?;
        updated.updated_at = self.clock.now();
        self.users.update(&updated).await?;

        info!(user_id = %user.id, "password changed");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Email verification
    // ------------------------------------------------------------------------

    /// Generates and persists a 6-digit verification code for a user.
    ///
    /// Replaces any outstanding code. Returns the code for the caller to
    /// deliver.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails.
    pub async fn request_email_verification(&self, user: &User) -> AuthResult<String> {
        let now = self.clock.now();
        let code = EmailVerificationCode {
            user_id: user.id.clone(),
            code: secret::generate_verification_code(),
            expires_at: now + self.config.verification_code_lifetime,
            created_at: now,
        };
        self.verification_codes.store(&code).await?;

        debug!(user_id = %user.id, "verification code issued");
        Ok(code.code)
    }

    /// Verifies a presented code and marks the user's email verified.
    ///
    /// The code is consumed only on a successful match.
    ///
    /// # Errors
    ///
    /// - `InvalidOrExpiredSecret` for an absent, expired, or mismatched
    ///   code — one kind for all three causes
    pub async fn verify_email_with_code(&self, user: &User, code: &str) -> AuthResult<()> {
        let stored = self
            .verification_codes
            .find_by_user(&user.id)
            .await?
            .ok_or(AuthError::InvalidOrExpiredSecret)?;

        if stored.is_expired(self.clock.now()) || stored.code != code {
            return Err(AuthError::InvalidOrExpiredSecret);
        }

        let mut updated = user.clone();
        updated.verified = true;
        updated.updated_at = self.clock.now();
        self.users.update(&updated).await?;
        self.verification_codes.delete(&user.id).await?;

        info!(user_id = %user.id, "email verified");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Mints an access/refresh pair for a subject using configured TTLs.
    fn mint_pair(&self, subject: &str) -> AuthResult<TokenPair> {
        let access_token =
            self.codec
                .mint(subject, TokenType::Access, self.config.access_token_lifetime)?;
        let refresh_token =
            self.codec
                .mint(subject, TokenType::Refresh, self.config.refresh_token_lifetime)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LENGTH`].
fn validate_password(candidate: &str) -> AuthResult<()> {
    if candidate.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::invalid_request(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hashes a new password, mapping hasher failures to internal errors.
fn hash_new_password(candidate: &str) -> AuthResult<String> {
    password::hash_password(candidate)
        .map_err(|e| AuthError::internal(format!("Password hashing failed: {e}")))
}

/// Verifies a password attempt against a stored hash.
///
/// A malformed stored hash is a backend defect, not a credentials failure.
fn verify_stored_password(attempt: &str, stored_hash: &str) -> AuthResult<bool> {
    password::verify_password(attempt, stored_hash)
        .map_err(|e| AuthError::internal(format!("Stored password hash is invalid: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
