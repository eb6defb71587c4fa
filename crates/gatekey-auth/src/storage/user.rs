//! User storage trait.
//!
//! Defines the interface for user persistence operations. The lifecycle
//! core reads users and conditionally mutates `password_hash` and
//! `verified` via [`UserStorage::update`]; it does not own user storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;

// =============================================================================
// User Type
// =============================================================================

/// A user account in the authentication system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    #[serde(default)]
    pub id: String,

    /// Email address; the identity tokens are bound to.
    pub email: String,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Argon2-hashed password (PHC string).
    ///
    /// Stored for password authentication. Filter this field out manually
    /// when exposing a user via an API response.
    pub password_hash: String,

    /// Whether the account is active. Inactive users cannot authenticate.
    pub active: bool,

    /// Whether the email address has been verified.
    pub verified: bool,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new active, unverified user with a fresh UUID.
    #[must_use]
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            name: None,
            password_hash: password_hash.into(),
            active: true,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `true` if the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` if the email address has been verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage operations for users.
///
/// Lookups return `None` for missing users; mutations fail with `NotFound`.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: &str) -> AuthResult<Option<User>>;

    /// Find a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `IdentityAlreadyRegistered` if a user with the same email
    /// already exists, or a storage error if the operation fails.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Update an existing user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user doesn't exist, or a storage error if
    /// the operation fails.
    async fn update(&self, user: &User) -> AuthResult<()>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("alice@example.com", "$argon2id$...");
        assert_eq!(user.email, "alice@example.com");
        assert!(user.is_active());
        assert!(!user.is_verified());
        assert!(user.name.is_none());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_user_with_name() {
        let user = User::new("alice@example.com", "$argon2id$...").with_name("Alice");
        assert_eq!(user.name, Some("Alice".to_string()));
    }

    #[test]
    fn test_user_serialization_round_trip() {
        let user = User::new("alice@example.com", "$argon2id$...").with_name("Alice");
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, user.id);
        assert_eq!(back.email, user.email);
        assert_eq!(back.password_hash, user.password_hash);
        assert_eq!(back.active, user.active);
        assert_eq!(back.verified, user.verified);
    }
}
