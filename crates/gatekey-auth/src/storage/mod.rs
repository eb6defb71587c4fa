//! Storage traits for authentication data.
//!
//! This module defines storage interfaces for:
//!
//! - User accounts
//! - The token revocation list (blacklist)
//! - Password reset secrets
//! - Email verification codes
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `gatekey-auth-memory` - in-memory storage backend

pub mod reset_token;
pub mod revoked_token;
pub mod user;
pub mod verification_code;

pub use reset_token::{PasswordResetToken, ResetTokenStorage};
pub use revoked_token::RevokedTokenStorage;
pub use user::{User, UserStorage};
pub use verification_code::{EmailVerificationCode, VerificationCodeStorage};
