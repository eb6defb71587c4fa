//! Signed token minting and verification.
//!
//! This module provides:
//!
//! - The [`TokenType`] tag distinguishing access from refresh tokens
//! - The signed [`TokenClaims`] carried by every token
//! - The [`TokenCodec`] that mints and verifies tokens against a shared
//!   secret and an injected clock

pub mod codec;

pub use codec::{TokenClaims, TokenCodec, TokenType};
