//! In-memory storage backend for Gatekey authentication.
//!
//! This crate provides in-memory implementations of the storage traits from
//! `gatekey-auth`, backed by `tokio::sync::RwLock`-guarded hash maps. State
//! is process-local and lost on restart, which makes these backends suited
//! to tests and single-node development setups, not production.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gatekey_auth::{AuthConfig, SessionService, SystemClock};
//! use gatekey_auth_memory::{
//!     MemoryResetTokenStorage, MemoryRevokedTokenStorage, MemoryUserStorage,
//!     MemoryVerificationCodeStorage,
//! };
//!
//! let service = SessionService::new(
//!     config,
//!     Arc::new(MemoryUserStorage::new()),
//!     Arc::new(MemoryRevokedTokenStorage::new()),
//!     Arc::new(MemoryResetTokenStorage::new()),
//!     Arc::new(MemoryVerificationCodeStorage::new()),
//!     Arc::new(SystemClock),
//! )?;
//! ```

pub mod storage;

pub use storage::{
    MemoryResetTokenStorage, MemoryRevokedTokenStorage, MemoryUserStorage,
    MemoryVerificationCodeStorage,
};
