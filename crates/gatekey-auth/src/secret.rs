//! Single-use secret generation.
//!
//! Produces the opaque random secrets used outside the signed-token codec:
//! password reset secrets and numeric email verification codes. Secrets are
//! compared and persisted only as SHA-256 hashes.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;

/// Number of random bytes in a reset secret (256 bits).
const RESET_SECRET_BYTES: usize = 32;

/// Generates a cryptographically secure password reset secret.
///
/// Returns a 256-bit random value encoded as base64url (43 characters),
/// safe to embed in a reset link query parameter without escaping.
#[must_use]
pub fn generate_reset_secret() -> String {
    let mut bytes = [0u8; RESET_SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generates a 6-digit email verification code.
///
/// The code is uniform over `100000..=999999`, so it never carries a
/// leading zero.
#[must_use]
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Hashes a secret value with SHA-256 for storage and lookup.
///
/// Reset secrets are persisted hashed, never in plaintext; the same
/// function is applied on lookup so the store only ever sees digests.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
