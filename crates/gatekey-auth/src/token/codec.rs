//! Token codec: HMAC-signed, self-contained credential tokens.
//!
//! Tokens embed a subject identity, a type tag, and an absolute expiry,
//! signed with a process-wide shared secret. The signature covers all
//! claims; mutating any of them invalidates the token.
//!
//! # Uniform failure mode
//!
//! [`TokenCodec::verify`] collapses every decode failure — malformed
//! structure, bad signature, expired token — into the single
//! [`AuthError::TokenInvalid`] kind. Callers (and therefore attackers)
//! cannot distinguish a forged token from a stale one. This is a deliberate
//! security property, not an omission. Only a structurally valid token of
//! the wrong type fails differently, with [`AuthError::TokenWrongType`].
//!
//! # Expiry and the clock
//!
//! Expiry is validated against the injected [`Clock`], not the JWT
//! library's internal system time, so expiry behavior is fully
//! deterministic under test.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{AuthConfig, ConfigError};
use crate::error::AuthError;

// ============================================================================
// Token Type
// ============================================================================

/// The intent a token was minted for.
///
/// A token's type is immutable, set at mint time, and re-checked on every
/// verification: a refresh token must never pass an access checkpoint and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived credential authorizing individual protected requests.
    Access,
    /// Long-lived credential used solely to mint new token pairs.
    Refresh,
}

impl TokenType {
    /// Returns the type tag as embedded in token claims.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claims embedded and signed inside every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject: the identity this token authenticates (an email address).
    pub sub: String,

    /// Token type tag.
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Expiration time (Unix timestamp). Absolute; the token is void past
    /// this instant regardless of revocation state.
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Unique token ID. Guarantees two tokens minted for the same subject
    /// within the same second still differ on the wire.
    pub jti: String,
}

// ============================================================================
// Token Codec
// ============================================================================

/// Mints and verifies signed tokens against a shared secret.
///
/// Thread-safe (`Send + Sync`); share behind an `Arc` across async tasks.
/// The secret and algorithm are fixed for the process lifetime — rotating
/// the secret invalidates every outstanding token.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a codec from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (secret too short,
    /// unknown algorithm, zero lifetimes).
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;

        let algorithm = match config.signing_algorithm.as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(ConfigError::UnknownAlgorithm {
                    algorithm: other.to_string(),
                });
            }
        };

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.signing_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            algorithm,
            clock,
        })
    }

    /// Mints a signed token for `subject` with an absolute expiry of
    /// `now + ttl`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails.
    pub fn mint(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = self.clock.now().unix_timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            token_type,
            exp: now + ttl.as_secs() as i64,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("Failed to encode token: {e}")))
    }

    /// Verifies a token's signature, expiry, and type.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenInvalid`] on malformed structure, signature
    ///   mismatch, or expiry — uniformly, with no further detail.
    /// - [`AuthError::TokenWrongType`] when the token is valid but its type
    ///   tag does not match `expected`.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::TokenInvalid)?;
        let claims = data.claims;

        if claims.exp <= self.clock.now().unix_timestamp() {
            return Err(AuthError::TokenInvalid);
        }

        if claims.token_type != expected {
            return Err(AuthError::token_wrong_type(expected.as_str()));
        }

        Ok(claims)
    }

    /// Returns the instant at which a token's claims expire.
    #[must_use]
    pub fn expiry_of(claims: &TokenClaims) -> time::OffsetDateTime {
        time::OffsetDateTime::from_unix_timestamp(claims.exp)
            .unwrap_or(time::OffsetDateTime::UNIX_EPOCH)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use time::OffsetDateTime;

    fn test_config() -> AuthConfig {
        AuthConfig {
            signing_secret: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        }
    }

    fn codec_with_clock() -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        ));
        let codec = TokenCodec::new(&test_config(), clock.clone()).unwrap();
        (codec, clock)
    }

    #[test]
    fn test_mint_verify_round_trip() {
        let (codec, _clock) = codec_with_clock();

        let token = codec
            .mint("alice@example.com", TokenType::Access, Duration::from_secs(900))
            .unwrap();
        let claims = codec.verify(&token, TokenType::Access).unwrap();

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp, claims.iat + 900);
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let (codec, clock) = codec_with_clock();

        let token = codec
            .mint("alice@example.com", TokenType::Access, Duration::from_secs(900))
            .unwrap();
        assert!(codec.verify(&token, TokenType::Access).is_ok());

        clock.advance(time::Duration::seconds(901));
        let err = codec.verify(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let (codec, _clock) = codec_with_clock();

        let token = codec
            .mint("alice@example.com", TokenType::Access, Duration::from_secs(900))
            .unwrap();

        // Flip one character in the payload segment.
        let mut chars: Vec<char> = token.chars().collect();
        let payload_start = token.find('.').unwrap() + 1;
        chars[payload_start] = if chars[payload_start] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        let err = codec.verify(&tampered, TokenType::Access).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let (codec, _clock) = codec_with_clock();
        let other_config = AuthConfig {
            signing_secret: "fedcba9876543210fedcba9876543210".to_string(),
            ..AuthConfig::default()
        };
        let other = TokenCodec::new(
            &other_config,
            Arc::new(ManualClock::new(
                OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            )),
        )
        .unwrap();

        let token = codec
            .mint("alice@example.com", TokenType::Access, Duration::from_secs(900))
            .unwrap();
        let err = other.verify(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn test_type_cross_rejection() {
        let (codec, _clock) = codec_with_clock();

        let refresh = codec
            .mint("alice@example.com", TokenType::Refresh, Duration::from_secs(3600))
            .unwrap();
        let err = codec.verify(&refresh, TokenType::Access).unwrap_err();
        assert!(matches!(err, AuthError::TokenWrongType { .. }));

        let access = codec
            .mint("alice@example.com", TokenType::Access, Duration::from_secs(900))
            .unwrap();
        let err = codec.verify(&access, TokenType::Refresh).unwrap_err();
        assert!(matches!(err, AuthError::TokenWrongType { .. }));
    }

    #[test]
    fn test_malformed_and_expired_fail_identically() {
        let (codec, clock) = codec_with_clock();

        let token = codec
            .mint("alice@example.com", TokenType::Access, Duration::from_secs(900))
            .unwrap();
        clock.advance(time::Duration::hours(1));

        let expired = codec.verify(&token, TokenType::Access).unwrap_err();
        let malformed = codec.verify("not-a-token", TokenType::Access).unwrap_err();

        // Same variant, same message: no oracle between the two causes.
        assert_eq!(expired.to_string(), malformed.to_string());
        assert!(matches!(expired, AuthError::TokenInvalid));
        assert!(matches!(malformed, AuthError::TokenInvalid));
    }

    #[test]
    fn test_same_second_mints_are_distinct() {
        let (codec, _clock) = codec_with_clock();

        let a = codec
            .mint("alice@example.com", TokenType::Refresh, Duration::from_secs(3600))
            .unwrap();
        let b = codec
            .mint("alice@example.com", TokenType::Refresh, Duration::from_secs(3600))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_type_serde_tag() {
        let json = serde_json::to_string(&TokenType::Access).unwrap();
        assert_eq!(json, "\"access\"");
        let json = serde_json::to_string(&TokenType::Refresh).unwrap();
        assert_eq!(json, "\"refresh\"");
    }

    #[test]
    fn test_codec_rejects_bad_config() {
        let config = AuthConfig {
            signing_secret: "short".to_string(),
            ..AuthConfig::default()
        };
        let result = TokenCodec::new(&config, Arc::new(SystemClockForTest));
        assert!(result.is_err());
    }

    struct SystemClockForTest;
    impl Clock for SystemClockForTest {
        fn now(&self) -> OffsetDateTime {
            OffsetDateTime::now_utc()
        }
    }
}
