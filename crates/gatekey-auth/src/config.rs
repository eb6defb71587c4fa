//! Authentication configuration.
//!
//! Process-wide settings for token signing, token lifetimes, single-use
//! secret lifetimes, and cookie transport. Loaded once at startup and never
//! mutated afterwards: rotating the signing secret requires a restart and
//! invalidates every outstanding token (no key versioning in this design).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Minimum length in bytes for the HMAC signing secret.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Root authentication configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// signing_secret = "a-very-long-random-secret-at-least-32-bytes"
/// signing_algorithm = "HS256"
/// access_token_lifetime = "15m"
/// refresh_token_lifetime = "7d"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret for HMAC token signing.
    /// Must be at least [`MIN_SECRET_LENGTH`] bytes.
    pub signing_secret: String,

    /// Signing algorithm identifier: "HS256", "HS384", or "HS512".
    pub signing_algorithm: String,

    /// Access token lifetime. Short-lived by design.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime. Longer-lived; single-use under rotation.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Password reset secret lifetime.
    #[serde(with = "humantime_serde")]
    pub reset_secret_lifetime: Duration,

    /// Email verification code lifetime.
    #[serde(with = "humantime_serde")]
    pub verification_code_lifetime: Duration,

    /// Public base URL, used to formulate password reset links.
    pub base_url: String,

    /// Cookie transport configuration.
    pub cookies: CookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            signing_algorithm: "HS256".to_string(),
            access_token_lifetime: Duration::from_secs(15 * 60),
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600),
            reset_secret_lifetime: Duration::from_secs(3600),
            verification_code_lifetime: Duration::from_secs(15 * 60),
            base_url: "http://localhost:8080".to_string(),
            cookies: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the signing secret is too short, the algorithm
    /// identifier is unknown, or a lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                length: self.signing_secret.len(),
            });
        }

        if !matches!(self.signing_algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(ConfigError::UnknownAlgorithm {
                algorithm: self.signing_algorithm.clone(),
            });
        }

        if self.access_token_lifetime.is_zero()
            || self.refresh_token_lifetime.is_zero()
            || self.reset_secret_lifetime.is_zero()
            || self.verification_code_lifetime.is_zero()
        {
            return Err(ConfigError::ZeroLifetime);
        }

        Ok(())
    }

    /// Formulates the password reset link for a reset secret.
    ///
    /// The secret travels as a query parameter; the new password is
    /// submitted separately in the request body.
    #[must_use]
    pub fn reset_link(&self, secret: &str) -> String {
        let mut url = format!("{}/reset-password", self.base_url.trim_end_matches('/'));
        url.push_str("?token=");
        url.push_str(secret);
        url
    }
}

/// Cookie transport configuration for access and refresh tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Whether token cookies are set at all.
    pub enabled: bool,

    /// Cookie name for the access token.
    pub access_token_name: String,

    /// Cookie name for the refresh token.
    pub refresh_token_name: String,

    /// Whether cookies require HTTPS.
    pub secure: bool,

    /// Whether cookies are inaccessible to client-side scripts.
    pub http_only: bool,

    /// Cookie path attribute.
    pub path: String,

    /// Cookie domain, if restricted.
    pub domain: Option<String>,

    /// SameSite attribute: "strict", "lax", or "none".
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            access_token_name: "access_token".to_string(),
            refresh_token_name: "refresh_token".to_string(),
            secure: true,
            http_only: true,
            path: "/".to_string(),
            domain: None,
            same_site: "lax".to_string(),
        }
    }
}

impl CookieConfig {
    /// Builds a Set-Cookie header value for a token.
    ///
    /// `max_age_secs` should be the token's TTL so the cookie and the token
    /// expire together. Returns `None` when cookies are disabled.
    #[must_use]
    pub fn build_cookie(&self, name: &str, value: &str, max_age_secs: u64) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            name,
            value,
            self.path,
            max_age_secs,
            capitalize(&self.same_site)
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(ref domain) = self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        Some(cookie)
    }

    /// Builds a Set-Cookie header value that clears a token cookie.
    #[must_use]
    pub fn build_clear_cookie(&self, name: &str) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}=; Path={}; Max-Age=0; HttpOnly; SameSite={}{}",
            name,
            self.path,
            capitalize(&self.same_site),
            secure
        )
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Errors that can occur while validating auth configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The signing secret is shorter than [`MIN_SECRET_LENGTH`] bytes.
    #[error("Signing secret too short: {length} bytes (minimum {MIN_SECRET_LENGTH})")]
    SecretTooShort {
        /// Actual secret length in bytes.
        length: usize,
    },

    /// The signing algorithm identifier is not supported.
    #[error("Unknown signing algorithm: {algorithm}")]
    UnknownAlgorithm {
        /// The unrecognized algorithm identifier.
        algorithm: String,
    },

    /// A token or secret lifetime is configured as zero.
    #[error("Token lifetimes must be non-zero")]
    ZeroLifetime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AuthConfig {
        AuthConfig {
            signing_secret: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(7 * 24 * 3600)
        );
        assert_eq!(config.signing_algorithm, "HS256");
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let config = AuthConfig {
            signing_secret: "short".to_string(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SecretTooShort { length: 5 })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_algorithm() {
        let config = AuthConfig {
            signing_algorithm: "RS256".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownAlgorithm { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_lifetime() {
        let config = AuthConfig {
            access_token_lifetime: Duration::ZERO,
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLifetime)));
    }

    #[test]
    fn test_reset_link() {
        let config = AuthConfig {
            base_url: "https://app.example.com/".to_string(),
            ..valid_config()
        };
        assert_eq!(
            config.reset_link("abc123"),
            "https://app.example.com/reset-password?token=abc123"
        );
    }

    #[test]
    fn test_deserialize_humantime_lifetimes() {
        let json = serde_json::json!({
            "signing_secret": "0123456789abcdef0123456789abcdef",
            "access_token_lifetime": "30m",
            "refresh_token_lifetime": "14d",
        });
        let config: AuthConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(1800));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(14 * 24 * 3600)
        );
        // Unlisted fields fall back to defaults.
        assert_eq!(config.cookies.access_token_name, "access_token");
    }

    #[test]
    fn test_build_cookie() {
        let cookies = CookieConfig {
            same_site: "strict".to_string(),
            ..CookieConfig::default()
        };

        let cookie = cookies.build_cookie("access_token", "tok-value", 900).unwrap();
        assert!(cookie.contains("access_token=tok-value"));
        assert!(cookie.contains("Max-Age=900"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_build_cookie_disabled() {
        let cookies = CookieConfig {
            enabled: false,
            ..CookieConfig::default()
        };
        assert!(cookies.build_cookie("access_token", "tok", 900).is_none());
    }

    #[test]
    fn test_build_clear_cookie() {
        let cookies = CookieConfig::default();
        let cookie = cookies.build_clear_cookie("refresh_token");
        assert!(cookie.starts_with("refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
