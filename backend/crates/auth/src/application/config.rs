//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::crypto::random_bytes;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::entity::session_token::TokenKind;

/// Length of generated signing secrets, in bytes
const SECRET_LENGTH: usize = 32;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Access token cookie name
    pub access_cookie_name: String,
    /// Refresh token cookie name
    pub refresh_cookie_name: String,
    /// HMAC key for access tokens
    pub access_token_secret: Vec<u8>,
    /// HMAC key for refresh tokens; must differ from the access key
    pub refresh_token_secret: Vec<u8>,
    /// Access token lifetime (15 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (10 days)
    pub refresh_token_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Upper bound for a single repository call
    pub store_timeout: Duration,
    /// Upper bound for a single asset upload
    pub upload_timeout: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: "accessToken".to_string(),
            refresh_cookie_name: "refreshToken".to_string(),
            access_token_secret: vec![0u8; SECRET_LENGTH],
            refresh_token_secret: vec![1u8; SECRET_LENGTH],
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(10 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            store_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(30),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets (for development)
    pub fn with_random_secrets() -> Self {
        Self {
            access_token_secret: random_bytes(SECRET_LENGTH),
            refresh_token_secret: random_bytes(SECRET_LENGTH),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    pub fn secret_for(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.access_token_secret,
            TokenKind::Refresh => &self.refresh_token_secret,
        }
    }

    pub fn ttl_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }

    /// Cookie carrying the access token; `Max-Age` follows the token TTL
    pub fn access_cookie(&self) -> CookieConfig {
        self.cookie(&self.access_cookie_name, self.access_token_ttl)
    }

    /// Cookie carrying the refresh token
    pub fn refresh_cookie(&self) -> CookieConfig {
        self.cookie(&self.refresh_cookie_name, self.refresh_token_ttl)
    }

    fn cookie(&self, name: &str, ttl: Duration) -> CookieConfig {
        CookieConfig {
            name: name.to_string(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: i64::try_from(ttl.as_secs()).ok(),
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_cookie_name", &self.access_cookie_name)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("store_timeout", &self.store_timeout)
            .field("upload_timeout", &self.upload_timeout)
            .finish_non_exhaustive()
    }
}
