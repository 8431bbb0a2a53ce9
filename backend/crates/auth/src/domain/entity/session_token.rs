//! Session Token Entity
//!
//! Ephemeral signed credentials. Only the refresh token of the active
//! session is ever persisted (mirrored on the user record).

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Type tag carried in the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[display("access")]
    Access,
    #[display("refresh")]
    Refresh,
}

/// Signed claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: String,
    /// Token type
    pub typ: TokenKind,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Unique token id; two tokens minted in the same second still differ
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Claims {
    /// `now > exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

/// A token string together with the claims it was signed over
#[derive(Clone)]
pub struct SignedToken {
    pub value: String,
    pub claims: Claims,
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedToken")
            .field("value", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Access + refresh token issued together
#[derive(Debug, Clone)]
pub struct SessionPair {
    pub access: SignedToken,
    pub refresh: SignedToken,
}
