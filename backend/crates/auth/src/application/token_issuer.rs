//! Token Issuer
//!
//! Mints signed access and refresh tokens for a user. Signing is
//! synchronous; persisting the refresh token is the caller's job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::session_token::{Claims, SessionPair, SignedToken, TokenKind};
use crate::domain::entity::user::User;
use crate::domain::services::encode_token;
use crate::error::AuthResult;

#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<AuthConfig>,
}

impl TokenIssuer {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub fn issue_access_token(&self, user: &User) -> AuthResult<SignedToken> {
        self.issue_at(TokenKind::Access, user, Utc::now())
    }

    pub fn issue_refresh_token(&self, user: &User) -> AuthResult<SignedToken> {
        self.issue_at(TokenKind::Refresh, user, Utc::now())
    }

    /// Issue both tokens against the same clock reading
    pub fn issue_session_pair(&self, user: &User) -> AuthResult<SessionPair> {
        let now = Utc::now();
        Ok(SessionPair {
            access: self.issue_at(TokenKind::Access, user, now)?,
            refresh: self.issue_at(TokenKind::Refresh, user, now)?,
        })
    }

    /// Sign a token of `kind` for `user` as if issued at `now`
    pub fn issue_at(
        &self,
        kind: TokenKind,
        user: &User,
        now: DateTime<Utc>,
    ) -> AuthResult<SignedToken> {
        let iat = now.timestamp();
        let ttl = i64::try_from(self.config.ttl_for(kind).as_secs()).unwrap_or(i64::MAX);

        // Only access tokens carry profile fields
        let (username, email) = match kind {
            TokenKind::Access => (
                Some(user.user_name.to_string()),
                Some(user.email.to_string()),
            ),
            TokenKind::Refresh => (None, None),
        };

        let claims = Claims {
            sub: user.user_id.to_string(),
            typ: kind,
            iat,
            exp: iat.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
            username,
            email,
        };

        let value = encode_token(&claims, self.config.secret_for(kind))?;

        tracing::debug!(user_id = %user.user_id, kind = %kind, exp = claims.exp, "Token issued");

        Ok(SignedToken { value, claims })
    }
}
