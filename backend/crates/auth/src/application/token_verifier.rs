//! Token Verifier
//!
//! Checks signature, type tag and expiry of an inbound token, then resolves
//! its subject. Never mutates stored state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::deadline::store_call;
use crate::domain::entity::session_token::{Claims, TokenKind};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::services::decode_token;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

pub struct TokenVerifier<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> TokenVerifier<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Check `raw` as a token of `kind` at `now`, without touching the store
    pub fn verify_claims_at(
        &self,
        raw: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AuthResult<Claims> {
        let claims = decode_token(raw, self.config.secret_for(kind))?;

        if claims.typ != kind {
            return Err(AuthError::InvalidSignature);
        }

        if claims.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Verify and resolve the token's user
    pub async fn verify(&self, raw: Option<&str>, kind: TokenKind) -> AuthResult<User> {
        self.verify_at(raw, kind, Utc::now()).await
    }

    pub async fn verify_at(
        &self,
        raw: Option<&str>,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AuthResult<User> {
        let raw = raw
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.verify_claims_at(raw, kind, now)?;

        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidSubject)?;

        store_call(self.config.store_timeout, self.user_repo.find_by_id(&user_id))
            .await?
            .ok_or(AuthError::InvalidSubject)
    }
}
