//! Refresh Session Use Case
//!
//! Exchanges the current refresh token for a new pair. The stored token is
//! replaced with a compare-and-set keyed on the presented one, so of two
//! concurrent refreshes with the same token exactly one wins.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::application::config::AuthConfig;
use crate::application::deadline::store_call;
use crate::application::token_issuer::TokenIssuer;
use crate::application::token_verifier::TokenVerifier;
use crate::domain::entity::session_token::{SessionPair, TokenKind};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Refresh session use case
pub struct RefreshSessionUseCase<R>
where
    R: UserRepository + SessionStore,
{
    repo: Arc<R>,
    verifier: TokenVerifier<R>,
    issuer: TokenIssuer,
    config: Arc<AuthConfig>,
}

impl<R> RefreshSessionUseCase<R>
where
    R: UserRepository + SessionStore,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            verifier: TokenVerifier::new(repo.clone(), config.clone()),
            issuer: TokenIssuer::new(config.clone()),
            repo,
            config,
        }
    }

    pub async fn execute(&self, raw_refresh_token: Option<&str>) -> AuthResult<SessionPair> {
        let user = self.verifier.verify(raw_refresh_token, TokenKind::Refresh).await?;
        // verify() already rejected a missing token
        let presented = raw_refresh_token.map(str::trim).unwrap_or_default();

        let matches_stored = user
            .refresh_token
            .as_deref()
            .is_some_and(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes()));

        if !matches_stored {
            return Err(AuthError::RefreshTokenMismatch);
        }

        let tokens = self.issuer.issue_session_pair(&user)?;

        let rotated = store_call(
            self.config.store_timeout,
            self.repo
                .rotate_refresh_token(&user.user_id, presented, &tokens.refresh.value),
        )
        .await?;

        if !rotated {
            return Err(AuthError::RefreshTokenMismatch);
        }

        tracing::info!(user_id = %user.user_id, "Session refreshed");
        Ok(tokens)
    }
}
