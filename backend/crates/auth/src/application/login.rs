//! Login Use Case
//!
//! Authenticates a user and starts a new session. Any previous session is
//! replaced: only one refresh token per user is ever valid.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::store_call;
use crate::application::token_issuer::TokenIssuer;
use crate::domain::entity::session_token::SessionPair;
use crate::domain::entity::user::UserProfile;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{AuthError, AuthResult};

const TOKEN_GENERATION_FAILED: &str =
    "Something went wrong while generating access token and refresh token";

/// Login input
pub struct LoginInput {
    /// User name or email
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub user: UserProfile,
    pub tokens: SessionPair,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserRepository + SessionStore,
{
    repo: Arc<R>,
    issuer: TokenIssuer,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository + SessionStore,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            issuer: TokenIssuer::new(config.clone()),
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let identifier = input
            .identifier
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingCredentials("Username or email is required"))?;

        let password = input
            .password
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingCredentials("Password is required"))?;

        let timeout = self.config.store_timeout;

        let user = store_call(timeout, self.repo.find_by_username_or_email(&identifier))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let raw_password = RawPassword::new(password).map_err(|_| AuthError::InvalidCredentials)?;

        if !user.check_password(&raw_password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issuer.issue_session_pair(&user).map_err(|e| {
            tracing::error!(error = %e, user_id = %user.user_id, "Token signing failed");
            AuthError::Internal(TOKEN_GENERATION_FAILED.to_string())
        })?;

        // Tokens are only handed out once the refresh token is persisted
        store_call(timeout, self.repo.set_refresh_token(&user.user_id, &tokens.refresh.value))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    user_id = %user.user_id,
                    "Persisting refresh token failed"
                );
                AuthError::Internal(TOKEN_GENERATION_FAILED.to_string())
            })?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput {
            user: user.profile(),
            tokens,
        })
    }
}
