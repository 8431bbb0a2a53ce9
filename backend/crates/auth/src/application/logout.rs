//! Logout Use Case
//!
//! Ends the user's session by clearing the stored refresh token.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::store_call;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionStore,
{
    session_store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(session_store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_store,
            config,
        }
    }

    /// The caller is already authenticated; the clear is unconditional
    pub async fn execute(&self, user_id: &UserId) -> AuthResult<()> {
        store_call(
            self.config.store_timeout,
            self.session_store.clear_refresh_token(user_id),
        )
        .await?;

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}
