//! Auth Middleware
//!
//! Middleware for requiring a valid access token on protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use platform::cookie::extract_cookie_or_bearer;

use crate::application::TokenVerifier;
use crate::domain::entity::session_token::TokenKind;
use crate::domain::entity::user::UserProfile;
use crate::domain::repository::{AssetStorage, SessionStore, UserRepository};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// The verified caller, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserProfile);

/// Reject the request unless it carries a valid access token
/// (`accessToken` cookie, else `Authorization: Bearer`).
pub async fn require_access_token<R, A>(
    State(state): State<AuthAppState<R, A>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    let token = extract_cookie_or_bearer(req.headers(), &state.config.access_cookie_name);

    let verifier = TokenVerifier::new(state.repo.clone(), state.config.clone());
    let user = verifier.verify(token.as_deref(), TokenKind::Access).await?;

    req.extensions_mut().insert(AuthenticatedUser(user.profile()));

    Ok(next.run(req).await)
}
