//! Auth Router

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AssetStorage, SessionStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_access_token;

/// Upper bound for a registration form (avatar + cover image)
const MAX_REGISTER_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Create the Auth router for any repository / asset storage implementation
pub fn auth_router<R, A>(repo: R, storage: A, config: AuthConfig) -> Router
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        storage: Arc::new(storage),
        config: Arc::new(config),
    };

    let protected = Router::new()
        .route("/logout", post(handlers::logout::<R, A>))
        .route("/current-user", get(handlers::current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token::<R, A>,
        ));

    Router::new()
        .route(
            "/register",
            post(handlers::register::<R, A>).layer(DefaultBodyLimit::max(MAX_REGISTER_BODY_BYTES)),
        )
        .route("/login", post(handlers::login::<R, A>))
        .route("/refresh-token", post(handlers::refresh_token::<R, A>))
        .merge(protected)
        .with_state(state)
}
