//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, token codec, repository traits
//! - `application/` - Token issuer/verifier and the session use cases
//! - `infra/` - PostgreSQL, in-memory and HTTP upload implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Session Model
//! - Short-lived access token + long-lived refresh token, both HS256-signed
//!   with separate secrets and delivered as `HttpOnly` cookies
//! - One active session per user: the refresh token is mirrored on the user
//!   record and replaced on every login/refresh
//! - Refresh rotates the stored token with a compare-and-set; a rotated-away
//!   or concurrently used token is rejected
//! - Passwords hashed with Argon2id

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{HttpAssetStorage, InMemoryAssetStorage, InMemoryUserRepository, PgUserRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
