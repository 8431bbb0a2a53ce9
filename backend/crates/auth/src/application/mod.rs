//! Application Layer
//!
//! Token issuing/verification and the session use cases.

pub mod config;
mod deadline;
pub mod login;
pub mod logout;
pub mod refresh_session;
pub mod register;
pub mod token_issuer;
pub mod token_verifier;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use refresh_session::RefreshSessionUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use token_issuer::TokenIssuer;
pub use token_verifier::TokenVerifier;
