//! Domain Layer
//!
//! Contains entities, value objects, the token codec, and repository traits.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{
    session_token::{Claims, SessionPair, SignedToken, TokenKind},
    user::{User, UserProfile},
};
pub use repository::{AssetStorage, SessionStore, StoredAsset, Upload, UserRepository};
