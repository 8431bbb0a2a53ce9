//! Repository Traits
//!
//! Interfaces for persistence and asset upload. Implementations are in the
//! infrastructure layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. A duplicate username or email is `UserAlreadyExists`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find the user whose username or email equals `identifier`
    async fn find_by_username_or_email(&self, identifier: &str) -> AuthResult<Option<User>>;

    /// Check whether the username or the email is taken
    async fn exists_by_username_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<bool>;

    /// Number of registered users
    async fn count(&self) -> AuthResult<u64>;
}

/// Access to the single stored refresh token of a user
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Overwrite the stored refresh token. `UserNotFound` if the user is gone.
    async fn set_refresh_token(&self, user_id: &UserId, token: &str) -> AuthResult<()>;

    /// Replace `expected` with `next` atomically.
    ///
    /// Returns `false` and leaves the store untouched when the stored token is
    /// not exactly `expected`.
    async fn rotate_refresh_token(
        &self,
        user_id: &UserId,
        expected: &str,
        next: &str,
    ) -> AuthResult<bool>;

    /// Clear the stored refresh token unconditionally
    async fn clear_refresh_token(&self, user_id: &UserId) -> AuthResult<()>;
}

/// A file received from the client, ready to upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub url: String,
}

/// External binary-object storage (avatars, cover images)
#[trait_variant::make(AssetStorage: Send)]
pub trait LocalAssetStorage {
    async fn upload(&self, upload: Upload) -> AuthResult<StoredAsset>;
}
