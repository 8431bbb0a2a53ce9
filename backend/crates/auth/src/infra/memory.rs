//! In-Memory Implementations
//!
//! Used by tests and `AUTH_STORE=memory` development runs. State is lost
//! on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use platform::crypto::constant_time_eq;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{AssetStorage, SessionStore, StoredAsset, Upload, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// User repository and session store backed by a `HashMap`
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, HashMap<UserId, User>>> {
        self.users
            .lock()
            .map_err(|_| AuthError::Internal("user store lock poisoned".to_string()))
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.lock()?;

        let taken = users
            .values()
            .any(|u| identity_clashes(u, &user.user_name, &user.email));
        if taken || users.contains_key(&user.user_id) {
            return Err(AuthError::UserAlreadyExists);
        }

        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> AuthResult<Option<User>> {
        Ok(self
            .lock()?
            .values()
            .find(|u| u.user_name.as_str() == identifier || u.email.as_str() == identifier)
            .cloned())
    }

    async fn exists_by_username_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<bool> {
        Ok(self
            .lock()?
            .values()
            .any(|u| identity_clashes(u, user_name, email)))
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.lock()?.len() as u64)
    }
}

/// Either handle of `existing` equals either handle of the candidate
fn identity_clashes(existing: &User, user_name: &UserName, email: &Email) -> bool {
    [existing.user_name.as_str(), existing.email.as_str()]
        .iter()
        .any(|taken| *taken == user_name.as_str() || *taken == email.as_str())
}

impl SessionStore for InMemoryUserRepository {
    async fn set_refresh_token(&self, user_id: &UserId, token: &str) -> AuthResult<()> {
        let mut users = self.lock()?;
        let user = users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;

        user.refresh_token = Some(token.to_string());
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: &UserId,
        expected: &str,
        next: &str,
    ) -> AuthResult<bool> {
        // Compare and write under one lock acquisition
        let mut users = self.lock()?;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };

        let matches = user
            .refresh_token
            .as_deref()
            .is_some_and(|stored| constant_time_eq(stored.as_bytes(), expected.as_bytes()));

        if matches {
            user.refresh_token = Some(next.to_string());
            user.updated_at = chrono::Utc::now();
        }

        Ok(matches)
    }

    async fn clear_refresh_token(&self, user_id: &UserId) -> AuthResult<()> {
        if let Some(user) = self.lock()?.get_mut(user_id) {
            user.refresh_token = None;
            user.updated_at = chrono::Utc::now();
        }
        Ok(())
    }
}

/// Asset storage that keeps uploads in memory and hands out `memory://` URLs
#[derive(Clone, Default)]
pub struct InMemoryAssetStorage {
    assets: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryAssetStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `url`, if any
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.assets.lock().ok()?.get(url).cloned()
    }
}

impl AssetStorage for InMemoryAssetStorage {
    async fn upload(&self, upload: Upload) -> AuthResult<StoredAsset> {
        let url = format!("memory://assets/{}/{}", Uuid::new_v4(), upload.file_name);

        self.assets
            .lock()
            .map_err(|_| AuthError::Upload("asset store lock poisoned".to_string()))?
            .insert(url.clone(), upload.bytes);

        Ok(StoredAsset { url })
    }
}
