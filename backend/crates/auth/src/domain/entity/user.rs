//! User Entity
//!
//! The identity the session lifecycle operates on. `refresh_token` is the
//! only session state kept server-side: at most one live value per user.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::value_object::{
    email::Email,
    user_id::UserId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};

#[derive(Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, lower-cased
    pub user_name: UserName,
    /// Unique, lower-cased
    pub email: Email,
    pub full_name: String,
    /// Avatar URL (required)
    pub avatar: String,
    /// Cover image URL, empty when none was uploaded
    pub cover_image: String,
    pub password: UserPassword,
    /// Currently valid refresh token; `None` when logged out
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A new user without an active session
    pub fn new(
        user_name: UserName,
        email: Email,
        full_name: impl Into<String>,
        avatar: impl Into<String>,
        cover_image: impl Into<String>,
        password: UserPassword,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            full_name: full_name.into(),
            avatar: avatar.into(),
            cover_image: cover_image.into(),
            password,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn check_password(&self, candidate: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.password.verify(candidate, pepper)
    }

    /// Strip the password hash and the stored refresh token
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar: self.avatar.clone(),
            cover_image: self.cover_image.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &self.password)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

/// User as returned to clients and attached to authenticated requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
