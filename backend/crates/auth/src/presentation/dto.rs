//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::session_token::SessionPair;
use crate::domain::entity::user::UserProfile;

// ============================================================================
// Login
// ============================================================================

/// Login request; either `username` or `email` identifies the user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// First non-blank of `username`, `email`
    pub fn identifier(&self) -> Option<String> {
        [&self.username, &self.email]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .cloned()
    }
}

/// Login response. Tokens are echoed for clients that cannot use cookies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

// ============================================================================
// Refresh
// ============================================================================

/// Body fallback when the refresh cookie is absent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<SessionPair> for RefreshResponse {
    fn from(tokens: SessionPair) -> Self {
        Self {
            access_token: tokens.access.value,
            refresh_token: tokens.refresh.value,
        }
    }
}

// ============================================================================
// User
// ============================================================================

/// User as exposed over HTTP; never carries the password hash or a token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.user_id.to_string(),
            username: profile.user_name.to_string(),
            email: profile.email.to_string(),
            full_name: profile.full_name,
            avatar: profile.avatar,
            cover_image: profile.cover_image,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}
