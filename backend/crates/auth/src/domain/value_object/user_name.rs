//! User Name Value Object
//!
//! The public handle of a user. Canonical form is trimmed and lower-cased;
//! every lookup and insert goes through this form so `Alice` and `alice`
//! are the same user.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Normalize and validate a user name from input
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let canonical = raw.as_ref().trim().to_lowercase();

        if canonical.is_empty() {
            return Err(AppError::bad_request("Username cannot be empty"));
        }

        if canonical.chars().count() > USER_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be at most {} characters",
                USER_NAME_MAX_LENGTH
            )));
        }

        if canonical.chars().any(char::is_whitespace) {
            return Err(AppError::bad_request("Username cannot contain whitespace"));
        }

        // Keeps the login identifier unambiguous against email addresses
        if canonical.contains('@') {
            return Err(AppError::bad_request("Username cannot contain '@'"));
        }

        Ok(Self(canonical))
    }

    /// Create from database value (already canonical)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
