//! Register Use Case
//!
//! Creates a new user. The avatar upload must succeed before anything is
//! written; the user starts without a session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::{store_call, upload_call};
use crate::domain::entity::user::{User, UserProfile};
use crate::domain::repository::{AssetStorage, Upload, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: Option<Upload>,
    pub cover_image: Option<Upload>,
}

/// Register use case
pub struct RegisterUseCase<U, A>
where
    U: UserRepository,
    A: AssetStorage,
{
    user_repo: Arc<U>,
    storage: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<U, A> RegisterUseCase<U, A>
where
    U: UserRepository,
    A: AssetStorage,
{
    pub fn new(user_repo: Arc<U>, storage: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            storage,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<UserProfile> {
        let missing: Vec<String> = [
            ("username", &input.user_name),
            ("email", &input.email),
            ("fullName", &input.full_name),
            ("password", &input.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.to_string())
        .collect();

        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing));
        }

        let user_name = UserName::new(&input.user_name)?;
        let email = Email::new(&input.email)?;
        let raw_password = RawPassword::new(input.password)?;

        let timeout = self.config.store_timeout;

        if store_call(
            timeout,
            self.user_repo.exists_by_username_or_email(&user_name, &email),
        )
        .await?
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let avatar = input
            .avatar
            .filter(|upload| !upload.is_empty())
            .ok_or(AuthError::AvatarRequired)?;

        let avatar_url = upload_call(self.config.upload_timeout, self.storage.upload(avatar))
            .await?
            .url;

        let cover_image_url = match input.cover_image.filter(|upload| !upload.is_empty()) {
            Some(cover) => {
                match upload_call(self.config.upload_timeout, self.storage.upload(cover)).await {
                    Ok(asset) => asset.url,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            user_name = %user_name,
                            "Cover image upload failed, continuing without it"
                        );
                        String::new()
                    }
                }
            }
            None => String::new(),
        };

        let password = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let user = User::new(
            user_name,
            email,
            input.full_name.trim(),
            avatar_url,
            cover_image_url,
            password,
        );

        store_call(timeout, self.user_repo.create(&user)).await?;

        let created = store_call(timeout, self.user_repo.find_by_id(&user.user_id))
            .await?
            .ok_or_else(|| {
                AuthError::Internal("Something went wrong while creating user".to_string())
            })?;

        tracing::info!(
            user_id = %created.user_id,
            user_name = %created.user_name,
            "User registered"
        );

        Ok(created.profile())
    }
}
