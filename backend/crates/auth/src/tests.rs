//! Scenario tests for the auth crate
//!
//! Use cases run against the in-memory repository; router tests drive the
//! full axum stack with `oneshot`.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use crate::application::{AuthConfig, RegisterInput, RegisterUseCase};
    use crate::domain::entity::user::{User, UserProfile};
    use crate::domain::repository::{
        AssetStorage, SessionStore, StoredAsset, Upload, UserRepository,
    };
    use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
    use crate::error::{AuthError, AuthResult};
    use crate::infra::{InMemoryAssetStorage, InMemoryUserRepository};

    pub const PASSWORD: &str = "s3cret-Pass";

    pub fn config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig::development())
    }

    pub fn image(file_name: &str) -> Upload {
        Upload {
            file_name: file_name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    pub fn registration(user_name: &str, email: &str) -> RegisterInput {
        RegisterInput {
            user_name: user_name.to_string(),
            email: email.to_string(),
            full_name: "Alice Liddell".to_string(),
            password: PASSWORD.to_string(),
            avatar: Some(image("avatar.png")),
            cover_image: None,
        }
    }

    pub async fn register_alice(
        repo: &Arc<InMemoryUserRepository>,
        config: &Arc<AuthConfig>,
    ) -> UserProfile {
        RegisterUseCase::new(
            repo.clone(),
            Arc::new(InMemoryAssetStorage::new()),
            config.clone(),
        )
        .execute(registration("alice", "alice@x.com"))
        .await
        .expect("alice registers")
    }

    pub async fn stored_token<R: UserRepository>(repo: &R, user_id: &UserId) -> Option<String> {
        repo.find_by_id(user_id)
            .await
            .expect("lookup succeeds")
            .expect("user exists")
            .refresh_token
    }

    /// Upload service that is down
    #[derive(Clone, Default)]
    pub struct FailingStorage;

    impl AssetStorage for FailingStorage {
        async fn upload(&self, _upload: Upload) -> AuthResult<StoredAsset> {
            Err(AuthError::Upload("upload service returned 503".to_string()))
        }
    }

    /// Accepts avatars, rejects cover images
    #[derive(Clone, Default)]
    pub struct CoverRejectingStorage {
        inner: InMemoryAssetStorage,
    }

    impl AssetStorage for CoverRejectingStorage {
        async fn upload(&self, upload: Upload) -> AuthResult<StoredAsset> {
            if upload.file_name.starts_with("cover") {
                return Err(AuthError::Upload("cover rejected".to_string()));
            }
            self.inner.upload(upload).await
        }
    }

    /// Users persist normally, refresh tokens never do
    #[derive(Clone, Default)]
    pub struct ReadOnlySessionRepository {
        pub inner: InMemoryUserRepository,
    }

    impl UserRepository for ReadOnlySessionRepository {
        async fn create(&self, user: &User) -> AuthResult<()> {
            self.inner.create(user).await
        }

        async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
            self.inner.find_by_id(user_id).await
        }

        async fn find_by_username_or_email(&self, identifier: &str) -> AuthResult<Option<User>> {
            self.inner.find_by_username_or_email(identifier).await
        }

        async fn exists_by_username_or_email(
            &self,
            user_name: &UserName,
            email: &Email,
        ) -> AuthResult<bool> {
            self.inner.exists_by_username_or_email(user_name, email).await
        }

        async fn count(&self) -> AuthResult<u64> {
            self.inner.count().await
        }
    }

    impl SessionStore for ReadOnlySessionRepository {
        async fn set_refresh_token(&self, _user_id: &UserId, _token: &str) -> AuthResult<()> {
            Err(AuthError::Internal("connection reset".to_string()))
        }

        async fn rotate_refresh_token(
            &self,
            _user_id: &UserId,
            _expected: &str,
            _next: &str,
        ) -> AuthResult<bool> {
            Err(AuthError::Internal("connection reset".to_string()))
        }

        async fn clear_refresh_token(&self, user_id: &UserId) -> AuthResult<()> {
            self.inner.clear_refresh_token(user_id).await
        }
    }

    /// Accepts inserts but never finds anything by id
    #[derive(Clone, Default)]
    pub struct LaggingReplicaRepository {
        pub inner: InMemoryUserRepository,
    }

    impl UserRepository for LaggingReplicaRepository {
        async fn create(&self, user: &User) -> AuthResult<()> {
            self.inner.create(user).await
        }

        async fn find_by_id(&self, _user_id: &UserId) -> AuthResult<Option<User>> {
            Ok(None)
        }

        async fn find_by_username_or_email(&self, identifier: &str) -> AuthResult<Option<User>> {
            self.inner.find_by_username_or_email(identifier).await
        }

        async fn exists_by_username_or_email(
            &self,
            user_name: &UserName,
            email: &Email,
        ) -> AuthResult<bool> {
            self.inner.exists_by_username_or_email(user_name, email).await
        }

        async fn count(&self) -> AuthResult<u64> {
            self.inner.count().await
        }
    }

    /// Log out directly through the store
    pub async fn clear_session<S: SessionStore>(store: &S, user_id: &UserId) {
        store.clear_refresh_token(user_id).await.expect("clear succeeds");
    }
}

#[cfg(test)]
mod session_lifecycle_tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::support::*;
    use crate::application::{
        LoginInput, LoginUseCase, LogoutUseCase, RefreshSessionUseCase, RegisterUseCase,
        TokenVerifier,
    };
    use crate::domain::entity::session_token::TokenKind;
    use crate::domain::repository::{SessionStore, UserRepository};
    use crate::error::AuthError;
    use crate::infra::{InMemoryAssetStorage, InMemoryUserRepository};
    use kernel::error::kind::ErrorKind;

    fn credentials(identifier: &str, password: &str) -> LoginInput {
        LoginInput {
            identifier: Some(identifier.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_alice_register_login_refresh_logout() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();

        let alice = register_alice(&repo, &config).await;
        assert_eq!(stored_token(&*repo, &alice.user_id).await, None);

        let login = LoginUseCase::new(repo.clone(), config.clone());
        let output = assert_ok!(login.execute(credentials("alice", PASSWORD)).await);
        let t1 = output.tokens.refresh.value.clone();
        assert_eq!(output.user.user_id, alice.user_id);
        assert_eq!(stored_token(&*repo, &alice.user_id).await, Some(t1.clone()));

        let refresh = RefreshSessionUseCase::new(repo.clone(), config.clone());
        let rotated = assert_ok!(refresh.execute(Some(&t1)).await);
        let t2 = rotated.refresh.value.clone();
        assert_ne!(t1, t2);
        assert_eq!(stored_token(&*repo, &alice.user_id).await, Some(t2.clone()));

        // Rotated-away token is dead even though it has not expired
        let err = assert_err!(refresh.execute(Some(&t1)).await);
        assert!(matches!(err, AuthError::RefreshTokenMismatch));
        assert_eq!(stored_token(&*repo, &alice.user_id).await, Some(t2.clone()));

        let logout = LogoutUseCase::new(repo.clone(), config.clone());
        assert_ok!(logout.execute(&alice.user_id).await);
        assert_eq!(stored_token(&*repo, &alice.user_id).await, None);

        let err = assert_err!(refresh.execute(Some(&t2)).await);
        assert!(matches!(err, AuthError::RefreshTokenMismatch));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_access_token_resolves_same_user() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        let alice = register_alice(&repo, &config).await;

        let output = assert_ok!(
            LoginUseCase::new(repo.clone(), config.clone())
                .execute(credentials("alice@x.com", PASSWORD))
                .await
        );

        let verifier = TokenVerifier::new(repo.clone(), config.clone());
        let user = assert_ok!(
            verifier
                .verify(Some(&output.tokens.access.value), TokenKind::Access)
                .await
        );
        assert_eq!(user.user_id, alice.user_id);
    }

    #[tokio::test]
    async fn test_new_refresh_token_works_once() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        register_alice(&repo, &config).await;

        let output = assert_ok!(
            LoginUseCase::new(repo.clone(), config.clone())
                .execute(credentials("alice", PASSWORD))
                .await
        );
        let refresh = RefreshSessionUseCase::new(repo.clone(), config.clone());

        let t2 = assert_ok!(refresh.execute(Some(&output.tokens.refresh.value)).await);
        let t3 = assert_ok!(refresh.execute(Some(&t2.refresh.value)).await);
        assert_err!(refresh.execute(Some(&t2.refresh.value)).await);
        assert_ok!(refresh.execute(Some(&t3.refresh.value)).await);
    }

    #[tokio::test]
    async fn test_login_replaces_previous_session() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        register_alice(&repo, &config).await;

        let login = LoginUseCase::new(repo.clone(), config.clone());
        let first = assert_ok!(login.execute(credentials("alice", PASSWORD)).await);
        let second = assert_ok!(login.execute(credentials("alice", PASSWORD)).await);
        assert_ne!(first.tokens.refresh.value, second.tokens.refresh.value);

        let refresh = RefreshSessionUseCase::new(repo.clone(), config.clone());
        let err = assert_err!(refresh.execute(Some(&first.tokens.refresh.value)).await);
        assert!(matches!(err, AuthError::RefreshTokenMismatch));
        assert_ok!(refresh.execute(Some(&second.tokens.refresh.value)).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_refresh_has_exactly_one_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        let alice = register_alice(&repo, &config).await;

        let output = assert_ok!(
            LoginUseCase::new(repo.clone(), config.clone())
                .execute(credentials("alice", PASSWORD))
                .await
        );
        let t1 = output.tokens.refresh.value;

        let refresh = Arc::new(RefreshSessionUseCase::new(repo.clone(), config.clone()));
        let barrier = Arc::new(tokio::sync::Barrier::new(2));

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let refresh = refresh.clone();
                let barrier = barrier.clone();
                let token = t1.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    refresh.execute(Some(&token)).await
                })
            })
            .collect();

        let mut winners = Vec::new();
        let mut losers = 0;
        for task in tasks {
            match task.await.expect("task completes") {
                Ok(pair) => winners.push(pair.refresh.value),
                Err(e) => {
                    assert!(matches!(e, AuthError::RefreshTokenMismatch));
                    losers += 1;
                }
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(losers, 1);
        assert_eq!(stored_token(&*repo, &alice.user_id).await, Some(winners.remove(0)));
    }

    #[tokio::test]
    async fn test_store_rotation_is_compare_and_set() {
        let repo = InMemoryUserRepository::new();
        let alice = register_alice(&Arc::new(repo.clone()), &config()).await;

        assert_ok!(repo.set_refresh_token(&alice.user_id, "t1").await);

        assert!(!assert_ok!(repo.rotate_refresh_token(&alice.user_id, "stale", "t2").await));
        assert_eq!(stored_token(&repo, &alice.user_id).await.as_deref(), Some("t1"));

        assert!(assert_ok!(repo.rotate_refresh_token(&alice.user_id, "t1", "t2").await));
        assert_eq!(stored_token(&repo, &alice.user_id).await.as_deref(), Some("t2"));

        clear_session(&repo, &alice.user_id).await;
        assert!(!assert_ok!(repo.rotate_refresh_token(&alice.user_id, "t2", "t3").await));
        assert_eq!(stored_token(&repo, &alice.user_id).await, None);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        let alice = register_alice(&repo, &config).await;
        let login = LoginUseCase::new(repo.clone(), config.clone());

        let err = assert_err!(login.execute(credentials("bob", PASSWORD)).await);
        assert!(matches!(err, AuthError::UserNotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = assert_err!(login.execute(credentials("alice", "not-the-password")).await);
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        // Both render the same envelope shape
        for err in [AuthError::UserNotFound, AuthError::InvalidCredentials] {
            let app_error = err.to_app_error();
            assert!(!app_error.message().is_empty());
            assert!(app_error.errors().is_empty());
        }

        assert_eq!(stored_token(&*repo, &alice.user_id).await, None);
    }

    #[tokio::test]
    async fn test_login_fails_when_refresh_token_is_not_persisted() {
        let repo = Arc::new(ReadOnlySessionRepository::default());
        let config = config();
        RegisterUseCase::new(
            repo.clone(),
            Arc::new(InMemoryAssetStorage::new()),
            config.clone(),
        )
        .execute(registration("alice", "alice@x.com"))
        .await
        .expect("alice registers");

        let login = LoginUseCase::new(repo.clone(), config);
        let err = assert_err!(login.execute(credentials("alice", PASSWORD)).await);

        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        assert_eq!(err.status_code().as_u16(), 500);
    }

    #[tokio::test]
    async fn test_login_by_email_ignores_look_alike_username() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        let alice = register_alice(&repo, &config).await;

        let register = RegisterUseCase::new(
            repo.clone(),
            Arc::new(InMemoryAssetStorage::new()),
            config.clone(),
        );
        let err = assert_err!(register.execute(registration("alice@x.com", "bob@x.com")).await);
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(assert_ok!(repo.count().await), 1);

        let login = LoginUseCase::new(repo.clone(), config);
        let output = assert_ok!(login.execute(credentials("alice@x.com", PASSWORD)).await);
        assert_eq!(output.user.user_id, alice.user_id);
    }

    #[tokio::test]
    async fn test_login_requires_identifier_and_password() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let login = LoginUseCase::new(repo, config());

        let err = assert_err!(
            login
                .execute(LoginInput {
                    identifier: Some("  ".to_string()),
                    password: Some(PASSWORD.to_string()),
                })
                .await
        );
        assert!(matches!(err, AuthError::MissingCredentials("Username or email is required")));

        let err = assert_err!(
            login
                .execute(LoginInput {
                    identifier: Some("alice".to_string()),
                    password: None,
                })
                .await
        );
        assert!(matches!(err, AuthError::MissingCredentials("Password is required")));
    }

    #[tokio::test]
    async fn test_refresh_requires_a_token() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let refresh = RefreshSessionUseCase::new(repo, config());

        let err = assert_err!(refresh.execute(None).await);
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        register_alice(&repo, &config).await;

        let output = assert_ok!(
            LoginUseCase::new(repo.clone(), config.clone())
                .execute(credentials("alice", PASSWORD))
                .await
        );

        let refresh = RefreshSessionUseCase::new(repo.clone(), config.clone());
        let err = assert_err!(refresh.execute(Some(&output.tokens.access.value)).await);
        assert!(matches!(err, AuthError::InvalidSignature));
    }
}

#[cfg(test)]
mod verifier_tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use tokio_test::{assert_err, assert_ok};

    use super::support::*;
    use crate::application::{TokenIssuer, TokenVerifier};
    use crate::domain::entity::session_token::TokenKind;
    use crate::domain::entity::user::User;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{
        email::Email,
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };
    use crate::error::AuthError;
    use crate::infra::InMemoryUserRepository;

    /// A user that was never saved
    fn ghost() -> User {
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        User::new(
            UserName::new("ghost").unwrap(),
            Email::new("ghost@x.com").unwrap(),
            "Ghost",
            "memory://assets/ghost.png",
            "",
            UserPassword::from_raw(&raw, None).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_missing_token() {
        let verifier = TokenVerifier::new(Arc::new(InMemoryUserRepository::new()), config());

        let err = assert_err!(verifier.verify(None, TokenKind::Access).await);
        assert!(matches!(err, AuthError::MissingToken));

        let err = assert_err!(verifier.verify(Some("   "), TokenKind::Access).await);
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_expired_token_never_resolves_subject() {
        let config = config();
        let verifier = TokenVerifier::new(Arc::new(InMemoryUserRepository::new()), config.clone());
        let issued_at = Utc::now() - Duration::hours(1);

        let issuer = TokenIssuer::new(config);
        let token = assert_ok!(issuer.issue_at(TokenKind::Access, &ghost(), issued_at));

        // The subject does not exist; reaching the lookup would yield InvalidSubject
        let err = assert_err!(verifier.verify(Some(&token.value), TokenKind::Access).await);
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        let alice = register_alice(&repo, &config).await;
        let user = repo.find_by_id(&alice.user_id).await.unwrap().unwrap();

        let now = Utc::now();
        let issuer = TokenIssuer::new(config.clone());
        let token = assert_ok!(issuer.issue_at(TokenKind::Access, &user, now));
        let verifier = TokenVerifier::new(repo.clone(), config.clone());
        let exp = now + Duration::seconds(15 * 60);

        assert_ok!(verifier.verify_at(Some(&token.value), TokenKind::Access, exp).await);
        let err = assert_err!(
            verifier
                .verify_at(Some(&token.value), TokenKind::Access, exp + Duration::seconds(1))
                .await
        );
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let config = config();
        let verifier = TokenVerifier::new(Arc::new(InMemoryUserRepository::new()), config.clone());
        let token = assert_ok!(TokenIssuer::new(config).issue_access_token(&ghost()));

        let err = assert_err!(verifier.verify(Some(&token.value), TokenKind::Access).await);
        assert!(matches!(err, AuthError::InvalidSubject));
    }

    #[tokio::test]
    async fn test_wrong_secret_and_wrong_type() {
        let config = config();
        let verifier = TokenVerifier::new(Arc::new(InMemoryUserRepository::new()), config.clone());
        let issuer = TokenIssuer::new(config);

        let refresh = assert_ok!(issuer.issue_refresh_token(&ghost()));
        let err = assert_err!(verifier.verify(Some(&refresh.value), TokenKind::Access).await);
        assert!(matches!(err, AuthError::InvalidSignature));

        // Signed by another deployment
        let foreign =
            TokenIssuer::new(crate::application::AuthConfig::with_random_secrets().into());
        let token = assert_ok!(foreign.issue_access_token(&ghost()));
        let err = assert_err!(verifier.verify(Some(&token.value), TokenKind::Access).await);
        assert!(matches!(err, AuthError::InvalidSignature));

        let err = assert_err!(verifier.verify(Some("not-a-token"), TokenKind::Access).await);
        assert!(matches!(err, AuthError::InvalidSignature));
    }
}

#[cfg(test)]
mod register_tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::support::*;
    use crate::application::RegisterUseCase;
    use crate::domain::entity::user::User;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{
        email::Email,
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
    };
    use crate::error::AuthError;
    use crate::infra::{InMemoryAssetStorage, InMemoryUserRepository};
    use kernel::error::kind::ErrorKind;

    #[tokio::test]
    async fn test_register_stores_avatar_and_normalizes_identity() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let storage = Arc::new(InMemoryAssetStorage::new());
        let register = RegisterUseCase::new(repo.clone(), storage.clone(), config());

        let profile = assert_ok!(register.execute(registration("Alice", "Alice@X.com")).await);

        assert_eq!(profile.user_name.as_str(), "alice");
        assert_eq!(profile.email.as_str(), "alice@x.com");
        assert!(profile.avatar.starts_with("memory://assets/"));
        assert_eq!(storage.get(&profile.avatar), Some(image("avatar.png").bytes));
        assert_eq!(profile.cover_image, "");
        assert_eq!(stored_token(&*repo, &profile.user_id).await, None);
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_conflict() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let config = config();
        register_alice(&repo, &config).await;

        // Existence is checked before any upload happens
        let register = RegisterUseCase::new(repo.clone(), Arc::new(FailingStorage), config);

        let err = assert_err!(register.execute(registration("ALICE", "other@x.com")).await);
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = assert_err!(register.execute(registration("bob", "alice@x.com")).await);
        assert!(matches!(err, AuthError::UserAlreadyExists));

        assert_eq!(assert_ok!(repo.count().await), 1);
    }

    #[tokio::test]
    async fn test_handles_are_unique_across_username_and_email() {
        let repo = InMemoryUserRepository::new();
        let config = config();
        register_alice(&Arc::new(repo.clone()), &config).await;

        // A legacy row whose username looks like alice's email
        let clash = UserName::from_db("alice@x.com");
        let fresh = assert_ok!(Email::new("carol@x.com"));
        assert!(assert_ok!(repo.exists_by_username_or_email(&clash, &fresh).await));

        let unused = assert_ok!(UserName::new("carol"));
        let email_as_name = assert_ok!(Email::new("alice@x.com"));
        assert!(assert_ok!(repo.exists_by_username_or_email(&unused, &email_as_name).await));
        assert!(!assert_ok!(repo.exists_by_username_or_email(&unused, &fresh).await));

        let user = User::new(
            clash,
            fresh,
            "Carol",
            "memory://assets/avatar.png",
            "",
            assert_ok!(UserPassword::from_raw(
                &assert_ok!(RawPassword::new(PASSWORD.to_string())),
                None
            )),
        );
        let err = assert_err!(repo.create(&user).await);
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(assert_ok!(repo.count().await), 1);
    }

    #[tokio::test]
    async fn test_user_missing_after_create_is_internal_error() {
        let repo = Arc::new(LaggingReplicaRepository::default());
        let register =
            RegisterUseCase::new(repo.clone(), Arc::new(InMemoryAssetStorage::new()), config());

        let err = assert_err!(register.execute(registration("alice", "alice@x.com")).await);
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.status_code().as_u16(), 500);
        assert_eq!(err.to_app_error().message(), "Something went wrong while creating user");
    }

    #[tokio::test]
    async fn test_blank_fields_are_listed() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let register =
            RegisterUseCase::new(repo.clone(), Arc::new(InMemoryAssetStorage::new()), config());

        let mut input = registration("alice", "alice@x.com");
        input.full_name = "  ".to_string();
        input.password = String::new();

        let err = assert_err!(register.execute(input).await);
        match err {
            AuthError::MissingFields(ref fields) => {
                assert_eq!(fields, &vec!["fullName".to_string(), "password".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(assert_ok!(repo.count().await), 0);
    }

    #[tokio::test]
    async fn test_invalid_email_is_validation_error() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let register = RegisterUseCase::new(repo, Arc::new(InMemoryAssetStorage::new()), config());

        let err = assert_err!(register.execute(registration("alice", "not-an-email")).await);
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_avatar_is_required() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let register =
            RegisterUseCase::new(repo.clone(), Arc::new(InMemoryAssetStorage::new()), config());

        let mut input = registration("alice", "alice@x.com");
        input.avatar = None;
        let err = assert_err!(register.execute(input).await);
        assert!(matches!(err, AuthError::AvatarRequired));

        let mut input = registration("alice", "alice@x.com");
        input.avatar = Some(crate::domain::repository::Upload {
            bytes: Vec::new(),
            ..image("empty.png")
        });
        let err = assert_err!(register.execute(input).await);
        assert!(matches!(err, AuthError::AvatarRequired));

        assert_eq!(assert_ok!(repo.count().await), 0);
    }

    #[tokio::test]
    async fn test_failed_avatar_upload_creates_no_user() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let register = RegisterUseCase::new(repo.clone(), Arc::new(FailingStorage), config());

        let err = assert_err!(register.execute(registration("alice", "alice@x.com")).await);
        assert!(matches!(err, AuthError::Upload(_)));
        assert_eq!(err.kind(), ErrorKind::BadGateway);
        assert_eq!(assert_ok!(repo.count().await), 0);
    }

    #[tokio::test]
    async fn test_failed_cover_upload_is_ignored() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let register = RegisterUseCase::new(
            repo.clone(),
            Arc::new(CoverRejectingStorage::default()),
            config(),
        );

        let mut input = registration("alice", "alice@x.com");
        input.cover_image = Some(image("cover.png"));

        let profile = assert_ok!(register.execute(input).await);
        assert!(!profile.avatar.is_empty());
        assert_eq!(profile.cover_image, "");
        assert_eq!(assert_ok!(repo.count().await), 1);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::infra::{InMemoryAssetStorage, InMemoryUserRepository};
    use crate::presentation::router::auth_router;

    const BOUNDARY: &str = "X-AUTH-TEST-BOUNDARY";

    async fn app_with_alice() -> (Router, InMemoryUserRepository) {
        let repo = InMemoryUserRepository::new();
        let config = config();
        register_alice(&Arc::new(repo.clone()), &config).await;

        let app = auth_router(repo.clone(), InMemoryAssetStorage::new(), (*config).clone());
        (app, repo)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(json_request(
                "/login",
                json!({ "username": "alice", "password": PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    fn multipart_body(fields: &[(&str, &str)], avatar: Option<&[u8]>) -> Body {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = avatar {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"avatar.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    fn register_request(body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    const BOB_FIELDS: [(&str, &str); 4] = [
        ("username", "bob"),
        ("email", "bob@x.com"),
        ("fullName", "Bob"),
        ("password", PASSWORD),
    ];

    #[tokio::test]
    async fn test_register_over_multipart() {
        let (app, _) = app_with_alice().await;

        let response = app
            .oneshot(register_request(multipart_body(&BOB_FIELDS, Some(&b"png-bytes"[..]))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["statusCode"], 201);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Successfully registered the user");
        assert_eq!(body["data"]["username"], "bob");
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("refreshToken").is_none());
    }

    #[tokio::test]
    async fn test_register_without_avatar() {
        let (app, _) = app_with_alice().await;

        let response = app
            .oneshot(register_request(multipart_body(&BOB_FIELDS, None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Avatar is required");
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_login_sets_both_cookies() {
        let (app, _) = app_with_alice().await;

        let response = app
            .oneshot(json_request(
                "/login",
                json!({ "email": "alice@x.com", "password": PASSWORD }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("accessToken=")));
        assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")));
        assert!(cookies.iter().all(|c| c.contains("HttpOnly")));

        let body = body_json(response).await;
        assert_eq!(body["message"], "User logged in successfully");
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert!(body["data"]["accessToken"].is_string());
    }

    #[tokio::test]
    async fn test_login_without_body_is_unauthorized() {
        let (app, _) = app_with_alice().await;

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Username or email is required");
    }

    #[tokio::test]
    async fn test_current_user_requires_access_token() {
        let (app, _) = app_with_alice().await;

        let request = Request::builder()
            .uri("/current-user")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Unauthorized request");

        let access = login(&app).await["data"]["accessToken"]
            .as_str()
            .unwrap()
            .to_string();

        let request = Request::builder()
            .uri("/current-user")
            .header(header::AUTHORIZATION, format!("Bearer {access}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["email"], "alice@x.com");
    }

    #[tokio::test]
    async fn test_refresh_from_body_then_replay_fails() {
        let (app, _) = app_with_alice().await;
        let t1 = login(&app).await["data"]["refreshToken"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request("/refresh-token", json!({ "refreshToken": t1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(set_cookies(&response).len(), 2);

        let response = app
            .oneshot(json_request("/refresh-token", json!({ "refreshToken": t1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Unauthorized request");
    }

    #[tokio::test]
    async fn test_logout_clears_cookies_and_session() {
        let (app, repo) = app_with_alice().await;
        let data = login(&app).await["data"].clone();
        let access = data["accessToken"].as_str().unwrap();
        let refresh = data["refreshToken"].as_str().unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::COOKIE, format!("accessToken={access}; refreshToken={refresh}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));

        let user_id = data["user"]["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(stored_token(&repo, &user_id).await, None);

        let request = Request::builder()
            .method("POST")
            .uri("/refresh-token")
            .header(header::COOKIE, format!("refreshToken={refresh}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
