//! HTTP Handlers

use std::sync::Arc;

use axum::Extension;
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::Field;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use kernel::response::ApiResponse;
use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, RefreshSessionUseCase, RegisterInput,
    RegisterUseCase,
};
use crate::domain::entity::session_token::SessionPair;
use crate::domain::repository::{AssetStorage, SessionStore, Upload, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, RefreshResponse, RefreshTokenRequest, UserResponse,
};
use crate::presentation::middleware::AuthenticatedUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, A>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub storage: Arc<A>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /register (multipart)
pub async fn register<R, A>(
    State(state): State<AuthAppState<R, A>>,
    mut multipart: Multipart,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    let input = read_register_form(&mut multipart).await?;

    let use_case =
        RegisterUseCase::new(state.repo.clone(), state.storage.clone(), state.config.clone());
    let profile = use_case.execute(input).await?;

    Ok(ApiResponse::ok(
        StatusCode::CREATED.as_u16(),
        "Successfully registered the user",
        UserResponse::from(profile),
    ))
}

async fn read_register_form(multipart: &mut Multipart) -> AuthResult<RegisterInput> {
    let mut input = RegisterInput {
        user_name: String::new(),
        email: String::new(),
        full_name: String::new(),
        password: String::new(),
        avatar: None,
        cover_image: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "username" => input.user_name = field.text().await.map_err(invalid_form)?,
            "email" => input.email = field.text().await.map_err(invalid_form)?,
            "fullName" => input.full_name = field.text().await.map_err(invalid_form)?,
            "password" => input.password = field.text().await.map_err(invalid_form)?,
            "avatar" => input.avatar = Some(read_upload(field, &name).await?),
            "coverImage" => input.cover_image = Some(read_upload(field, &name).await?),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(input)
}

async fn read_upload(field: Field<'_>, fallback_name: &str) -> AuthResult<Upload> {
    let file_name = field.file_name().unwrap_or(fallback_name).to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(invalid_form)?;

    Ok(Upload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> AuthError {
    AuthError::Validation(format!("Invalid form data: {}", e.body_text()))
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<R, A>(
    State(state): State<AuthAppState<R, A>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    // A missing or unreadable body is treated as missing credentials
    let req = payload.map(|Json(req)| req).unwrap_or_default();

    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());
    let output = use_case
        .execute(LoginInput {
            identifier: req.identifier(),
            password: req.password,
        })
        .await?;

    let cookies = session_cookies(&state.config, &output.tokens)?;

    Ok((
        cookies,
        ApiResponse::ok(
            StatusCode::OK.as_u16(),
            "User logged in successfully",
            LoginResponse {
                user: UserResponse::from(output.user),
                access_token: output.tokens.access.value,
                refresh_token: output.tokens.refresh.value,
            },
        ),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /logout (requires access token)
pub async fn logout<R, A>(
    State(state): State<AuthAppState<R, A>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(&user.user_id).await?;

    let cookies = cleared_cookies(&state.config)?;

    Ok((
        cookies,
        ApiResponse::ok(
            StatusCode::OK.as_u16(),
            "User logged out successfully",
            serde_json::json!({}),
        ),
    ))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /refresh-token
///
/// The refresh token comes from the cookie, or from a JSON body
/// `{"refreshToken": "..."}` when the cookie is absent.
pub async fn refresh_token<R, A>(
    State(state): State<AuthAppState<R, A>>,
    headers: HeaderMap,
    body: Bytes,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionStore + Clone + Send + Sync + 'static,
    A: AssetStorage + Clone + Send + Sync + 'static,
{
    let raw = extract_cookie(&headers, &state.config.refresh_cookie_name).or_else(|| {
        serde_json::from_slice::<RefreshTokenRequest>(&body)
            .ok()
            .and_then(|req| req.refresh_token)
    });

    let use_case = RefreshSessionUseCase::new(state.repo.clone(), state.config.clone());
    let tokens = use_case.execute(raw.as_deref()).await?;

    let cookies = session_cookies(&state.config, &tokens)?;

    Ok((
        cookies,
        ApiResponse::ok(
            StatusCode::OK.as_u16(),
            "Access token refreshed",
            RefreshResponse::from(tokens),
        ),
    ))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /current-user (requires access token)
pub async fn current_user(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    ApiResponse::ok(
        StatusCode::OK.as_u16(),
        "Current user fetched successfully",
        UserResponse::from(user),
    )
}

// ============================================================================
// Cookies
// ============================================================================

fn session_cookies(config: &AuthConfig, tokens: &SessionPair) -> AuthResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        set_cookie_header(&config.access_cookie(), &tokens.access.value).map_err(cookie_error)?,
    );
    headers.append(
        header::SET_COOKIE,
        set_cookie_header(&config.refresh_cookie(), &tokens.refresh.value).map_err(cookie_error)?,
    );
    Ok(headers)
}

fn cleared_cookies(config: &AuthConfig) -> AuthResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        delete_cookie_header(&config.access_cookie()).map_err(cookie_error)?,
    );
    headers.append(
        header::SET_COOKIE,
        delete_cookie_header(&config.refresh_cookie()).map_err(cookie_error)?,
    );
    Ok(headers)
}

fn cookie_error(e: header::InvalidHeaderValue) -> AuthError {
    AuthError::Internal(format!("Invalid cookie header: {e}"))
}
