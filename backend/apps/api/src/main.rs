//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use auth::{
    AuthConfig, HttpAssetStorage, InMemoryAssetStorage, InMemoryUserRepository, PgUserRepository,
    auth_router,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use kernel::error::app_error::AppError;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auth_config = load_auth_config()?;
    tracing::info!(config = ?auth_config, "Auth configuration loaded");

    let auth = if env::var("AUTH_STORE").as_deref() == Ok("memory") {
        tracing::warn!("AUTH_STORE=memory: users and sessions are lost on restart");
        auth_router(
            InMemoryUserRepository::new(),
            InMemoryAssetStorage::new(),
            auth_config,
        )
    } else {
        // Database connection
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        tracing::info!("Connected to database");

        // Run migrations
        sqlx::migrate!("../../../database/migrations")
            .run(&pool)
            .await?;

        tracing::info!("Migrations completed");

        let repo = PgUserRepository::new(pool);

        match env::var("ASSET_UPLOAD_URL") {
            Ok(endpoint) => auth_router(repo, HttpAssetStorage::new(endpoint), auth_config),
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("ASSET_UPLOAD_URL not set, keeping uploads in memory");
                auth_router(repo, InMemoryAssetStorage::new(), auth_config)
            }
            Err(_) => anyhow::bail!("ASSET_UPLOAD_URL must be set in production"),
        }
    };

    // CORS configuration
    let cors_origins =
        env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = cors_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/v1/user", auth)
        .fallback(|| async { AppError::not_found("Route not found") })
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = match env::var("PORT") {
        Ok(port) => port.parse().context("PORT must be a port number")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build `AuthConfig` from the environment.
///
/// Release builds refuse to start without both signing secrets; debug builds
/// fall back to random ones (sessions do not survive a restart).
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    if let Some(secret) = secret_from_env("ACCESS_TOKEN_SECRET")? {
        config.access_token_secret = secret;
    }
    if let Some(secret) = secret_from_env("REFRESH_TOKEN_SECRET")? {
        config.refresh_token_secret = secret;
    }
    if config.access_token_secret == config.refresh_token_secret {
        anyhow::bail!("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ");
    }

    if let Some(ttl) = seconds_from_env("ACCESS_TOKEN_EXPIRY_SECS")? {
        config.access_token_ttl = ttl;
    }
    if let Some(ttl) = seconds_from_env("REFRESH_TOKEN_EXPIRY_SECS")? {
        config.refresh_token_ttl = ttl;
    }

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}

fn secret_from_env(name: &str) -> anyhow::Result<Option<Vec<u8>>> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(Some(value.into_bytes())),
        _ if cfg!(debug_assertions) => {
            tracing::warn!(variable = name, "Signing secret not set, using a random one");
            Ok(None)
        }
        _ => anyhow::bail!("{name} must be set in production"),
    }
}

fn seconds_from_env(name: &str) -> anyhow::Result<Option<Duration>> {
    match env::var(name) {
        Ok(value) => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("{name} must be a number of seconds"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
