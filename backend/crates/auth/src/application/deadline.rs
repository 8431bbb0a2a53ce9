//! Timeouts around suspending collaborator calls

use std::future::Future;
use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Run a repository call; exceeding `limit` is `StoreTimeout`
pub(crate) async fn store_call<T>(
    limit: Duration,
    call: impl Future<Output = AuthResult<T>>,
) -> AuthResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AuthError::StoreTimeout)?
}

/// Run an upload; exceeding `limit` is an upload failure
pub(crate) async fn upload_call<T>(
    limit: Duration,
    call: impl Future<Output = AuthResult<T>>,
) -> AuthResult<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AuthError::Upload(format!("upload timed out after {limit:?}")))?
}
