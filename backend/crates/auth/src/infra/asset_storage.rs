//! HTTP Asset Storage
//!
//! Uploads files to an external object service. The service receives the raw
//! bytes and answers with `{"url": "..."}`.

use reqwest::{Client, header};
use serde::Deserialize;

use crate::domain::repository::{AssetStorage, StoredAsset, Upload};
use crate::error::{AuthError, AuthResult};

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Clone)]
pub struct HttpAssetStorage {
    client: Client,
    endpoint: String,
}

impl HttpAssetStorage {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl AssetStorage for HttpAssetStorage {
    async fn upload(&self, upload: Upload) -> AuthResult<StoredAsset> {
        let content_type = upload
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("filename", upload.file_name.as_str())])
            .header(header::CONTENT_TYPE, content_type)
            .body(upload.bytes)
            .send()
            .await
            .map_err(|e| AuthError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Upload(format!("upload service returned {status}")));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Upload(format!("invalid upload response: {e}")))?;

        if body.url.is_empty() {
            return Err(AuthError::Upload("upload service returned an empty url".to_string()));
        }

        tracing::debug!(file_name = %upload.file_name, url = %body.url, "Asset uploaded");

        Ok(StoredAsset { url: body.url })
    }
}
