use async_trait::async_trait;
use serde::Deserialize;

use super::{ObjectStorage, StorageError};
use crate::shared::config::StorageConfig;

/// HTTP client for the Cloudflare Images API. Objects are uploaded
/// under a caller-supplied custom id and served from the public
/// delivery base configured in `config.toml`.
pub struct CloudflareImagesClient {
    client: reqwest::Client,
    account_id: String,
    api_token: String,
    delivery_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

impl CloudflareImagesClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            account_id: config.account_id.clone(),
            api_token: config.api_token.clone(),
            delivery_url: config.delivery_url.trim_end_matches('/').to_string(),
        }
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "https://api.cloudflare.com/client/v4/accounts/{}/images/v1",
            self.account_id
        )
    }
}

#[async_trait]
impl ObjectStorage for CloudflareImagesClient {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(key.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new()
            .text("id", key.to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.upload_endpoint())
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Image upload failed with status {}: {}", status, body);
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UploadResponse = response.json().await?;
        if !parsed.success {
            let body = parsed
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(format!("{}/{}", self.delivery_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let url = format!("{}/{}", self.upload_endpoint(), key);
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
