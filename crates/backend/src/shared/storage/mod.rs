use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;

use crate::shared::config::StorageConfig;

pub mod cloudflare_images;

pub use cloudflare_images::CloudflareImagesClient;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Storage returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Seam between the import pipeline and the object store. `put`
/// returns a stable public URL for the stored object.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

static STORAGE: OnceCell<Arc<dyn ObjectStorage>> = OnceCell::new();

/// Wire the configured backend once at startup. Missing configuration
/// is not fatal here; endpoints that need storage report it instead.
pub fn initialize_storage(config: Option<&StorageConfig>) {
    match config {
        Some(cfg) => {
            let client: Arc<dyn ObjectStorage> = Arc::new(CloudflareImagesClient::new(cfg));
            if STORAGE.set(client).is_err() {
                tracing::warn!("Object storage already initialized");
            } else {
                tracing::info!("Object storage configured (Cloudflare Images)");
            }
        }
        None => {
            tracing::warn!("No [storage] section in config; image uploads are disabled");
        }
    }
}

pub fn client() -> Result<Arc<dyn ObjectStorage>, StorageError> {
    STORAGE.get().cloned().ok_or(StorageError::NotConfigured)
}
