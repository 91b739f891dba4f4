use rand::Rng;

use contracts::usecases::u401_bulk_import::response::{
    ImageIngestResult, UploadFailure, UploadedImage,
};

use crate::shared::storage::ObjectStorage;

/// Upload a batch of image files one at a time, in order. A failed
/// upload is recorded and the loop moves on; objects stored before a
/// failure stay in place (no rollback). Zero files is a valid batch.
pub async fn ingest_images(
    files: Vec<(String, Vec<u8>)>,
    storage: &dyn ObjectStorage,
) -> ImageIngestResult {
    let total = files.len();
    let mut uploaded = Vec::new();
    let mut failed = Vec::new();

    for (filename, bytes) in files {
        let size = bytes.len();
        let key = object_key(&filename);
        let content_type = content_type_for(&filename);

        match storage.put(&key, bytes, &content_type).await {
            Ok(url) => {
                uploaded.push(UploadedImage {
                    filename,
                    url: optimized_delivery_url(&url),
                    original_url: url,
                    size,
                });
            }
            Err(e) => {
                tracing::warn!("Image upload failed for {}: {}", filename, e);
                failed.push(UploadFailure {
                    filename,
                    error: e.to_string(),
                });
            }
        }
    }

    ImageIngestResult {
        total,
        success_count: uploaded.len(),
        failed_count: failed.len(),
        uploaded,
        failed,
    }
}

/// Fresh storage key: a random 16-byte hex id plus the original file
/// extension. Deliberately not derived from the file content.
fn object_key(filename: &str) -> String {
    let mut raw = [0u8; 16];
    rand::thread_rng().fill(&mut raw);
    let id: String = raw.iter().map(|b| format!("{:02x}", b)).collect();

    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    format!("products/{}.{}", id, ext.to_lowercase())
}

fn content_type_for(filename: &str) -> String {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "jpg".to_string());
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        other => format!("image/{}", other),
    }
}

/// Cloudflare image delivery supports named variants; request the
/// optimized `public` variant for those URLs and leave any other
/// backend's URL untouched.
fn optimized_delivery_url(url: &str) -> String {
    if url.contains("imagedelivery.net") {
        format!("{}/public", url)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::shared::storage::StorageError;

    /// Test double: succeeds unless the payload is the literal b"bad",
    /// and records every key it stores.
    struct FakeStorage {
        base_url: String,
        keys: Mutex<Vec<String>>,
    }

    impl FakeStorage {
        fn new(base_url: &str) -> Self {
            Self {
                base_url: base_url.to_string(),
                keys: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ObjectStorage for FakeStorage {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            if bytes == b"bad" {
                return Err(StorageError::UnexpectedStatus {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("{}/{}", self.base_url, key))
        }

        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn zero_files_is_a_valid_batch() {
        let storage = FakeStorage::new("https://cdn.example.com");
        let result = ingest_images(Vec::new(), &storage).await;
        assert_eq!(result.total, 0);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failed_count, 0);
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let storage = FakeStorage::new("https://cdn.example.com");
        let files = vec![
            ("a.jpg".to_string(), b"ok".to_vec()),
            ("b.jpg".to_string(), b"bad".to_vec()),
            ("c.png".to_string(), b"ok".to_vec()),
        ];
        let result = ingest_images(files, &storage).await;
        assert_eq!(result.total, 3);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failed_count, 1);
        assert_eq!(result.failed[0].filename, "b.jpg");
        assert!(result.failed[0].error.contains("500"));
        // The file after the failure was still uploaded.
        assert_eq!(result.uploaded[1].filename, "c.png");
    }

    #[tokio::test]
    async fn keys_are_random_ids_with_the_original_extension() {
        let storage = FakeStorage::new("https://cdn.example.com");
        let files = vec![("photo.PNG".to_string(), b"ok".to_vec())];
        ingest_images(files, &storage).await;

        let keys = storage.keys.lock().unwrap();
        let key = &keys[0];
        assert!(key.starts_with("products/"));
        assert!(key.ends_with(".png"));
        // products/ + 32 hex chars + .png
        assert_eq!(key.len(), "products/".len() + 32 + ".png".len());
    }

    #[tokio::test]
    async fn delivery_variant_is_requested_for_imagedelivery_urls() {
        let storage = FakeStorage::new("https://imagedelivery.net/hash");
        let files = vec![("a.jpg".to_string(), b"ok".to_vec())];
        let result = ingest_images(files, &storage).await;

        let image = &result.uploaded[0];
        assert!(image.url.ends_with("/public"));
        assert!(!image.original_url.ends_with("/public"));
        assert_eq!(image.size, 2);
    }

    #[tokio::test]
    async fn other_backends_urls_are_left_untouched() {
        let storage = FakeStorage::new("https://cdn.example.com");
        let files = vec![("a.jpg".to_string(), b"ok".to_vec())];
        let result = ingest_images(files, &storage).await;
        assert_eq!(result.uploaded[0].url, result.uploaded[0].original_url);
    }
}
