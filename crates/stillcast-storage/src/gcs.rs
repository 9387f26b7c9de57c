use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path as ObjectPath;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Google Cloud Storage implementation
#[derive(Clone)]
pub struct GcsStorage {
    store: GoogleCloudStorage,
    bucket: String,
}

impl GcsStorage {
    /// Create a new GcsStorage instance
    ///
    /// Credentials come from the environment (`GOOGLE_SERVICE_ACCOUNT`,
    /// `GOOGLE_SERVICE_ACCOUNT_PATH`, `GOOGLE_APPLICATION_CREDENTIALS`, or the
    /// metadata server when running on GCP).
    pub async fn new(bucket: String) -> StorageResult<Self> {
        Self::with_builder(GoogleCloudStorageBuilder::from_env(), bucket)
    }

    fn with_builder(builder: GoogleCloudStorageBuilder, bucket: String) -> StorageResult<Self> {
        let store = builder
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(GcsStorage { store, bucket })
    }
}

/// Object metadata set on every upload.
fn put_options(content_type: &str) -> PutOptions {
    PutOptions {
        attributes: Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        )]),
        ..Default::default()
    }
}

#[async_trait]
impl Storage for GcsStorage {
    async fn download_to_file(&self, storage_key: &str, dest: &Path) -> StorageResult<u64> {
        validate_key(storage_key)?;
        let start = std::time::Instant::now();
        let location = ObjectPath::from(storage_key);

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let mut file = fs::File::create(dest).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to create file {}: {}", dest.display(), e))
        })?;

        let mut stream = result.into_stream();
        let mut size = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "GCS stream download error"
                );
                StorageError::DownloadFailed(e.to_string())
            })?;
            file.write_all(&chunk).await.map_err(|e| {
                StorageError::DownloadFailed(format!(
                    "Failed to write file {}: {}",
                    dest.display(),
                    e
                ))
            })?;
            size += chunk.len() as u64;
        }

        file.flush().await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            path = %dest.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS download successful"
        );

        Ok(size)
    }

    async fn upload_from_file(
        &self,
        storage_key: &str,
        src: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let start = std::time::Instant::now();

        let data = fs::read(src).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read file {}: {}", src.display(), e))
        })?;
        let size = data.len() as u64;
        let location = ObjectPath::from(storage_key);

        let result: ObjectResult<_> = self
            .store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(data)),
                put_options(content_type),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "GCS upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.object_location(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "GCS upload successful"
        );

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        let location = ObjectPath::from(storage_key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn object_location(&self, storage_key: &str) -> String {
        format!("gs://{}/{}", self.bucket, storage_key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> GcsStorage {
        GcsStorage::with_builder(GoogleCloudStorageBuilder::new(), "stillcast-media".to_string())
            .unwrap()
    }

    #[test]
    fn test_put_options_carry_content_type() {
        let options = put_options("video/mp4");
        let content_type = options.attributes.get(&Attribute::ContentType).unwrap();
        assert_eq!(content_type.as_ref(), "video/mp4");
    }

    #[test]
    fn test_object_location_and_bucket() {
        let storage = storage();
        assert_eq!(storage.bucket(), "stillcast-media");
        assert_eq!(storage.object_location("video.mp4"), "gs://stillcast-media/video.mp4");
        assert_eq!(storage.backend_type(), StorageBackend::Gcs);
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected_before_any_request() {
        let storage = storage();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("video.mp4");
        tokio::fs::write(&file, b"mp4").await.unwrap();

        assert!(matches!(
            storage.download_to_file("", &file).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.upload_from_file("../video.mp4", &file, "video/mp4").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.exists("/video.mp4").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
