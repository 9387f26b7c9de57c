//! In-memory fakes for the blob store and the encoder.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use stillcast_storage::{Storage, StorageBackend, StorageError, StorageResult};

use crate::encoder::{EncoderError, MediaEncoder};

/// Storage operation recorded by [`MockStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Download(String),
    Upload(String),
    Exists(String),
}

/// Blob store held in a `HashMap`, reporting `gs://test-bucket/<key>` locations.
pub struct MockStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<StorageCall>>,
    content_types: Mutex<HashMap<String, String>>,
    fail_uploads: AtomicBool,
    unreachable: AtomicBool,
}

impl MockStorage {
    pub const BUCKET: &'static str = "test-bucket";

    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            content_types: Mutex::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Store preloaded with `cover.png` and `track.mp3`.
    pub fn with_inputs() -> Self {
        let storage = Self::new();
        storage.insert("cover.png", b"\x89PNG".to_vec());
        storage.insert("track.mp3", b"ID3".to_vec());
        storage
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.blobs.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Content type the blob was uploaded with.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.content_types.lock().unwrap().get(key).cloned()
    }

    /// Make every later upload fail.
    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    /// Make every later operation fail as if the store could not be reached.
    pub fn set_unreachable(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: StorageCall) -> StorageResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("connection refused".to_string()));
        }
        Ok(())
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn download_to_file(&self, storage_key: &str, dest: &Path) -> StorageResult<u64> {
        self.record(StorageCall::Download(storage_key.to_string()))?;
        let data = self
            .get(storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))?;
        tokio::fs::write(dest, &data).await?;
        Ok(data.len() as u64)
    }

    async fn upload_from_file(
        &self,
        storage_key: &str,
        src: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        self.record(StorageCall::Upload(storage_key.to_string()))?;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("permission denied".to_string()));
        }
        let data = tokio::fs::read(src).await?;
        self.insert(storage_key, data);
        self.content_types
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), content_type.to_string());
        Ok(self.object_location(storage_key))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.record(StorageCall::Exists(storage_key.to_string()))?;
        Ok(self.contains(storage_key))
    }

    fn object_location(&self, storage_key: &str) -> String {
        format!("gs://{}/{}", Self::BUCKET, storage_key)
    }

    fn bucket(&self) -> &str {
        Self::BUCKET
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Succeed,
    CheckFails,
    ComposeFails,
}

/// Encoder whose result is fixed at construction. Counts its invocations and,
/// when succeeding, writes [`ScriptedEncoder::OUTPUT_BYTES`] to the output path.
pub struct ScriptedEncoder {
    outcome: Outcome,
    availability_checks: AtomicUsize,
    compose_calls: AtomicUsize,
}

impl ScriptedEncoder {
    pub const OUTPUT_BYTES: &'static [u8] = b"fake mp4";

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            availability_checks: AtomicUsize::new(0),
            compose_calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_outcome(Outcome::Succeed)
    }

    /// Availability check fails, as with a missing binary.
    pub fn unavailable() -> Self {
        Self::with_outcome(Outcome::CheckFails)
    }

    /// Availability check passes, composition exits non-zero.
    pub fn failing() -> Self {
        Self::with_outcome(Outcome::ComposeFails)
    }

    pub fn availability_checks(&self) -> usize {
        self.availability_checks.load(Ordering::SeqCst)
    }

    pub fn compose_calls(&self) -> usize {
        self.compose_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaEncoder for ScriptedEncoder {
    async fn check_available(&self) -> Result<(), EncoderError> {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::CheckFails => Err(EncoderError::Unavailable(
                "ffmpeg: No such file or directory".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn compose_still(
        &self,
        _image: &Path,
        _audio: &Path,
        output: &Path,
    ) -> Result<(), EncoderError> {
        self.compose_calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::ComposeFails => Err(EncoderError::Failed(
                "ffmpeg exited with exit status: 1: Invalid data found when processing input"
                    .to_string(),
            )),
            _ => tokio::fs::write(output, Self::OUTPUT_BYTES)
                .await
                .map_err(|e| EncoderError::Failed(e.to_string())),
        }
    }
}
