//! Still-image composition pipeline: admit → fetch inputs → check encoder → encode → store output.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use stillcast_core::constants::OUTPUT_CONTENT_TYPE;
use stillcast_core::{AppError, BlobName, CompositionTarget};
use stillcast_storage::Storage;

use crate::admission::EncoderSlots;
use crate::encoder::MediaEncoder;
use crate::scratch::ScratchSpace;

/// Runs one composition per call against the shared blob store and encoder.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct CompositionService {
    storage: Arc<dyn Storage>,
    encoder: Arc<dyn MediaEncoder>,
    slots: EncoderSlots,
    scratch_root: PathBuf,
}

impl CompositionService {
    pub fn new(
        storage: Arc<dyn Storage>,
        encoder: Arc<dyn MediaEncoder>,
        slots: EncoderSlots,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            encoder,
            slots,
            scratch_root: scratch_root.into(),
        }
    }

    pub fn slots(&self) -> &EncoderSlots {
        &self.slots
    }

    /// Run the pipeline for an already validated target.
    ///
    /// Returns the location of the stored video. Stages run strictly in order
    /// and the first failure ends the request; nothing is retried. The scratch
    /// directory is gone by the time this returns, on every path.
    pub async fn compose(
        &self,
        request_id: &str,
        target: &CompositionTarget,
    ) -> Result<String, AppError> {
        let start = Instant::now();
        let _permit = self.slots.acquire().await?;

        let scratch = ScratchSpace::create(&self.scratch_root).await?;
        tracing::debug!(
            request_id = %request_id,
            scratch_dir = %scratch.path().display(),
            "Scratch directory created"
        );

        let image_path = scratch.input_path(&target.image);
        let audio_path = scratch.input_path(&target.audio);
        let output_path = scratch.output_path(&target.output);

        self.fetch(request_id, &target.image, &image_path).await?;
        self.fetch(request_id, &target.audio, &audio_path).await?;

        self.encoder.check_available().await?;

        tracing::info!(request_id = %request_id, output = %target.output, "Encoding video");
        self.encoder
            .compose_still(&image_path, &audio_path, &output_path)
            .await?;

        let location = self
            .storage
            .upload_from_file(target.output.as_str(), &output_path, OUTPUT_CONTENT_TYPE)
            .await
            .map_err(|e| AppError::StorageUpload(format!("{}: {}", target.output, e)))?;

        if let Err(e) = scratch.close() {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to remove scratch directory");
        }

        tracing::info!(
            request_id = %request_id,
            output = %location,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video created"
        );

        Ok(location)
    }

    async fn fetch(&self, request_id: &str, name: &BlobName, dest: &Path) -> Result<(), AppError> {
        let size = self
            .storage
            .download_to_file(name.as_str(), dest)
            .await
            .map_err(|e| AppError::StorageFetch(format!("{}: {}", name, e)))?;

        tracing::info!(
            request_id = %request_id,
            key = %name,
            size_bytes = size,
            "Downloaded input"
        );
        Ok(())
    }
}
