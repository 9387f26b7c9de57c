//! Composition request and response models.
//!
//! A request names three blobs by reference (a `gs://` URL, any other URL, or a
//! bare blob name). Only the final `/`-separated segment of each reference is
//! used: it is the blob key in the bucket and the file name in scratch space.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::constants::{COMPOSITION_SUCCESS_MESSAGE, MISSING_PARAMETERS_MESSAGE};
use crate::error::AppError;

/// Final path segment of a blob reference.
///
/// `gs://bucket/a/b/c.png`, `a/b/c.png` and `c.png` all yield `c.png`.
/// Applying it to its own output returns the same value.
pub fn basename(reference: &str) -> &str {
    match reference.rfind('/') {
        Some(idx) => &reference[idx + 1..],
        None => reference,
    }
}

/// Blob key derived from a reference. Always a single, non-empty path
/// segment that is safe to join onto a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobName(String);

impl BlobName {
    /// Derive the blob key from a reference, or `None` when the reference has
    /// no usable final segment (`gs://bucket/`, `..`).
    pub fn from_reference(reference: &str) -> Option<Self> {
        match basename(reference) {
            "" | "." | ".." => None,
            name => Some(BlobName(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /process`.
///
/// Fields are optional at the serde level so a missing field surfaces as the
/// same validation error as an empty one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct CompositionRequest {
    /// Reference to the still image (e.g. `gs://bucket/cover.png`)
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub image: Option<String>,
    /// Reference to the audio track (e.g. `gs://bucket/track.mp3`)
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub audio: Option<String>,
    /// Reference naming the output video (e.g. `gs://bucket/video.mp4`)
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub output: Option<String>,
}

/// Validated blob keys for one composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionTarget {
    pub image: BlobName,
    pub audio: BlobName,
    pub output: BlobName,
}

impl CompositionRequest {
    /// Reduce the three references to blob keys. Performs no I/O.
    ///
    /// Run after [`Validate::validate`]. A reference whose final segment
    /// cannot name a blob (`gs://bucket/`, `..`) can never be fetched, so it
    /// fails as a fetch error rather than a validation error.
    pub fn target(&self) -> Result<CompositionTarget, AppError> {
        Ok(CompositionTarget {
            image: blob_name("image", self.image.as_deref())?,
            audio: blob_name("audio", self.audio.as_deref())?,
            output: blob_name("output", self.output.as_deref())?,
        })
    }
}

fn blob_name(field: &str, reference: Option<&str>) -> Result<BlobName, AppError> {
    let reference = reference
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(MISSING_PARAMETERS_MESSAGE.to_string()))?;

    BlobName::from_reference(reference).ok_or_else(|| {
        AppError::StorageFetch(format!(
            "Parameter '{}' does not name a blob: '{}'",
            field, reference
        ))
    })
}

/// Body of a successful `POST /process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompositionResponse {
    pub message: String,
    /// Fully-qualified location of the uploaded video (e.g. `gs://bucket/video.mp4`)
    pub output: String,
}

impl CompositionResponse {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            message: COMPOSITION_SUCCESS_MESSAGE.to_string(),
            output: output.into(),
        }
    }
}
