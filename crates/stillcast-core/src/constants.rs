//! Fixed values of the composition contract.

/// Plain-text banner returned by the liveness check.
pub const LIVENESS_BANNER: &str = "🚀 Video Editor API is Running!";

/// Message returned alongside the output location on success.
pub const COMPOSITION_SUCCESS_MESSAGE: &str = "Video created successfully!";

/// Message returned when a composition field is missing or empty.
pub const MISSING_PARAMETERS_MESSAGE: &str =
    "Parameters 'image', 'audio', and 'output' are required!";

/// Bucket used when `GCS_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "your_bucket_name_here";

/// Prefix of every per-request scratch directory.
pub const SCRATCH_DIR_PREFIX: &str = "stillcast-";

/// Content type recorded for uploaded compositions.
pub const OUTPUT_CONTENT_TYPE: &str = "video/mp4";
