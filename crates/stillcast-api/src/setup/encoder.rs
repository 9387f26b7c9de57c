//! Encoder setup

use std::sync::Arc;
use stillcast_core::Config;
use stillcast_processing::{FfmpegEncoder, MediaEncoder};

/// Build the ffmpeg-backed encoder.
///
/// A failed startup check is only logged: every composition checks again and
/// reports the failure to its caller.
pub async fn setup_encoder(config: &Config) -> Arc<dyn MediaEncoder> {
    let encoder = FfmpegEncoder::new(config.ffmpeg_path());

    match encoder.check_available().await {
        Ok(()) => tracing::info!(ffmpeg_path = %config.ffmpeg_path(), "FFmpeg available"),
        Err(e) => tracing::warn!(
            ffmpeg_path = %config.ffmpeg_path(),
            error = %e,
            "FFmpeg availability check failed at startup; compositions will fail until it is installed"
        ),
    }

    Arc::new(encoder)
}
