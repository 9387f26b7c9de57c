//! External encoder invocation.
//!
//! The encoder is an opaque command-line tool. Two invocations are used: a
//! version check that must exit zero, and a single composition run with the
//! fixed still-image template from [`still_image_args`].

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use stillcast_core::AppError;
use thiserror::Error;
use tokio::process::Command;

/// Lines of encoder stderr kept in failure messages.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum EncoderError {
    /// Binary missing, not executable, or the version check failed
    #[error("{0}")]
    Unavailable(String),

    /// Composition run failed or produced no output
    #[error("{0}")]
    Failed(String),
}

impl From<EncoderError> for AppError {
    fn from(err: EncoderError) -> Self {
        match err {
            EncoderError::Unavailable(msg) => AppError::EncoderUnavailable(msg),
            EncoderError::Failed(msg) => AppError::EncodingFailed(msg),
        }
    }
}

/// Media encoder used by the composition pipeline.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Confirm the encoder can be run at all.
    async fn check_available(&self) -> Result<(), EncoderError>;

    /// Loop `image` as a single frame over `audio` and write the video to `output`.
    async fn compose_still(
        &self,
        image: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), EncoderError>;
}

/// Arguments for the still-image composition.
///
/// H.264 tuned for still images, AAC audio at 192k, yuv420p, and output
/// length cut to the shorter stream (the audio, since the image loops).
pub fn still_image_args(image: &Path, audio: &Path, output: &Path) -> Vec<String> {
    vec![
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        image.to_string_lossy().to_string(),
        "-i".to_string(),
        audio.to_string_lossy().to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-tune".to_string(),
        "stillimage".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-shortest".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Last lines of a process's stderr, for error messages.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// [`MediaEncoder`] backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: String,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn check_available(&self) -> Result<(), EncoderError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EncoderError::Unavailable(format!("{}: {}", self.ffmpeg_path, e)))?;

        if !output.status.success() {
            return Err(EncoderError::Unavailable(format!(
                "{} -version exited with {}: {}",
                self.ffmpeg_path,
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        tracing::debug!(ffmpeg_path = %self.ffmpeg_path, "FFmpeg is installed and working");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(ffmpeg_path = %self.ffmpeg_path))]
    async fn compose_still(
        &self,
        image: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), EncoderError> {
        let args = still_image_args(image, audio, output);
        let start = std::time::Instant::now();

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EncoderError::Failed(format!("Failed to execute ffmpeg: {}", e)))?;

        if !result.status.success() {
            return Err(EncoderError::Failed(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr_tail(&result.stderr)
            )));
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(EncoderError::Failed(format!(
                "ffmpeg exited successfully but wrote no file at {}",
                output.display()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FFmpeg composition finished"
        );
        Ok(())
    }
}
