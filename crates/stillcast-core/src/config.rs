//! Configuration module
//!
//! Settings are read once at startup from the environment (a `.env` file is
//! honoured in development) and passed down explicitly; nothing below reads the
//! environment again.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::DEFAULT_BUCKET;
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const MAX_CONCURRENT_ENCODES: usize = 2;
const ENCODER_QUEUE_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub log_format: LogFormat,
    pub max_request_body_bytes: usize,
}

/// Composition service configuration
#[derive(Clone, Debug)]
pub struct CompositionConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub gcs_bucket: String,
    pub local_storage_path: Option<PathBuf>,
    // Encoder configuration
    pub ffmpeg_path: String,
    pub scratch_dir: PathBuf,
    pub max_concurrent_encodes: usize,
    pub encoder_queue_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<CompositionConfig>);

impl Config {
    fn as_composition(&self) -> &CompositionConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = CompositionConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_composition().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_composition().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.as_composition().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_composition().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_composition().base.log_format
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.as_composition().base.max_request_body_bytes
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_composition().storage_backend
    }

    pub fn gcs_bucket(&self) -> &str {
        &self.as_composition().gcs_bucket
    }

    pub fn local_storage_path(&self) -> Option<&PathBuf> {
        self.as_composition().local_storage_path.as_ref()
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_composition().ffmpeg_path
    }

    pub fn scratch_dir(&self) -> &PathBuf {
        &self.as_composition().scratch_dir
    }

    pub fn max_concurrent_encodes(&self) -> usize {
        self.as_composition().max_concurrent_encodes
    }

    pub fn encoder_queue_timeout_secs(&self) -> u64 {
        self.as_composition().encoder_queue_timeout_secs
    }
}

impl CompositionConfig {
    /// Build the configuration from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match non_empty("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let log_format = match non_empty("LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => LogFormat::Text,
        };

        let max_request_body_bytes = non_empty("MAX_REQUEST_BODY_BYTES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(MAX_REQUEST_BODY_BYTES);

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(backend) => backend.parse()?,
            None => StorageBackend::Gcs,
        };

        let max_concurrent_encodes = non_empty("MAX_CONCURRENT_ENCODES")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(MAX_CONCURRENT_ENCODES)
            .max(1);

        let encoder_queue_timeout_secs = non_empty("ENCODER_QUEUE_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(ENCODER_QUEUE_TIMEOUT_SECS);

        Ok(CompositionConfig {
            base: BaseConfig {
                server_port,
                environment,
                log_format,
                max_request_body_bytes,
            },
            storage_backend,
            gcs_bucket: non_empty("GCS_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH").map(PathBuf::from),
            ffmpeg_path: non_empty("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            scratch_dir: non_empty("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_concurrent_encodes,
            encoder_queue_timeout_secs,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.gcs_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("GCS_BUCKET cannot be empty"));
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=local requires LOCAL_STORAGE_PATH to be set"
            ));
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH cannot be empty"));
        }

        if self.base.max_request_body_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_REQUEST_BODY_BYTES cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CompositionConfig, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CompositionConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.base.server_port, 8080);
        assert_eq!(config.base.environment, "development");
        assert_eq!(config.base.log_format, LogFormat::Text);
        assert_eq!(config.storage_backend, StorageBackend::Gcs);
        assert_eq!(config.gcs_bucket, DEFAULT_BUCKET);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.max_concurrent_encodes, 2);
        assert_eq!(config.encoder_queue_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_from_env() {
        let config = config_from(&[("PORT", "9090")]).unwrap();
        assert_eq!(config.base.server_port, 9090);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("PORT", "http")]).is_err());
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", ""), ("GCS_BUCKET", "  ")]).unwrap();
        assert_eq!(config.base.server_port, 8080);
        assert_eq!(config.gcs_bucket, DEFAULT_BUCKET);
    }

    #[test]
    fn test_encoder_limit_has_floor_of_one() {
        let config = config_from(&[("MAX_CONCURRENT_ENCODES", "0")]).unwrap();
        assert_eq!(config.max_concurrent_encodes, 1);
    }

    #[test]
    fn test_local_backend_requires_path() {
        let config = config_from(&[("STORAGE_BACKEND", "local")]).unwrap();
        assert!(config.validate().is_err());

        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/var/lib/stillcast"),
        ])
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_detection() {
        let config = Config(Box::new(config_from(&[("APP_ENV", "Prod")]).unwrap()));
        assert!(config.is_production());

        let config = Config(Box::new(config_from(&[]).unwrap()));
        assert!(!config.is_production());
    }

    #[test]
    fn test_json_log_format() {
        let config = config_from(&[("LOG_FORMAT", "json")]).unwrap();
        assert_eq!(config.base.log_format, LogFormat::Json);
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
