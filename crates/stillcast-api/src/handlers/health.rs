//! Liveness and readiness handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stillcast_core::constants::LIVENESS_BANNER;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_CHECK_KEY: &str = "health-check-non-existent-key";

/// Run an async check with timeout; returns "healthy", "timeout" or "unhealthy: {error}".
async fn run_check<F, E>(f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(CHECK_TIMEOUT, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("unhealthy: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EncoderSlotsReport {
    pub capacity: usize,
    pub available: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `healthy` when every check passed, otherwise `unhealthy`
    pub status: String,
    pub storage: String,
    pub encoder: String,
    pub storage_backend: String,
    pub bucket: String,
    pub encoder_slots: EncoderSlotsReport,
}

/// Liveness check. Touches neither storage nor the encoder.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = String, content_type = "text/plain")
    )
)]
pub async fn liveness() -> &'static str {
    LIVENESS_BANNER
}

/// Readiness check: blob store reachable and encoder runnable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies healthy", body = ReadinessResponse),
        (status = 503, description = "A dependency is unhealthy", body = ReadinessResponse)
    )
)]
pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.storage.clone();
    let encoder = state.encoder.clone();

    let (storage_status, encoder_status) = tokio::join!(
        run_check(async move { storage.exists(HEALTH_CHECK_KEY).await.map(drop) }),
        run_check(async move { encoder.check_available().await }),
    );

    let healthy = storage_status == "healthy" && encoder_status == "healthy";
    if !healthy {
        tracing::warn!(
            storage = %storage_status,
            encoder = %encoder_status,
            "Readiness check failed"
        );
    }

    let slots = state.composition.slots();
    let response = ReadinessResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        storage: storage_status,
        encoder: encoder_status,
        storage_backend: state.storage.backend_type().to_string(),
        bucket: state.storage.bucket().to_string(),
        encoder_slots: EncoderSlotsReport {
            capacity: slots.capacity(),
            available: slots.available(),
        },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
