//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; any [`AppError`] converts with `?`
//! and renders as an [`ErrorResponse`] with the status from its metadata.
//! Whether `details` survive to the client is decided by
//! [`crate::middleware::error_details_middleware`] from the loaded config.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use stillcast_core::{AppError, ErrorMetadata, LogLevel};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable failure message
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error kind (e.g. `STORAGE_FETCH_ERROR`)
    pub code: String,
    /// Whether retrying the same request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper so `IntoResponse` can be implemented for the core error type.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Malformed or mistyped JSON bodies are validation failures; a body over the
/// configured limit is its own kind.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(rejection.body_text()));
        }
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Invalid request body: expected Content-Type: application/json".to_string()
            }
            other => format!("Invalid request body: {}", other.body_text()),
        };
        HttpAppError(AppError::InvalidInput(message))
    }
}

/// JSON body extractor that rejects with the standard [`ErrorResponse`] shape.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, code, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type,
                code,
                "Request failed"
            );
        }
    }
}

impl ErrorResponse {
    pub(crate) fn from_app_error(error: &AppError, include_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: include_details.then(|| error.detailed_message()),
            error_type: include_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }

    /// Same response with `details` and `error_type` removed.
    pub(crate) fn without_details(self) -> Self {
        Self {
            details: None,
            error_type: None,
            ..self
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, !app_error.is_sensitive());

        // Kept on the response so the error-details layer can re-render it
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}
