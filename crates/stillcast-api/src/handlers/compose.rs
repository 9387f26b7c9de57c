use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::middleware::RequestId;
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use stillcast_core::{CompositionRequest, CompositionResponse};
use validator::Validate;

/// Compose a still image and an audio track into a video.
///
/// Each reference is reduced to its final `/` segment and looked up in the
/// configured bucket; the video is stored under the output's final segment.
#[utoipa::path(
    post,
    path = "/process",
    tag = "composition",
    request_body = CompositionRequest,
    responses(
        (status = 200, description = "Video created and stored", body = CompositionResponse),
        (status = 400, description = "Missing, empty or malformed parameters", body = ErrorResponse),
        (status = 413, description = "Request body exceeds the configured limit", body = ErrorResponse),
        (status = 500, description = "Fetch, encode or upload failed, or a reference names no blob", body = ErrorResponse),
        (status = 503, description = "All encoder slots busy", body = ErrorResponse)
    )
)]
pub async fn process(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    ValidatedJson(request): ValidatedJson<CompositionRequest>,
) -> Result<Json<CompositionResponse>, HttpAppError> {
    request.validate()?;
    let target = request.target()?;

    tracing::info!(
        request_id = %request_id.as_str(),
        image = %target.image,
        audio = %target.audio,
        output = %target.output,
        "Composition requested"
    );

    let location = state
        .composition
        .compose(request_id.as_str(), &target)
        .await?;

    Ok(Json(CompositionResponse::new(location)))
}
