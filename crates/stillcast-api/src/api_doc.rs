//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use stillcast_core::{CompositionRequest, CompositionResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stillcast API",
        version = "0.1.0",
        description = "Composes a still image and an audio track stored in a blob bucket into an H.264/AAC video and stores the result in the same bucket."
    ),
    paths(
        handlers::health::liveness,
        handlers::health::readiness,
        handlers::compose::process,
    ),
    components(
        schemas(
            CompositionRequest,
            CompositionResponse,
            ErrorResponse,
            handlers::health::ReadinessResponse,
            handlers::health::EncoderSlotsReport,
        )
    ),
    tags(
        (name = "composition", description = "Still-image video composition"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let spec = ApiDoc::openapi();
        for path in ["/", "/health", "/process"] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
