//! Route configuration and setup.

use crate::handlers::{compose, health};
use crate::middleware::{
    error_details_middleware, request_id_middleware, ErrorDetailsPolicy, RequestId,
};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use stillcast_core::Config;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    tracing::info!(
        max_request_body_bytes = config.max_request_body_bytes(),
        "Request body limit enabled"
    );

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/", get(health::liveness))
        .route("/health", get(health::readiness))
        .route("/process", post(compose::process))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
        .merge(RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(
            ServiceBuilder::new()
                // Outermost first: the request id must exist before the span is made
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(trace_layer)
                .layer(axum::middleware::from_fn_with_state(
                    ErrorDetailsPolicy::new(config.is_production()),
                    error_details_middleware,
                ))
                .layer(DefaultBodyLimit::max(config.max_request_body_bytes())),
        )
        .with_state(state)
}
