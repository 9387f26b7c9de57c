//! Production gate for error `details`.
//!
//! [`crate::error::HttpAppError`] always renders what is safe outside
//! production and attaches its [`ErrorResponse`] as a response extension.
//! This layer drops that extension and, in production, re-renders the body
//! without `details` or `error_type`.

use crate::error::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Whether error responses carry diagnostic details.
#[derive(Debug, Clone, Copy)]
pub struct ErrorDetailsPolicy {
    pub hide_details: bool,
}

impl ErrorDetailsPolicy {
    pub fn new(is_production: bool) -> Self {
        Self {
            hide_details: is_production,
        }
    }
}

pub async fn error_details_middleware(
    State(policy): State<ErrorDetailsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(body) = response.extensions_mut().remove::<ErrorResponse>() else {
        return response;
    };
    if !policy.hide_details {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let rendered = Json(body.without_details()).into_response();
    Response::from_parts(parts, rendered.into_body())
}
