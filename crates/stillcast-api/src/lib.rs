//! Stillcast API Library
//!
//! HTTP surface of the composition service: routes, handlers, middleware and
//! application setup.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;
