//! Domain models

pub mod composition;

pub use composition::{basename, BlobName, CompositionRequest, CompositionResponse, CompositionTarget};
