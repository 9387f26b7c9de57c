//! Stillcast Storage Library
//!
//! Blob store abstraction used by the composition pipeline: fetch a blob into
//! a local file, store a local file as a blob. Backends are Google Cloud
//! Storage (through `object_store`) and a local directory.
//!
//! # Storage key format
//!
//! Keys are flat blob names inside one bucket (the basename of a request
//! reference). Keys must not be empty, start with `/` or have a `..` segment; see the
//! `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-gcs")]
pub mod gcs;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-gcs")]
pub use gcs::GcsStorage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use stillcast_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
