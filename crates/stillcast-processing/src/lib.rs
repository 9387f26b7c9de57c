//! Stillcast Processing Library
//!
//! The composition pipeline: fetch a still image and an audio track from the
//! blob store into per-request scratch space, run the external encoder, store
//! the resulting video.

pub mod admission;
pub mod composition;
pub mod encoder;
pub mod scratch;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use admission::EncoderSlots;
pub use composition::CompositionService;
pub use encoder::{still_image_args, EncoderError, FfmpegEncoder, MediaEncoder};
pub use scratch::ScratchSpace;
