//! Application state shared by all handlers.

use std::sync::Arc;
use std::time::Duration;

use stillcast_core::Config;
use stillcast_processing::{CompositionService, EncoderSlots, MediaEncoder};
use stillcast_storage::Storage;

/// Collaborators are built once at startup and injected here, so tests can
/// swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub encoder: Arc<dyn MediaEncoder>,
    pub composition: CompositionService,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn Storage>, encoder: Arc<dyn MediaEncoder>) -> Self {
        let slots = EncoderSlots::new(
            config.max_concurrent_encodes(),
            Duration::from_secs(config.encoder_queue_timeout_secs()),
        );
        let composition = CompositionService::new(
            storage.clone(),
            encoder.clone(),
            slots,
            config.scratch_dir().clone(),
        );

        Self {
            config,
            storage,
            encoder,
            composition,
        }
    }
}
