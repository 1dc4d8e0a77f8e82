//! Application state shared by all handlers

use kanji_core::Config;
use kanji_processing::{UploadScratch, UploadValidator};
use kanji_providers::ProviderRegistry;

/// Everything a request handler needs. Handlers hold no state of their own.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub validator: UploadValidator,
    pub scratch: UploadScratch,
    pub providers: ProviderRegistry,
}

impl AppState {
    pub fn new(config: Config, scratch: UploadScratch, providers: ProviderRegistry) -> Self {
        Self {
            validator: UploadValidator::from_config(&config.upload),
            config,
            scratch,
            providers,
        }
    }
}
