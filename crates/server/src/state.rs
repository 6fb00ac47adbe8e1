use opusgate_core::{Authenticator, Config, ConversionService};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    conversions: ConversionService,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        conversions: ConversionService,
    ) -> Self {
        Self {
            config,
            authenticator,
            conversions,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn conversions(&self) -> &ConversionService {
        &self.conversions
    }
}
