//! Application state shared across all route handlers.

use std::sync::Arc;

use freddo_chat::ChatOrchestrator;
use freddo_core::config::FreddoConfig;
use freddo_storage::ImageStore;

/// Shared application state.
///
/// All fields use `Arc` so the state clones cheaply into handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<FreddoConfig>,
    /// Chat engine holding every session.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Recipe image collection.
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(
        config: FreddoConfig,
        orchestrator: Arc<ChatOrchestrator>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
            images,
        }
    }
}
