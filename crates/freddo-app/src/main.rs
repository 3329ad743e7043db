//! Freddo backend binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Build the tool-calling agent and the image store
//! 3. Start the idle-session sweeper
//! 4. Start the axum HTTP server

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use freddo_agent::ToolCallingAgent;
use freddo_api::state::AppState;
use freddo_api::start_server;
use freddo_chat::{spawn_session_sweeper, ChatOrchestrator, OrchestratorConfig, RecipeCatalog};
use freddo_core::config::FreddoConfig;
use freddo_storage::FsImageStore;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = FreddoConfig::load_or_default(&config_file);
    config.server.port = args.resolve_port(config.server.port);

    // Tracing. RUST_LOG wins over the configured level.
    let level = args.resolve_log_level(&config.server.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Freddo v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Agent.
    let agent = ToolCallingAgent::from_config(&config)?;
    tracing::info!(
        endpoint = %config.agent.endpoint,
        model = %config.agent.model,
        toolbox = %config.toolbox.url,
        "Agent ready"
    );

    // Conversation core.
    let catalog = if config.chat.recipes.is_empty() {
        RecipeCatalog::default()
    } else {
        RecipeCatalog::new(config.chat.recipes.iter().cloned())
    };
    tracing::info!(recipes = catalog.len(), "Recipe catalog loaded");

    let orchestrator = Arc::new(ChatOrchestrator::new(
        catalog,
        Arc::new(agent),
        OrchestratorConfig::from_config(&config),
    ));

    // Images.
    let images = FsImageStore::from_config(&config.images);
    tracing::info!(root = %images.root().display(), "Image store ready");

    // === Background tasks ===

    if config.chat.session_ttl_secs > 0 && config.chat.sweep_interval_secs > 0 {
        spawn_session_sweeper(
            Arc::clone(&orchestrator),
            Duration::from_secs(config.chat.sweep_interval_secs),
        );
    } else {
        tracing::info!("Session expiry disabled; sweeper not started");
    }

    // === HTTP server ===

    let server_config = config.server.clone();
    let state = AppState::new(config, orchestrator, Arc::new(images));

    if let Err(e) = start_server(&server_config, state).await {
        tracing::error!(
            host = %server_config.host,
            port = server_config.port,
            error = %e,
            "HTTP server stopped"
        );
        tracing::error!("Try: PORT={} freddo", server_config.port.saturating_add(1));
        return Err(e.into());
    }

    Ok(())
}
