//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use freddo_core::config::ServerConfig;
use freddo_core::error::FreddoError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// CORS is open to any origin; the frontend is served from elsewhere.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/random-recipes", get(handlers::random_recipes))
        .route("/images/{filename}", get(handlers::serve_image))
        .route("/test", get(handlers::test))
        .route(
            "/sessions/{key}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `host:port` and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), FreddoError> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FreddoError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| FreddoError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
