//! Freddo API crate - axum HTTP server and route handlers.
//!
//! Exposes the chat endpoint used by the web frontend, the recipe image
//! gallery, a liveness probe and session inspection.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
