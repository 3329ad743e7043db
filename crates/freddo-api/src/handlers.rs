//! Route handler functions for all API endpoints.

use std::collections::BTreeSet;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use freddo_chat::{ChatReply, Session, TurnOutcome};
use freddo_storage::{content_type_for, file_stem, is_png};

use crate::error::{ApiError, NO_MESSAGE};
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeCard {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeCard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

// =============================================================================
// Chat
// =============================================================================

/// POST /chat - run one conversational turn.
///
/// The body is parsed by hand so that anything other than a JSON object with
/// a non-empty `message` string is a 400 with the same error body.
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request: ChatRequest = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) if value.is_object() => serde_json::from_value(value).map_err(|e| {
            tracing::warn!(error = %e, "Malformed chat request");
            ApiError::BadRequest(NO_MESSAGE.to_string())
        })?,
        _ => {
            tracing::warn!("Chat request body is not a JSON object");
            return Err(ApiError::BadRequest(NO_MESSAGE.to_string()));
        }
    };

    let Some(message) = request.message.filter(|m| !m.trim().is_empty()) else {
        tracing::warn!("No message provided in request");
        return Err(ApiError::BadRequest(NO_MESSAGE.to_string()));
    };

    let session_id = request
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config.chat.default_session_key.clone());

    tracing::info!(session = %session_id, chars = message.chars().count(), "Processing message");
    let reply: ChatReply = state.orchestrator.handle(&session_id, &message).await?;

    if let TurnOutcome::UpstreamFailed { detail } = &reply.outcome {
        tracing::error!(session = %session_id, %detail, "Agent error");
    }

    Ok(Json(ChatResponse {
        response: reply.text,
        status: "success".to_string(),
        session_id,
    }))
}

// =============================================================================
// Images
// =============================================================================

/// GET /random-recipes - a random sample of recipe images.
pub async fn random_recipes(
    State(state): State<AppState>,
) -> Result<Json<RecipesResponse>, ApiError> {
    let names = state.images.list_images().await.map_err(|e| {
        tracing::error!(error = %e, "Error getting recipes");
        ApiError::Internal(e.to_string())
    })?;

    let pngs: Vec<String> = names
        .into_iter()
        .filter(|n| is_png(n))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if pngs.is_empty() {
        return Err(ApiError::NotFound("No images found".to_string()));
    }

    let sample_size = state.config.images.sample_size.max(1);
    let recipes = pngs
        .choose_multiple(&mut rand::rng(), sample_size)
        .map(|image| RecipeCard {
            name: file_stem(image).to_string(),
            image: image.clone(),
        })
        .collect();

    Ok(Json(RecipesResponse { recipes }))
}

/// GET /images/{filename} - raw image bytes.
pub async fn serve_image(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match state.images.fetch(&filename).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(&filename))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(image = %filename, error = %e, "Error serving image");
            (StatusCode::NOT_FOUND, "Image not found").into_response()
        }
    }
}

// =============================================================================
// Probe
// =============================================================================

/// GET /test - liveness probe.
pub async fn test() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Backend is running".to_string(),
    })
}

// =============================================================================
// Sessions
// =============================================================================

/// GET /sessions/{key} - history and context of one session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .orchestrator
        .snapshot(&key)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {key}")))
}

/// DELETE /sessions/{key} - forget a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.reset(&key)?;
    tracing::info!(session = %key, "Session reset");
    Ok(StatusCode::NO_CONTENT)
}
