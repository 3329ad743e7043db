//! Integration tests for the Freddo API.
//!
//! Every test builds its own router over an in-memory image store and a
//! scripted agent, and drives it with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use freddo_api::create_router;
use freddo_api::handlers::{ChatResponse, RecipesResponse};
use freddo_api::state::AppState;
use freddo_chat::{
    AgentClient, AgentError, ChatOrchestrator, OrchestratorConfig, RecipeCatalog, Role, Turn,
};
use freddo_core::config::FreddoConfig;
use freddo_storage::{ImageStore, MemoryImageStore, StorageError};

// =============================================================================
// Helpers
// =============================================================================

/// Replies with the last user turn and the number of turns it received.
struct EchoAgent;

#[async_trait]
impl AgentClient for EchoAgent {
    async fn complete(&self, _key: &str, messages: &[Turn]) -> Result<String, AgentError> {
        let last = messages
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.clone())
            .unwrap_or_default();
        Ok(format!("echo({}): {}", messages.len(), last))
    }
}

struct FailingAgent;

#[async_trait]
impl AgentClient for FailingAgent {
    async fn complete(&self, _key: &str, _messages: &[Turn]) -> Result<String, AgentError> {
        Err(AgentError::Transport("connection refused".to_string()))
    }
}

/// Answers normally until its toolbox goes away.
#[derive(Default)]
struct ToolboxBackedAgent {
    toolbox_down: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl AgentClient for ToolboxBackedAgent {
    async fn prepare(&self) -> Result<(), AgentError> {
        if self.toolbox_down.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(AgentError::Toolbox(
                "failed to load toolset: connection refused".to_string(),
            ));
        }
        Ok(())
    }

    async fn complete(&self, _key: &str, _messages: &[Turn]) -> Result<String, AgentError> {
        Ok("Hello Maria!".to_string())
    }
}

struct BrokenImages;

#[async_trait]
impl ImageStore for BrokenImages {
    async fn list_images(&self) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "bucket unavailable",
        )))
    }

    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::NotFound(name.to_string()))
    }
}

fn gallery() -> MemoryImageStore {
    MemoryImageStore::with_images([
        ("Pizza.png", b"pizza".to_vec()),
        ("Lasagna.png", b"lasagna".to_vec()),
        ("Tiramisu.jpg", b"tiramisu".to_vec()),
        ("notes.txt", b"text".to_vec()),
    ])
}

fn make_state_with(agent: Arc<dyn AgentClient>, images: Arc<dyn ImageStore>) -> AppState {
    let config = FreddoConfig::default();
    let orchestrator = ChatOrchestrator::new(
        RecipeCatalog::default(),
        agent,
        OrchestratorConfig::from_config(&config),
    );
    AppState::new(config, Arc::new(orchestrator), images)
}

fn make_state() -> AppState {
    make_state_with(Arc::new(EchoAgent), Arc::new(gallery()))
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// Read full response body bytes.
async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// /test
// =============================================================================

#[tokio::test]
async fn test_probe() {
    let app = create_router(make_state());
    let resp = app.oneshot(get("/test")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "Backend is running");
}

// =============================================================================
// /chat
// =============================================================================

#[tokio::test]
async fn test_chat_happy_path_uses_default_session() {
    let app = create_router(make_state());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "Hi, I'm Maria"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let chat: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(chat.status, "success");
    assert_eq!(chat.session_id, "user-thread-1");
    assert_eq!(chat.response, "echo(2): Hi, I'm Maria");
}

#[tokio::test]
async fn test_chat_history_accumulates_per_session() {
    let state = make_state();

    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "one", "session_id": "a"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "two", "session_id": "a"}"#))
        .await
        .unwrap();
    let json = body_json(resp).await;
    // system, user, assistant, user
    assert_eq!(json["response"], "echo(4): two");

    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "fresh", "session_id": "b"}"#))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["response"], "echo(2): fresh");
    assert_eq!(json["session_id"], "b");
}

#[tokio::test]
async fn test_chat_missing_message_is_400() {
    for body in [
        "{}",
        r#"{"message": ""}"#,
        r#"{"message": "   "}"#,
        r#"{"message": 42}"#,
        "[]",
        "not json",
        "",
    ] {
        let app = create_router(make_state());
        let resp = app.oneshot(post_json("/chat", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body:?}");
        let json = body_json(resp).await;
        assert_eq!(json["error"], "No message provided");
    }
}

#[tokio::test]
async fn test_chat_rejected_message_creates_no_session() {
    let state = make_state();
    let app = create_router(state.clone());
    let resp = app.oneshot(post_json("/chat", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.orchestrator.session_count(), 0);
}

#[tokio::test]
async fn test_chat_too_long_is_400() {
    let long = "a".repeat(5000);
    let app = create_router(make_state());
    let resp = app
        .oneshot(post_json("/chat", &format!(r#"{{"message": "{long}"}}"#)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("maximum length"));
}

#[tokio::test]
async fn test_chat_agent_failure_is_apology() {
    let state = make_state_with(Arc::new(FailingAgent), Arc::new(gallery()));
    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "success");
    let text = json["response"].as_str().unwrap();
    assert!(text.starts_with("Sorry, I encountered an error: "));
    assert!(text.contains("connection refused"));

    // The user turn is kept, no assistant turn is added.
    let session = state.orchestrator.snapshot("user-thread-1").await.unwrap();
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn test_chat_agent_unavailable_is_500_and_leaves_session_alone() {
    let agent = Arc::new(ToolboxBackedAgent::default());
    let state = make_state_with(agent.clone(), Arc::new(gallery()));

    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "Hi", "session_id": "s"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    agent
        .toolbox_down
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "again", "session_id": "s"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "error");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("failed to load toolset"));

    let session = state.orchestrator.snapshot("s").await.unwrap();
    assert_eq!(session.history.len(), 3);

    let app = create_router(state.clone());
    let resp = app
        .oneshot(post_json("/chat", r#"{"message": "Hi", "session_id": "new"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.orchestrator.snapshot("new").await.is_none());
    assert_eq!(state.orchestrator.session_count(), 1);
}

// =============================================================================
// /random-recipes
// =============================================================================

#[tokio::test]
async fn test_random_recipes_only_png() {
    let app = create_router(make_state());
    let resp = app.oneshot(get("/random-recipes")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: RecipesResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    let mut names: Vec<&str> = body.recipes.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Lasagna", "Pizza"]);
    for card in &body.recipes {
        assert_eq!(card.image, format!("{}.png", card.name));
    }
}

#[tokio::test]
async fn test_random_recipes_capped_at_sample_size() {
    let images = MemoryImageStore::new();
    for i in 0..25 {
        images.insert(format!("Recipe{i}.png"), vec![0]);
    }
    let app = create_router(make_state_with(Arc::new(EchoAgent), Arc::new(images)));
    let resp = app.oneshot(get("/random-recipes")).await.unwrap();
    let body: RecipesResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.recipes.len(), 10);

    let mut images: Vec<&str> = body.recipes.iter().map(|r| r.image.as_str()).collect();
    images.sort();
    images.dedup();
    assert_eq!(images.len(), 10);
}

#[tokio::test]
async fn test_random_recipes_empty_is_404() {
    let app = create_router(make_state_with(
        Arc::new(EchoAgent),
        Arc::new(MemoryImageStore::with_images([("menu.txt", vec![1])])),
    ));
    let resp = app.oneshot(get("/random-recipes")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "No images found");
}

#[tokio::test]
async fn test_random_recipes_storage_failure_is_500() {
    let app = create_router(make_state_with(Arc::new(EchoAgent), Arc::new(BrokenImages)));
    let resp = app.oneshot(get("/random-recipes")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("bucket unavailable"));
}

// =============================================================================
// /images/{filename}
// =============================================================================

#[tokio::test]
async fn test_serve_image() {
    let app = create_router(make_state());
    let resp = app.oneshot(get("/images/Pizza.png")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(body_bytes(resp).await, b"pizza");

    let app = create_router(make_state());
    let resp = app.oneshot(get("/images/Tiramisu.jpg")).await.unwrap();
    assert_eq!(resp.headers()["content-type"], "image/jpeg");
}

#[tokio::test]
async fn test_serve_image_missing_is_plain_404() {
    let app = create_router(make_state());
    let resp = app.oneshot(get("/images/Tacos.png")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_bytes(resp).await, b"Image not found");
}

#[tokio::test]
async fn test_serve_image_traversal_is_404() {
    let app = create_router(make_state());
    let resp = app.oneshot(get("/images/..%2Fsecret.png")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// /sessions/{key}
// =============================================================================

#[tokio::test]
async fn test_session_snapshot_and_delete() {
    let state = make_state();

    let app = create_router(state.clone());
    app.oneshot(post_json(
        "/chat",
        r#"{"message": "Show me the recipe for Tiramisu", "session_id": "s1"}"#,
    ))
    .await
    .unwrap();

    let app = create_router(state.clone());
    let resp = app.oneshot(get("/sessions/s1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["key"], "s1");
    assert_eq!(json["history"].as_array().unwrap().len(), 3);
    assert_eq!(json["context"]["current_recipe"], "Tiramisu");

    let app = create_router(state.clone());
    let resp = app
        .oneshot(Request::delete("/sessions/s1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let app = create_router(state.clone());
    let resp = app.oneshot(get("/sessions/s1")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let app = create_router(state);
    let resp = app
        .oneshot(Request::delete("/sessions/s1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = create_router(make_state());
    let resp = app
        .oneshot(
            Request::get("/test")
                .header("origin", "http://frontend.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}
