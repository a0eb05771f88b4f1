//! In-memory stand-in for the media studio backend.
//!
//! Serves the gateway (`/api/v1/newapi/*`) and TTS (`/api/v1/tts/*`) routes
//! with canned synthesis and a stats table kept in memory, so the client can be
//! exercised end to end without real AI providers.

pub mod gateway;
pub mod tts;

use std::{path::PathBuf, sync::Arc};

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub use gateway::{GatewayConfig, GatewayState, GenerationResult, LoadBalancerConfig, Provider, ProviderStats};
pub use tts::{TtsBatchResponse, TtsGenerateResponse, TtsVoice};

pub const DEFAULT_OUTPUT_DIR: &str = "./data";

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<RwLock<GatewayState>>,
    pub output_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            gateway: Arc::new(RwLock::new(GatewayState::default())),
            output_dir: Arc::new(output_dir.into()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

pub fn app() -> Router {
    app_with_state(AppState::default())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/newapi/config",
            get(gateway::get_config).put(gateway::update_config),
        )
        .route("/api/v1/newapi/stats", get(gateway::get_stats))
        .route("/api/v1/newapi/text", post(gateway::generate_text))
        .route("/api/v1/newapi/image", post(gateway::generate_image))
        .route("/api/v1/tts/generate", post(tts::generate))
        .route("/api/v1/tts/voices", get(tts::list_voices))
        .route("/api/v1/tts/providers", get(tts::list_providers))
        .route("/api/v1/tts/batch", post(tts::batch_generate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

/// `{"error": message}` with the given status, the shape every route uses for
/// rejected input.
pub(crate) fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "error": message.into() })))
}
