//! Gateway configuration, provider stats and test generations.

use std::{collections::BTreeMap, time::Instant};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{error_body, AppState};

const MAX_IMAGES: u32 = 4;

/// A prompt containing this makes the selected provider fail, so error
/// accounting can be driven from outside.
const FAILURE_MARKER: &str = "#fail";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub enabled: bool,
}

impl Provider {
    fn serves(&self, kind: &str) -> bool {
        self.models.iter().any(|m| m == kind || m == "all")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoadBalancerConfig {
    pub strategy: String,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub load_balancer: LoadBalancerConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            load_balancer: LoadBalancerConfig {
                strategy: "round-robin".to_string(),
                providers: Vec::new(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProviderStats {
    pub name: String,
    pub request_count: u64,
    pub error_count: u64,
    pub success_rate: f64,
    pub avg_latency: f64,
    pub last_used: String,
}

impl ProviderStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            request_count: 0,
            error_count: 0,
            success_rate: 0.0,
            avg_latency: 0.0,
            last_used: String::new(),
        }
    }

    fn record_success(&mut self, latency_ms: f64) {
        self.request_count += 1;
        self.avg_latency += (latency_ms - self.avg_latency) / self.request_count as f64;
        self.success_rate = (self.request_count - self.error_count) as f64 / self.request_count as f64;
        self.last_used = Utc::now().to_rfc3339();
    }

    fn record_error(&mut self) {
        self.request_count += 1;
        self.error_count += 1;
        self.success_rate = (self.request_count - self.error_count) as f64 / self.request_count as f64;
        self.last_used = Utc::now().to_rfc3339();
    }
}

/// Current config plus one stats row per configured provider.
#[derive(Debug, Default)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub stats: BTreeMap<String, ProviderStats>,
}

impl GatewayState {
    /// Swap in a whole new config. Stats restart from zero for every provider
    /// it names; rows for providers no longer configured are dropped.
    pub fn replace_config(&mut self, config: GatewayConfig) {
        self.stats = config
            .load_balancer
            .providers
            .iter()
            .map(|p| (p.name.clone(), ProviderStats::new(&p.name)))
            .collect();
        self.config = config;
    }

    /// First enabled provider that serves `kind`, in configured order.
    pub fn select_provider(&self, kind: &str) -> Option<&Provider> {
        self.config
            .load_balancer
            .providers
            .iter()
            .find(|p| p.enabled && p.serves(kind))
    }

    fn record_success(&mut self, provider: &str, latency_ms: f64) {
        self.stats
            .entry(provider.to_string())
            .or_insert_with(|| ProviderStats::new(provider))
            .record_success(latency_ms);
    }

    fn record_error(&mut self, provider: &str) {
        self.stats
            .entry(provider.to_string())
            .or_insert_with(|| ProviderStats::new(provider))
            .record_error();
    }
}

/// Fails the call on `provider` when the prompt asks for it.
fn upstream_failure(gateway: &mut GatewayState, provider: &str, prompt: &str) -> Option<Response> {
    if !prompt.contains(FAILURE_MARKER) {
        return None;
    }
    gateway.record_error(provider);
    warn!(provider, "upstream provider failed");
    Some(
        error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("provider {provider} failed"),
        )
        .into_response(),
    )
}

#[derive(Deserialize)]
pub struct GenerateTextRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Deserialize)]
pub struct GenerateImageRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub n: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Milliseconds.
    pub latency: u64,
}

pub async fn get_config(State(state): State<AppState>) -> Json<GatewayConfig> {
    Json(state.gateway.read().await.config.clone())
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<GatewayConfig>,
) -> Json<serde_json::Value> {
    info!(
        strategy = %config.load_balancer.strategy,
        providers = config.load_balancer.providers.len(),
        "gateway config replaced"
    );
    state.gateway.write().await.replace_config(config);
    Json(json!({ "message": "config updated" }))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let gateway = state.gateway.read().await;
    Json(json!({ "stats": gateway.stats }))
}

pub async fn generate_text(
    State(state): State<AppState>,
    Json(req): Json<GenerateTextRequest>,
) -> Response {
    if req.model.is_empty() || req.prompt.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "model and prompt are required").into_response();
    }
    let start = Instant::now();
    let mut gateway = state.gateway.write().await;
    let Some(provider) = gateway.select_provider("text").map(|p| p.name.clone()) else {
        warn!(model = %req.model, "no provider serves text");
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "no available provider for text").into_response();
    };
    if let Some(failure) = upstream_failure(&mut gateway, &provider, &req.prompt) {
        return failure;
    }

    let content = match req.system_prompt.as_deref().filter(|s| !s.is_empty()) {
        Some(system) => format!("[{provider}/{}] ({system}) {}", req.model, req.prompt),
        None => format!("[{provider}/{}] {}", req.model, req.prompt),
    };
    let latency = start.elapsed().as_millis() as u64;
    gateway.record_success(&provider, latency as f64);

    Json(GenerationResult {
        success: true,
        content: Some(content),
        images: Vec::new(),
        error: None,
        latency,
    })
    .into_response()
}

pub async fn generate_image(
    State(state): State<AppState>,
    Json(req): Json<GenerateImageRequest>,
) -> Response {
    if req.model.is_empty() || req.prompt.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "model and prompt are required").into_response();
    }
    let start = Instant::now();
    let mut gateway = state.gateway.write().await;
    let Some(provider) = gateway.select_provider("image").map(|p| p.name.clone()) else {
        warn!(model = %req.model, "no provider serves image");
        return error_body(StatusCode::INTERNAL_SERVER_ERROR, "no available provider for image").into_response();
    };
    if let Some(failure) = upstream_failure(&mut gateway, &provider, &req.prompt) {
        return failure;
    }

    let size = req.size.unwrap_or_else(|| "1024x1024".to_string());
    let count = req.n.unwrap_or(1).clamp(1, MAX_IMAGES);
    let images = (0..count)
        .map(|_| format!("https://images.mock.local/{provider}/{size}/{}.png", Uuid::new_v4()))
        .collect();
    let latency = start.elapsed().as_millis() as u64;
    gateway.record_success(&provider, latency as f64);

    Json(GenerationResult {
        success: true,
        content: None,
        images,
        error: None,
        latency,
    })
    .into_response()
}
