use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One upstream AI provider in the gateway's pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
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

/// Routing policy and the ordered provider list it applies to.
///
/// `strategy` is interpreted by the server only (for example `round-robin`,
/// `weighted` or `least-cost`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadBalancerConfig {
    pub strategy: String,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

/// Root gateway configuration, always read and written as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub load_balancer: LoadBalancerConfig,
}

/// Acknowledgement returned after replacing the gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigAck {
    pub message: String,
}

/// Server-computed telemetry for one provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderStats {
    pub name: String,
    #[serde(default)]
    pub request_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub success_rate: f64,
    /// Milliseconds.
    #[serde(default)]
    pub avg_latency: f64,
    #[serde(default)]
    pub last_used: String,
}

/// The two shapes the stats endpoint is known to answer with.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StatsPayload {
    Envelope { stats: BTreeMap<String, ProviderStats> },
    List(Vec<ProviderStats>),
}

impl StatsPayload {
    pub(crate) fn into_vec(self) -> Vec<ProviderStats> {
        match self {
            StatsPayload::Envelope { stats } => stats.into_values().collect(),
            StatsPayload::List(stats) => stats,
        }
    }
}

/// Payload for a test text generation through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextGenerationRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Payload for a test image generation through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
}

/// Result of a text or image generation.
///
/// Only `success` is guaranteed. `usage` and `latency` are passed through as
/// raw JSON because the server does not pin down their shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub latency: serde_json::Value,
}
