//! Stateless HTTP request builder and response parser for the media API.
//!
//! # Design
//! `MediaApiClient` holds only a `base_url` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The un-prefixed methods (`generate_tts`, `get_gateway_stats`, ...) glue the
//! two together around exactly one `Transport::send`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    ConfigAck, GatewayConfig, GenerationResult, ImageGenerationRequest, ProviderStats, StatsPayload,
    TextGenerationRequest, TtsBatchRequest, TtsBatchResponse, TtsGenerateRequest,
    TtsGenerateResponse, TtsVoice,
};

pub const GATEWAY_CONFIG_PATH: &str = "/api/v1/newapi/config";
pub const GATEWAY_STATS_PATH: &str = "/api/v1/newapi/stats";
pub const GATEWAY_TEXT_PATH: &str = "/api/v1/newapi/text";
pub const GATEWAY_IMAGE_PATH: &str = "/api/v1/newapi/image";
pub const TTS_GENERATE_PATH: &str = "/api/v1/tts/generate";
pub const TTS_VOICES_PATH: &str = "/api/v1/tts/voices";
pub const TTS_PROVIDERS_PATH: &str = "/api/v1/tts/providers";
pub const TTS_BATCH_PATH: &str = "/api/v1/tts/batch";

/// Synchronous, stateless client for the gateway and TTS APIs.
#[derive(Debug, Clone)]
pub struct MediaApiClient {
    base_url: String,
}

impl MediaApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str, query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            query,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<B: Serialize>(&self, method: HttpMethod, path: &str, input: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            query: Vec::new(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    // ---------------------------------------------------------------------
    // Gateway
    // ---------------------------------------------------------------------

    pub fn build_get_gateway_config(&self) -> HttpRequest {
        self.get(GATEWAY_CONFIG_PATH, Vec::new())
    }

    pub fn build_update_gateway_config(&self, config: &GatewayConfig) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Put, GATEWAY_CONFIG_PATH, config)
    }

    pub fn build_get_gateway_stats(&self) -> HttpRequest {
        self.get(GATEWAY_STATS_PATH, Vec::new())
    }

    pub fn build_test_text_generation(&self, input: &TextGenerationRequest) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, GATEWAY_TEXT_PATH, input)
    }

    pub fn build_test_image_generation(&self, input: &ImageGenerationRequest) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, GATEWAY_IMAGE_PATH, input)
    }

    pub fn parse_get_gateway_config(&self, response: HttpResponse) -> Result<GatewayConfig, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_gateway_config(&self, response: HttpResponse) -> Result<ConfigAck, ApiError> {
        parse_json(response)
    }

    /// Accepts both `{"stats": {name: stats}}` (sorted by name) and a bare array.
    pub fn parse_get_gateway_stats(&self, response: HttpResponse) -> Result<Vec<ProviderStats>, ApiError> {
        parse_json::<StatsPayload>(response).map(StatsPayload::into_vec)
    }

    pub fn parse_test_text_generation(&self, response: HttpResponse) -> Result<GenerationResult, ApiError> {
        parse_json(response)
    }

    pub fn parse_test_image_generation(&self, response: HttpResponse) -> Result<GenerationResult, ApiError> {
        parse_json(response)
    }

    pub fn get_gateway_config<T: Transport + ?Sized>(&self, transport: &T) -> Result<GatewayConfig, ApiError> {
        self.parse_get_gateway_config(transport.send(&self.build_get_gateway_config())?)
    }

    pub fn update_gateway_config<T: Transport + ?Sized>(
        &self,
        transport: &T,
        config: &GatewayConfig,
    ) -> Result<ConfigAck, ApiError> {
        let req = self.build_update_gateway_config(config)?;
        self.parse_update_gateway_config(transport.send(&req)?)
    }

    pub fn get_gateway_stats<T: Transport + ?Sized>(&self, transport: &T) -> Result<Vec<ProviderStats>, ApiError> {
        self.parse_get_gateway_stats(transport.send(&self.build_get_gateway_stats())?)
    }

    pub fn test_text_generation<T: Transport + ?Sized>(
        &self,
        transport: &T,
        input: &TextGenerationRequest,
    ) -> Result<GenerationResult, ApiError> {
        let req = self.build_test_text_generation(input)?;
        self.parse_test_text_generation(transport.send(&req)?)
    }

    pub fn test_image_generation<T: Transport + ?Sized>(
        &self,
        transport: &T,
        input: &ImageGenerationRequest,
    ) -> Result<GenerationResult, ApiError> {
        let req = self.build_test_image_generation(input)?;
        self.parse_test_image_generation(transport.send(&req)?)
    }

    // ---------------------------------------------------------------------
    // TTS
    // ---------------------------------------------------------------------

    pub fn build_generate_tts(&self, input: &TtsGenerateRequest) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, TTS_GENERATE_PATH, input)
    }

    /// `None` sends no query at all; `Some` is forwarded as `provider=<value>`.
    pub fn build_get_tts_voices(&self, provider: Option<&str>) -> HttpRequest {
        let query = provider
            .map(|p| vec![("provider".to_string(), p.to_string())])
            .unwrap_or_default();
        self.get(TTS_VOICES_PATH, query)
    }

    pub fn build_get_tts_providers(&self) -> HttpRequest {
        self.get(TTS_PROVIDERS_PATH, Vec::new())
    }

    pub fn build_batch_generate_tts(&self, input: &TtsBatchRequest) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, TTS_BATCH_PATH, input)
    }

    pub fn parse_generate_tts(&self, response: HttpResponse) -> Result<TtsGenerateResponse, ApiError> {
        parse_json(response)
    }

    /// A `null` body (a provider with no voices) parses as an empty list.
    pub fn parse_get_tts_voices(&self, response: HttpResponse) -> Result<Vec<TtsVoice>, ApiError> {
        parse_json::<Option<Vec<TtsVoice>>>(response).map(Option::unwrap_or_default)
    }

    pub fn parse_get_tts_providers(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        parse_json(response)
    }

    pub fn parse_batch_generate_tts(&self, response: HttpResponse) -> Result<TtsBatchResponse, ApiError> {
        parse_json(response)
    }

    pub fn generate_tts<T: Transport + ?Sized>(
        &self,
        transport: &T,
        input: &TtsGenerateRequest,
    ) -> Result<TtsGenerateResponse, ApiError> {
        let req = self.build_generate_tts(input)?;
        self.parse_generate_tts(transport.send(&req)?)
    }

    pub fn get_tts_voices<T: Transport + ?Sized>(
        &self,
        transport: &T,
        provider: Option<&str>,
    ) -> Result<Vec<TtsVoice>, ApiError> {
        self.parse_get_tts_voices(transport.send(&self.build_get_tts_voices(provider))?)
    }

    pub fn get_tts_providers<T: Transport + ?Sized>(&self, transport: &T) -> Result<Vec<String>, ApiError> {
        self.parse_get_tts_providers(transport.send(&self.build_get_tts_providers())?)
    }

    pub fn batch_generate_tts<T: Transport + ?Sized>(
        &self,
        transport: &T,
        input: &TtsBatchRequest,
    ) -> Result<TtsBatchResponse, ApiError> {
        let req = self.build_batch_generate_tts(input)?;
        self.parse_batch_generate_tts(transport.send(&req)?)
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response, 200)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
