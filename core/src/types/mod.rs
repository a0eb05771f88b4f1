//! Request and response DTOs for the media API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch any schema drift between the two crates. Optional
//! request fields are skipped when `None` so the JSON body carries exactly
//! what the caller set and the server applies its own defaults.

mod gateway;
mod tts;

pub use gateway::{
    ConfigAck, GatewayConfig, GenerationResult, ImageGenerationRequest, LoadBalancerConfig,
    Provider, ProviderStats, TextGenerationRequest,
};
pub(crate) use gateway::StatsPayload;
pub use tts::{TtsBatchRequest, TtsBatchResponse, TtsGenerateRequest, TtsGenerateResponse, TtsVoice};
