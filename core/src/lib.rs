//! Synchronous API client core for the media studio backend.
//!
//! # Overview
//! Covers two feature areas: the AI gateway configuration API
//! (`/api/v1/newapi/*`) and the text-to-speech API (`/api/v1/tts/*`).
//! Requests are built as plain `HttpRequest` values and responses parsed from
//! plain `HttpResponse` values; a [`Transport`] does the actual I/O.
//!
//! # Design
//! - `MediaApiClient` is stateless and holds only `base_url`.
//! - Each endpoint has `build_*`, `parse_*`, and a one-shot method that sends
//!   exactly one request through the transport it is given.
//! - No retries, caching or error recovery; transport failures come back as
//!   `ApiError::Transport` unchanged.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::MediaApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ConfigAck, GatewayConfig, GenerationResult, ImageGenerationRequest, LoadBalancerConfig,
    Provider, ProviderStats, TextGenerationRequest, TtsBatchRequest, TtsBatchResponse,
    TtsGenerateRequest, TtsGenerateResponse, TtsVoice,
};
