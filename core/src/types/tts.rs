use serde::{Deserialize, Serialize};

/// Payload for a single speech synthesis.
///
/// Unset optional fields are left to the server, which defaults speed and
/// pitch to 1.0 and format to `mp3`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsGenerateRequest {
    pub provider: String,
    pub voice: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to_file: Option<bool>,
}

impl TtsGenerateRequest {
    pub fn new(provider: impl Into<String>, voice: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            voice: voice.into(),
            text: text.into(),
            speed: None,
            pitch: None,
            format: None,
            save_to_file: None,
        }
    }
}

/// Outcome of one synthesis. `success` tells which of the optional fields to
/// look at: `audio_data`/`file_path` on success, `error` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsGenerateResponse {
    pub success: bool,
    /// Base64-encoded audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub provider: String,
    pub voice: String,
    #[serde(default)]
    pub latency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Voice catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TtsVoice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub gender: String,
    pub style: String,
    pub provider: String,
}

/// Payload for synthesizing several texts with one voice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsBatchRequest {
    pub provider: String,
    pub voice: String,
    pub texts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to_file: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsBatchResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<TtsGenerateResponse>,
    pub total: u64,
    pub failed: u64,
}
