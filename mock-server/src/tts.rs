//! Canned text-to-speech: a fixed voice catalog and synthetic audio.

use std::{
    path::{Component, Path},
    time::Instant,
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error_body, AppState};

/// Sorted so `/providers` is stable.
pub const PROVIDERS: [&str; 2] = ["alibaba", "azure"];

const DEFAULT_SPEED: f64 = 1.0;
const DEFAULT_PITCH: f64 = 1.0;
const DEFAULT_FORMAT: &str = "mp3";
const MS_PER_CHAR: f64 = 80.0;

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub provider: String,
    pub voice: String,
    pub text: String,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub save_to_file: bool,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub provider: String,
    pub voice: String,
    pub texts: Vec<String>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub save_to_file: bool,
}

#[derive(Deserialize)]
pub struct VoicesQuery {
    pub provider: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TtsGenerateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    pub provider: String,
    pub voice: String,
    pub latency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TtsGenerateResponse {
    fn failure(provider: &str, voice: &str, error: String) -> Self {
        Self {
            success: false,
            audio_data: None,
            file_path: None,
            duration: None,
            provider: provider.to_string(),
            voice: voice.to_string(),
            latency: String::new(),
            error: Some(error),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TtsBatchResponse {
    pub success: bool,
    pub results: Vec<TtsGenerateResponse>,
    pub total: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TtsVoice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub gender: String,
    pub style: String,
    pub provider: String,
}

fn voice(id: &str, name: &str, language: &str, gender: &str, style: &str, provider: &str) -> TtsVoice {
    TtsVoice {
        id: id.to_string(),
        name: name.to_string(),
        language: language.to_string(),
        gender: gender.to_string(),
        style: style.to_string(),
        provider: provider.to_string(),
    }
}

/// Voice catalog for one provider, `None` if the provider is unknown.
pub fn voices_for(provider: &str) -> Option<Vec<TtsVoice>> {
    match provider {
        "azure" => Some(vec![
            voice("en-US-Jenny", "Jenny", "en-US", "female", "Neural", "azure"),
            voice("en-US-Guy", "Guy", "en-US", "male", "Neural", "azure"),
            voice("zh-CN-Xiaoxiao", "Xiaoxiao", "zh-CN", "female", "Neural", "azure"),
        ]),
        "alibaba" => Some(vec![
            voice("xiaoyun", "Xiaoyun", "zh-CN", "female", "chat", "alibaba"),
            voice("xiaogang", "Xiaogang", "zh-CN", "male", "chat", "alibaba"),
            voice("ruoxi", "Ruoxi", "zh-CN", "female", "story", "alibaba"),
            voice("shanshan", "Shanshan", "zh-CN", "female", "young", "alibaba"),
        ]),
        _ => None,
    }
}

/// True when `s` is exactly one normal path component, so joining it onto a
/// directory stays inside that directory.
fn is_single_segment(s: &str) -> bool {
    let mut components = Path::new(s).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

struct Synthesis<'a> {
    provider: &'a str,
    voice: &'a str,
    text: &'a str,
    speed: f64,
    pitch: f64,
    format: &'a str,
    save_to_file: bool,
}

/// Produce deterministic fake audio for `job`, either inline as base64 or
/// written under `output_dir/tts/<provider>/<voice>/`.
async fn synthesize(output_dir: &Path, job: Synthesis<'_>) -> Result<TtsGenerateResponse, String> {
    let start = Instant::now();
    if voices_for(job.provider).is_none() {
        return Err(format!("provider {} not found", job.provider));
    }
    if job.text.trim().is_empty() {
        return Err("text is empty".to_string());
    }
    if !is_single_segment(job.voice) {
        return Err(format!("invalid voice {:?}", job.voice));
    }
    if !is_single_segment(job.format) {
        return Err(format!("invalid format {:?}", job.format));
    }

    let audio = format!(
        "{};{};speed={};pitch={};{}",
        job.format, job.voice, job.speed, job.pitch, job.text
    );
    let duration = (job.text.chars().count() as f64 * MS_PER_CHAR / job.speed).round() as u64;

    let (audio_data, file_path) = if job.save_to_file {
        let dir = output_dir.join("tts").join(job.provider).join(job.voice);
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), job.format));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
        tokio::fs::write(&path, audio.as_bytes())
            .await
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        (None, Some(path.display().to_string()))
    } else {
        (Some(STANDARD.encode(audio.as_bytes())), None)
    };

    debug!(provider = job.provider, voice = job.voice, duration, "synthesized");
    Ok(TtsGenerateResponse {
        success: true,
        audio_data,
        file_path,
        duration: Some(duration),
        provider: job.provider.to_string(),
        voice: job.voice.to_string(),
        latency: format!("{:?}", start.elapsed()),
        error: None,
    })
}

pub async fn generate(State(state): State<AppState>, Json(req): Json<GenerateRequest>) -> Response {
    if req.provider.is_empty() || req.voice.is_empty() || req.text.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "provider, voice and text are required").into_response();
    }
    let job = Synthesis {
        provider: &req.provider,
        voice: &req.voice,
        text: &req.text,
        speed: req.speed.filter(|s| *s > 0.0).unwrap_or(DEFAULT_SPEED),
        pitch: req.pitch.filter(|p| *p > 0.0).unwrap_or(DEFAULT_PITCH),
        format: req.format.as_deref().filter(|f| !f.is_empty()).unwrap_or(DEFAULT_FORMAT),
        save_to_file: req.save_to_file,
    };
    match synthesize(&state.output_dir, job).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            warn!(provider = %req.provider, error = %e, "tts generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TtsGenerateResponse::failure(&req.provider, &req.voice, e)),
            )
                .into_response()
        }
    }
}

pub async fn list_voices(Query(query): Query<VoicesQuery>) -> Response {
    match query.provider.as_deref().filter(|p| !p.is_empty()) {
        Some(provider) => match voices_for(provider) {
            Some(voices) => Json(voices).into_response(),
            None => error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("provider {provider} not found"),
            )
            .into_response(),
        },
        None => {
            let all: Vec<TtsVoice> = PROVIDERS
                .iter()
                .filter_map(|p| voices_for(p))
                .flatten()
                .collect();
            Json(all).into_response()
        }
    }
}

pub async fn list_providers() -> Json<Vec<&'static str>> {
    Json(PROVIDERS.to_vec())
}

pub async fn batch_generate(State(state): State<AppState>, Json(req): Json<BatchRequest>) -> Response {
    if req.provider.is_empty() || req.voice.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "provider and voice are required").into_response();
    }
    if req.texts.is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "texts must not be empty").into_response();
    }

    let speed = req.speed.filter(|s| *s > 0.0).unwrap_or(DEFAULT_SPEED);
    let pitch = req.pitch.filter(|p| *p > 0.0).unwrap_or(DEFAULT_PITCH);
    let mut results = Vec::with_capacity(req.texts.len());
    let mut failed = 0;

    for text in &req.texts {
        let job = Synthesis {
            provider: &req.provider,
            voice: &req.voice,
            text,
            speed,
            pitch,
            format: DEFAULT_FORMAT,
            save_to_file: req.save_to_file,
        };
        match synthesize(&state.output_dir, job).await {
            Ok(resp) => results.push(resp),
            Err(e) => {
                failed += 1;
                results.push(TtsGenerateResponse::failure(&req.provider, &req.voice, e));
            }
        }
    }

    if failed > 0 {
        warn!(provider = %req.provider, failed, total = req.texts.len(), "tts batch had failures");
    }
    Json(TtsBatchResponse {
        success: failed == 0,
        results,
        total: req.texts.len(),
        failed,
    })
    .into_response()
}
