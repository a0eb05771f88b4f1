use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, AppState, GatewayConfig, TtsBatchResponse, TtsGenerateResponse, TtsVoice};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

const CONFIG: &str = r#"{
    "base_url": "https://gateway.example",
    "api_key": "sk-root",
    "load_balancer": {
        "strategy": "weighted",
        "providers": [
            {"name": "disabled", "base_url": "https://d.example", "api_key": "k", "models": ["all"], "priority": 0, "weight": 1, "enabled": false},
            {"name": "openai", "base_url": "https://o.example", "api_key": "k", "models": ["text"], "priority": 1, "weight": 5, "enabled": true},
            {"name": "painter", "base_url": "https://p.example", "api_key": "k", "models": ["image"], "priority": 2, "weight": 5, "enabled": true}
        ]
    }
}"#;

// --- gateway config ---

#[tokio::test]
async fn default_config_has_no_providers() {
    let resp = app().oneshot(get_request("/api/v1/newapi/config")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let config: GatewayConfig = body_json(resp).await;
    assert_eq!(config.load_balancer.strategy, "round-robin");
    assert!(config.load_balancer.providers.is_empty());
}

#[tokio::test]
async fn update_config_acknowledges() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v1/newapi/config", CONFIG))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: Value = body_json(resp).await;
    assert_eq!(ack, json!({"message": "config updated"}));
}

#[tokio::test]
async fn update_config_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v1/newapi/config", r#"{"base_url":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn text_without_providers_returns_500() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/newapi/text", r#"{"model":"m","prompt":"p"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "no available provider for text");
}

#[tokio::test]
async fn text_with_empty_prompt_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/newapi/text", r#"{"model":"m","prompt":""}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gateway_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/api/v1/newapi/config", CONFIG))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // config reads back exactly what was written
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/newapi/config"))
        .await
        .unwrap();
    let config: Value = body_json(resp).await;
    assert_eq!(config, serde_json::from_str::<Value>(CONFIG).unwrap());

    // text routes to the first enabled text provider
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/newapi/text",
            r#"{"model":"gpt-4o","prompt":"hello","system_prompt":"be brief"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result: Value = body_json(resp).await;
    assert_eq!(result["success"], true);
    assert!(result["content"].as_str().unwrap().starts_with("[openai/gpt-4o]"));

    // image honours n
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/newapi/image",
            r#"{"model":"dall-e","prompt":"a cat","n":2}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result: Value = body_json(resp).await;
    assert_eq!(result["images"].as_array().unwrap().len(), 2);

    // stats envelope keyed by provider name
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/newapi/stats"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stats: Value = body_json(resp).await;
    let stats = stats["stats"].as_object().unwrap();
    assert_eq!(stats.len(), 3);
    assert_eq!(stats["openai"]["request_count"], 1);
    assert_eq!(stats["painter"]["request_count"], 1);
    assert_eq!(stats["disabled"]["request_count"], 0);
    assert_eq!(stats["openai"]["success_rate"], 1.0);
}

#[tokio::test]
async fn failed_generation_counts_as_error() {
    use tower::Service;

    let mut app = app().into_service();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/api/v1/newapi/config", CONFIG))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    for prompt in ["hello", "hello #fail"] {
        let body = json!({"model": "gpt-4o", "prompt": prompt}).to_string();
        ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/api/v1/newapi/text", &body))
            .await
            .unwrap();
    }
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/newapi/image",
            r#"{"model":"dall-e","prompt":"a cat #fail"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "provider painter failed");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/newapi/stats"))
        .await
        .unwrap();
    let stats: Value = body_json(resp).await;
    assert_eq!(stats["stats"]["openai"]["request_count"], 2);
    assert_eq!(stats["stats"]["openai"]["error_count"], 1);
    assert_eq!(stats["stats"]["openai"]["success_rate"], 0.5);
    assert_eq!(stats["stats"]["painter"]["error_count"], 1);
    assert_eq!(stats["stats"]["painter"]["success_rate"], 0.0);
}

// --- tts ---

#[tokio::test]
async fn providers_are_sorted() {
    let resp = app().oneshot(get_request("/api/v1/tts/providers")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let providers: Vec<String> = body_json(resp).await;
    assert_eq!(providers, ["alibaba", "azure"]);
}

#[tokio::test]
async fn voices_filtered_by_provider() {
    let resp = app()
        .oneshot(get_request("/api/v1/tts/voices?provider=azure"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let voices: Vec<TtsVoice> = body_json(resp).await;
    assert!(!voices.is_empty());
    assert!(voices.iter().all(|v| v.provider == "azure"));
}

#[tokio::test]
async fn voices_without_filter_cover_all_providers() {
    let resp = app().oneshot(get_request("/api/v1/tts/voices")).await.unwrap();
    let voices: Vec<TtsVoice> = body_json(resp).await;
    assert!(voices.iter().any(|v| v.provider == "azure"));
    assert!(voices.iter().any(|v| v.provider == "alibaba"));
}

#[tokio::test]
async fn voices_unknown_provider_returns_500() {
    let resp = app()
        .oneshot(get_request("/api/v1/tts/voices?provider=openai"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn generate_inline_audio() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/tts/generate",
            r#"{"provider":"azure","voice":"en-US-Jenny","text":"hello"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result: TtsGenerateResponse = body_json(resp).await;
    assert!(result.success);
    assert!(result.audio_data.is_some());
    assert!(result.file_path.is_none());
    assert_eq!(result.provider, "azure");
    assert_eq!(result.voice, "en-US-Jenny");
    assert!(!result.latency.is_empty());
}

#[tokio::test]
async fn generate_saves_to_output_dir() {
    let dir = std::env::temp_dir().join(format!("mock-tts-{}", uuid::Uuid::new_v4()));
    let app = app_with_state(AppState::new(&dir));
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/v1/tts/generate",
            r#"{"provider":"alibaba","voice":"xiaoyun","text":"ni hao","format":"wav","save_to_file":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let result: TtsGenerateResponse = body_json(resp).await;
    let path = std::path::PathBuf::from(result.file_path.unwrap());
    assert!(path.starts_with(dir.join("tts").join("alibaba").join("xiaoyun")));
    assert_eq!(path.extension().unwrap(), "wav");
    assert!(path.exists());
    assert!(result.audio_data.is_none());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn generate_rejects_voice_or_format_outside_output_dir() {
    let dir = std::env::temp_dir().join(format!("mock-tts-{}", uuid::Uuid::new_v4()));
    let cases = [
        json!({"provider": "alibaba", "voice": "../x", "text": "hi", "save_to_file": true}),
        json!({"provider": "alibaba", "voice": "/tmp/x", "text": "hi", "save_to_file": true}),
        json!({"provider": "alibaba", "voice": "xiaoyun", "text": "hi", "format": "../../y", "save_to_file": true}),
    ];
    for body in cases {
        let app = app_with_state(AppState::new(&dir));
        let resp = app
            .oneshot(json_request("POST", "/api/v1/tts/generate", &body.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
        let result: TtsGenerateResponse = body_json(resp).await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("invalid "));
        assert!(result.file_path.is_none());
    }
    assert!(!dir.exists());
}

#[tokio::test]
async fn generate_unknown_provider_returns_500_with_failure_body() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/tts/generate",
            r#"{"provider":"nope","voice":"v","text":"hello"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let result: TtsGenerateResponse = body_json(resp).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("provider nope not found"));
}

#[tokio::test]
async fn batch_counts_failures_in_order() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/tts/batch",
            r#"{"provider":"azure","voice":"en-US-Guy","texts":["one","  ","three"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let batch: TtsBatchResponse = body_json(resp).await;
    assert!(!batch.success);
    assert_eq!(batch.total, 3);
    assert_eq!(batch.failed, 1);
    let outcomes: Vec<bool> = batch.results.iter().map(|r| r.success).collect();
    assert_eq!(outcomes, [true, false, true]);
}

#[tokio::test]
async fn batch_empty_texts_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/tts/batch",
            r#"{"provider":"azure","voice":"en-US-Guy","texts":[]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
