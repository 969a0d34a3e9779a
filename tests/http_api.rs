//! Integration tests for the HTTP surface.
//!
//! A fake synthesizer is injected through the `Synthesizer` trait so the
//! full axum stack (routing, body parsing, WAV encoding, error mapping)
//! is exercised against a real bound listener without downloading models.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use kokorod::config::HttpConfig;
use kokorod::error::{Result, SynthError};
use kokorod::server::HttpServer;
use kokorod::server::types::{ErrorResponse, HealthResponse, VoiceListResponse};
use kokorod::tts::Synthesizer;
use std::sync::{Arc, Mutex};

/// Arguments of the last `synthesize` call, for assertions.
#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    text: String,
    voice: Option<String>,
    speed: Option<f32>,
}

/// Fake engine: 0.1 s of a quiet ramp, or scripted failures.
struct FakeSynthesizer {
    last_call: Mutex<Option<RecordedCall>>,
}

impl FakeSynthesizer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            last_call: Mutex::new(None),
        })
    }

    fn last_call(&self) -> Option<RecordedCall> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        speed: Option<f32>,
    ) -> Result<Vec<f32>> {
        *self.last_call.lock().unwrap() = Some(RecordedCall {
            text: text.to_owned(),
            voice: voice.map(str::to_owned),
            speed,
        });

        if text == "boom" {
            return Err(SynthError::Tts("inference exploded".into()));
        }
        if let Some(v) = voice
            && v.starts_with("zz_")
        {
            return Err(SynthError::InvalidInput(format!("unknown voice: {v}")));
        }

        Ok((0..2400).map(|i| i as f32 / 24_000.0).collect())
    }

    fn sample_rate(&self) -> u32 {
        24_000
    }

    fn default_voice(&self) -> String {
        "am_echo".to_owned()
    }

    async fn loaded_voices(&self) -> Vec<String> {
        vec!["am_echo".to_owned()]
    }
}

async fn start_server() -> (Arc<FakeSynthesizer>, HttpServer, String) {
    let fake = FakeSynthesizer::new();
    let config = HttpConfig {
        host: "127.0.0.1".to_owned(),
        port: 0,
    };
    let server = HttpServer::start(fake.clone(), &config).await.unwrap();
    let base = format!("http://{}", server.addr());
    (fake, server, base)
}

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let (_fake, _server, base) = start_server().await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.voice, "am_echo");
}

#[tokio::test]
async fn tts_json_returns_wav() {
    let (fake, _server, base) = start_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/tts"))
        .json(&serde_json::json!({"text": "hello world"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "audio/wav");
    assert_eq!(
        resp.headers()["content-disposition"],
        "inline; filename=\"speech.wav\""
    );

    let body = resp.bytes().await.unwrap();
    let reader = hound::WavReader::new(std::io::Cursor::new(body.to_vec())).unwrap();
    assert_eq!(reader.spec().sample_rate, 24_000);
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.len(), 2400);

    assert_eq!(
        fake.last_call(),
        Some(RecordedCall {
            text: "hello world".to_owned(),
            voice: None,
            speed: None,
        })
    );
}

#[tokio::test]
async fn tts_form_body_is_accepted() {
    let (fake, _server, base) = start_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/tts"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("text=from+the+test+page&voice=bf_emma&speed=1.5")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "audio/wav");

    let call = fake.last_call().unwrap();
    assert_eq!(call.text, "from the test page");
    assert_eq!(call.voice.as_deref(), Some("bf_emma"));
    assert_eq!(call.speed, Some(1.5));
}

#[tokio::test]
async fn blank_text_is_rejected_with_400() {
    let (fake, _server, base) = start_server().await;

    for body in [r#"{"text": "   "}"#, r#"{}"#] {
        let resp = reqwest::Client::new()
            .post(format!("{base}/tts"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        let err: ErrorResponse = resp.json().await.unwrap();
        assert_eq!(err.error, "no text provided");
    }

    // The engine is never reached for blank input.
    assert!(fake.last_call().is_none());
}

#[tokio::test]
async fn unknown_voice_maps_to_400() {
    let (_fake, _server, base) = start_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/tts"))
        .json(&serde_json::json!({"text": "hi", "voice": "zz_nope"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert!(err.error.contains("unknown voice"));
}

#[tokio::test]
async fn engine_failure_maps_to_500() {
    let (_fake, _server, base) = start_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/tts"))
        .json(&serde_json::json!({"text": "boom"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert!(err.error.contains("inference exploded"));
}

#[tokio::test]
async fn malformed_json_maps_to_400() {
    let (_fake, _server, base) = start_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/tts"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn index_serves_the_test_page() {
    let (_fake, _server, base) = start_server().await;

    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert!(
        resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    let body = resp.text().await.unwrap();
    assert!(body.contains("<audio"));
    assert!(body.contains("/tts"));
}

#[tokio::test]
async fn voices_endpoint_lists_catalog_with_loaded_flags() {
    let (_fake, _server, base) = start_server().await;

    let resp = reqwest::get(format!("{base}/voices")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let listing: VoiceListResponse = resp.json().await.unwrap();
    assert_eq!(listing.default, "am_echo");

    let am_echo = listing.voices.iter().find(|v| v.name == "am_echo").unwrap();
    assert!(am_echo.loaded);
    let bf_emma = listing.voices.iter().find(|v| v.name == "bf_emma").unwrap();
    assert!(!bf_emma.loaded);
}

#[tokio::test]
async fn shutdown_releases_the_port() {
    let (_fake, server, base) = start_server().await;
    server.shutdown();

    // The abort lands asynchronously; poll until the listener is gone.
    let client = reqwest::Client::new();
    for _ in 0..40 {
        if client.get(format!("{base}/health")).send().await.is_err() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("server still answering after shutdown");
}
