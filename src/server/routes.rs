//! Route handlers for the synthesis server.

use super::AppState;
use super::page::INDEX_HTML;
use super::types::{ErrorResponse, HealthResponse, SynthesisRequest, VoiceEntry, VoiceListResponse};
use crate::error::{Result, SynthError};
use crate::tts::voices::VOICE_CATALOG;
use crate::wav;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Response};
use tracing::{info, warn};
use uuid::Uuid;

/// `GET /` — the HTML test page.
pub(super) async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /health` — liveness and readiness.
pub(super) async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        voice: state.synth.default_voice(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

/// `GET /voices` — the voice catalog and what is loaded.
pub(super) async fn handle_voices(State(state): State<AppState>) -> Json<VoiceListResponse> {
    let loaded = state.synth.loaded_voices().await;
    let voices = VOICE_CATALOG
        .iter()
        .map(|name| VoiceEntry {
            name: (*name).to_owned(),
            loaded: loaded.iter().any(|l| l == name),
        })
        .collect();
    Json(VoiceListResponse {
        default: state.synth.default_voice(),
        voices,
    })
}

/// `POST /tts` — synthesize text and return a WAV file.
///
/// Accepts JSON or an urlencoded form (the test page posts the latter).
pub(super) async fn handle_synthesize(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match parse_request(&headers, &body) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };
    if request.text.trim().is_empty() {
        return error_response(&SynthError::InvalidInput("no text provided".into()));
    }

    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        chars = request.text.len(),
        voice = request.voice.as_deref().unwrap_or("default"),
        "synthesis request"
    );

    let result = state
        .synth
        .synthesize(&request.text, request.voice.as_deref(), request.speed)
        .await
        .and_then(|samples| wav::encode_wav_pcm16(&samples, state.synth.sample_rate()));

    match result {
        Ok(wav_bytes) => (
            [
                (header::CONTENT_TYPE, "audio/wav"),
                (
                    header::CONTENT_DISPOSITION,
                    "inline; filename=\"speech.wav\"",
                ),
            ],
            wav_bytes,
        )
            .into_response(),
        Err(e) => {
            warn!(%request_id, error = %e, "synthesis failed");
            error_response(&e)
        }
    }
}

/// Decode the request body by content type: JSON, or urlencoded form.
fn parse_request(headers: &HeaderMap, body: &[u8]) -> Result<SynthesisRequest> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        serde_json::from_slice(body)
            .map_err(|e| SynthError::InvalidInput(format!("malformed JSON body: {e}")))
    } else if content_type.is_empty() || content_type.starts_with("application/x-www-form-urlencoded")
    {
        parse_form(body)
    } else {
        Err(SynthError::InvalidInput(format!(
            "unsupported content type: {content_type}"
        )))
    }
}

/// Decode an `application/x-www-form-urlencoded` body.
fn parse_form(body: &[u8]) -> Result<SynthesisRequest> {
    let mut request = SynthesisRequest::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "text" => request.text = value.into_owned(),
            "voice" => request.voice = Some(value.into_owned()),
            "speed" => {
                let speed = value.parse().map_err(|_| {
                    SynthError::InvalidInput(format!("speed is not a number: {value}"))
                })?;
                request.speed = Some(speed);
            }
            _ => {}
        }
    }
    Ok(request)
}

/// Map an error to its HTTP response: 400 for bad requests, 500 otherwise.
fn error_response(err: &SynthError) -> Response {
    let (status, message) = match err {
        SynthError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn headers_with_content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, value.parse().unwrap());
        headers
    }

    #[test]
    fn parses_json_body() {
        let headers = headers_with_content_type("application/json");
        let request =
            parse_request(&headers, br#"{"text": "hello", "voice": "bf_emma"}"#).unwrap();
        assert_eq!(request.text, "hello");
        assert_eq!(request.voice.as_deref(), Some("bf_emma"));
    }

    #[test]
    fn json_content_type_with_charset_still_parses() {
        let headers = headers_with_content_type("application/json; charset=utf-8");
        assert!(parse_request(&headers, br#"{"text": "hi"}"#).is_ok());
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let headers = headers_with_content_type("application/json");
        let err = parse_request(&headers, b"{not json").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn parses_urlencoded_form() {
        let headers = headers_with_content_type("application/x-www-form-urlencoded");
        let request =
            parse_request(&headers, b"text=hello+world&voice=am_echo&speed=1.5").unwrap();
        assert_eq!(request.text, "hello world");
        assert_eq!(request.voice.as_deref(), Some("am_echo"));
        assert_eq!(request.speed, Some(1.5));
    }

    #[test]
    fn form_decodes_percent_escapes() {
        let headers = headers_with_content_type("application/x-www-form-urlencoded");
        let request = parse_request(&headers, b"text=line%20one%0Aline%20two").unwrap();
        assert_eq!(request.text, "line one\nline two");
    }

    #[test]
    fn missing_content_type_is_treated_as_form() {
        let request = parse_request(&HeaderMap::new(), b"text=hi").unwrap();
        assert_eq!(request.text, "hi");
    }

    #[test]
    fn non_numeric_speed_is_invalid_input() {
        let headers = headers_with_content_type("application/x-www-form-urlencoded");
        let err = parse_request(&headers, b"text=hi&speed=fast").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn unsupported_content_type_is_invalid_input() {
        let headers = headers_with_content_type("text/plain");
        let err = parse_request(&headers, b"hello").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let resp = error_response(&SynthError::InvalidInput("no text provided".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn synthesis_failure_maps_to_500() {
        let resp = error_response(&SynthError::Tts("inference exploded".into()));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
