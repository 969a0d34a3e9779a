//! Wire types for the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /tts`, as JSON or an urlencoded form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to synthesize. Newline runs separate segments.
    #[serde(default)]
    pub text: String,
    /// Voice name override (e.g. "bf_emma"); server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Speed multiplier override (0.5–2.0); server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// JSON error body, `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` once the server answers.
    pub status: String,
    /// Default voice the server synthesizes with.
    pub voice: String,
    /// Seconds since the server started serving.
    pub uptime_secs: u64,
}

/// One entry in the `GET /voices` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceEntry {
    /// Voice name (e.g. "am_echo").
    pub name: String,
    /// Whether its style tensor is currently in memory.
    pub loaded: bool,
}

/// Response from `GET /voices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceListResponse {
    /// Default voice name.
    pub default: String,
    /// The published voice catalog.
    pub voices: Vec<VoiceEntry>,
}
