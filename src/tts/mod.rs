//! Text-to-speech synthesis using Kokoro-82M.
//!
//! Uses the Kokoro-82M ONNX model with misaki G2P phonemization at 24 kHz.
//! Voice selection via pre-trained style tensors (`.bin` files).

pub mod assets;
mod engine;
mod phonemize;
pub mod voices;

pub use engine::KokoroTts;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The seam between the HTTP surface and the synthesis engine.
///
/// The server only ever talks to this trait, so tests can drive the full
/// HTTP stack with a fake implementation and no model download.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize text to f32 mono samples.
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        speed: Option<f32>,
    ) -> Result<Vec<f32>>;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Default voice name.
    fn default_voice(&self) -> String;

    /// Voices with style tensors currently in memory.
    async fn loaded_voices(&self) -> Vec<String>;
}

/// Shared handle to a [`Synthesizer`].
pub type SharedSynthesizer = Arc<dyn Synthesizer>;

/// [`KokoroTts`] behind an async mutex.
///
/// ONNX inference needs `&mut` session access, so requests serialize on
/// the single loaded model, matching the original one-process server.
pub struct KokoroService {
    engine: tokio::sync::Mutex<KokoroTts>,
    sample_rate: u32,
    default_voice: String,
}

impl KokoroService {
    /// Wrap a loaded engine.
    pub fn new(engine: KokoroTts) -> Self {
        let sample_rate = engine.sample_rate();
        let default_voice = engine.default_voice().to_owned();
        Self {
            engine: tokio::sync::Mutex::new(engine),
            sample_rate,
            default_voice,
        }
    }
}

#[async_trait]
impl Synthesizer for KokoroService {
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        speed: Option<f32>,
    ) -> Result<Vec<f32>> {
        let mut engine = self.engine.lock().await;
        // Inference is synchronous and can run for seconds; keep the
        // executor's other workers responsive.
        tokio::task::block_in_place(|| engine.synthesize(text, voice, speed))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn default_voice(&self) -> String {
        self.default_voice.clone()
    }

    async fn loaded_voices(&self) -> Vec<String> {
        self.engine.lock().await.loaded_voices()
    }
}
