//! Kokoro-82M ONNX inference engine.
//!
//! Single-model TTS: split into segments → phonemize → tokenize → ONNX
//! inference per segment → concatenated 24 kHz audio.

use super::assets::AssetStore;
use super::phonemize::Phonemizer;
use super::voices::{self, VoiceSource, VoiceStyle};
use crate::config::TtsConfig;
use crate::error::{Result, SynthError};
use ort::session::Session;
use ort::value::Tensor;
use std::collections::HashMap;
use tracing::{info, warn};

/// Maximum context length per segment (including pad tokens).
const MAX_CONTEXT: usize = 512;

/// Output sample rate in Hz.
const SAMPLE_RATE: u32 = 24_000;

/// Bounds for the speed multiplier.
const SPEED_RANGE: (f32, f32) = (0.5, 2.0);

/// Kokoro TTS engine.
///
/// Wraps one ONNX session, the tokenizer, a phonemizer per accent, and a
/// cache of voice style tensors. The default voice loads eagerly; other
/// voices load on first request.
pub struct KokoroTts {
    session: Session,
    tokenizer: tokenizers::Tokenizer,
    us_phonemizer: Phonemizer,
    gb_phonemizer: Phonemizer,
    styles: HashMap<String, VoiceStyle>,
    assets: AssetStore,
    default_voice: String,
    default_speed: f32,
}

impl KokoroTts {
    /// Load the engine: download any missing assets, then load them.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset cannot be fetched, the model or
    /// tokenizer fails to load, or the configured voice is unknown.
    pub fn load(config: &TtsConfig, assets: AssetStore) -> Result<Self> {
        if config.sample_rate != SAMPLE_RATE {
            warn!(
                "configured sample_rate {} ignored; Kokoro always outputs {SAMPLE_RATE} Hz",
                config.sample_rate
            );
        }

        let model_path = assets.model(&config.model_variant)?;
        info!("loading Kokoro ONNX model: {}", model_path.display());
        let mut builder = Session::builder()
            .map_err(|e| SynthError::Model(format!("failed to load ONNX model: {e}")))?;
        builder = builder
            .with_intra_threads(4)
            .map_err(|e| SynthError::Model(format!("failed to load ONNX model: {e}")))?;
        let session = builder
            .commit_from_file(&model_path)
            .map_err(|e| SynthError::Model(format!("failed to load ONNX model: {e}")))?;

        let tokenizer = load_tokenizer(&assets.tokenizer()?)?;

        let mut engine = Self {
            session,
            tokenizer,
            us_phonemizer: Phonemizer::new(false),
            gb_phonemizer: Phonemizer::new(true),
            styles: HashMap::new(),
            assets,
            default_voice: config.voice.clone(),
            default_speed: config.speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1),
        };

        // Fail at startup, not on the first request, if the default voice
        // is unknown or its style file is bad.
        engine.ensure_voice(&config.voice)?;
        info!(
            "Kokoro TTS ready (voice={}, variant={})",
            config.voice, config.model_variant
        );

        Ok(engine)
    }

    /// Output sample rate (always 24 kHz).
    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Default voice name.
    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    /// Voices with style tensors currently in memory.
    pub fn loaded_voices(&self) -> Vec<String> {
        let mut names: Vec<String> = self.styles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Synthesize text to f32 mono samples at 24 kHz.
    ///
    /// The input is split on newline runs; each non-empty segment is
    /// synthesized separately and the audio is concatenated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank text, an unknown voice, an
    /// out-of-range speed, or a segment beyond the model context; `Tts` or
    /// `Model` errors otherwise.
    pub fn synthesize(
        &mut self,
        text: &str,
        voice: Option<&str>,
        speed: Option<f32>,
    ) -> Result<Vec<f32>> {
        let voice = voice.unwrap_or(&self.default_voice).to_owned();
        let speed = match speed {
            Some(s) if !(SPEED_RANGE.0..=SPEED_RANGE.1).contains(&s) => {
                return Err(SynthError::InvalidInput(format!(
                    "speed {s} outside {}..{}",
                    SPEED_RANGE.0, SPEED_RANGE.1
                )));
            }
            Some(s) => s,
            None => self.default_speed,
        };

        let segments = split_segments(text);
        if segments.is_empty() {
            return Err(SynthError::InvalidInput("no text provided".into()));
        }

        self.ensure_voice(&voice)?;

        let start = std::time::Instant::now();
        let mut samples = Vec::new();
        for segment in &segments {
            samples.extend(self.synthesize_segment(segment, &voice, speed)?);
        }

        if samples.is_empty() {
            return Err(SynthError::Tts("no audio generated".into()));
        }

        let max_amp = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let has_nan = samples.iter().any(|s| s.is_nan());
        info!(
            "synthesized {} segment(s), {} samples ({:.1}s audio) in {:.0}ms — max_amp={:.4}, nan={}",
            segments.len(),
            samples.len(),
            samples.len() as f32 / SAMPLE_RATE as f32,
            start.elapsed().as_millis(),
            max_amp,
            has_nan,
        );

        Ok(samples)
    }

    /// Synthesize one newline-free segment.
    fn synthesize_segment(&mut self, segment: &str, voice: &str, speed: f32) -> Result<Vec<f32>> {
        let phonemizer = if voices::is_british(voice) {
            &self.gb_phonemizer
        } else {
            &self.us_phonemizer
        };
        let ipa = phonemizer.phonemize(segment)?;

        // The repo tokenizer's post-processor is stripped at load time, so
        // wrap with the pad token (id 0) manually.
        let encoding = self
            .tokenizer
            .encode(ipa.as_str(), false)
            .map_err(|e| SynthError::Tts(format!("tokenization failed: {e}")))?;
        let raw_ids = encoding.get_ids();

        let mut token_ids: Vec<i64> = Vec::with_capacity(raw_ids.len() + 2);
        token_ids.push(0);
        token_ids.extend(raw_ids.iter().map(|&id| i64::from(id)));
        token_ids.push(0);

        if token_ids.len() > MAX_CONTEXT {
            return Err(SynthError::InvalidInput(format!(
                "segment too long: {} tokens (max {MAX_CONTEXT})",
                token_ids.len(),
            )));
        }

        let content_tokens = token_ids.len() - 2;
        let style_row = self
            .styles
            .get(voice)
            .ok_or_else(|| SynthError::Tts(format!("voice style not loaded: {voice}")))?
            .row_for_tokens(content_tokens)
            .to_vec();

        run_inference(&mut self.session, &token_ids, &style_row, speed)
    }

    /// Make sure the style tensor for `voice` is in the cache.
    fn ensure_voice(&mut self, voice: &str) -> Result<()> {
        if self.styles.contains_key(voice) {
            return Ok(());
        }
        let path = match voices::resolve_voice(voice)? {
            VoiceSource::Catalog(name) => self.assets.voice(&name)?,
            VoiceSource::Custom(path) => path,
        };
        let style = VoiceStyle::from_file(&path)?;
        info!(
            "loaded voice style {voice}: {} rows of {} dims",
            style.rows(),
            voices::STYLE_DIM
        );
        self.styles.insert(voice.to_owned(), style);
        Ok(())
    }
}

/// Split input on newline runs, dropping blank segments.
fn split_segments(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Run one ONNX inference call.
fn run_inference(
    session: &mut Session,
    token_ids: &[i64],
    style: &[f32],
    speed: f32,
) -> Result<Vec<f32>> {
    use ort::session::{SessionInputValue, SessionInputs};

    let seq_len = token_ids.len();
    let input_ids = Tensor::from_array(([1_usize, seq_len], token_ids.to_vec()))
        .map_err(|e| SynthError::Tts(format!("failed to create input_ids tensor: {e}")))?;
    let style_tensor = Tensor::from_array(([1_usize, voices::STYLE_DIM], style.to_vec()))
        .map_err(|e| SynthError::Tts(format!("failed to create style tensor: {e}")))?;
    let speed_tensor = Tensor::from_array(([1_usize], vec![speed]))
        .map_err(|e| SynthError::Tts(format!("failed to create speed tensor: {e}")))?;

    let mut feed: HashMap<String, SessionInputValue> = HashMap::new();
    feed.insert("input_ids".to_string(), input_ids.into());
    feed.insert("style".to_string(), style_tensor.into());
    feed.insert("speed".to_string(), speed_tensor.into());

    let outputs = session
        .run(SessionInputs::from(feed))
        .map_err(|e| SynthError::Tts(format!("ONNX inference failed: {e}")))?;

    // Output: shape [1, num_samples]
    let (_shape, data) = outputs[0_usize]
        .try_extract_tensor::<f32>()
        .map_err(|e| SynthError::Tts(format!("failed to extract output tensor: {e}")))?;

    Ok(data.to_vec())
}

/// Load and patch the Kokoro tokenizer.
///
/// `tokenizers` v0.22 cannot deserialize the `TemplateProcessing`
/// post-processor in the repo's `tokenizer.json`, and its `WordLevel`
/// model entry lacks the fields the crate requires. Patch both and handle
/// pad-token insertion manually during synthesis.
fn load_tokenizer(path: &std::path::Path) -> Result<tokenizers::Tokenizer> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SynthError::Model(format!("failed to read tokenizer {}: {e}", path.display()))
    })?;

    let mut json: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| SynthError::Model(format!("failed to parse tokenizer JSON: {e}")))?;
    patch_tokenizer_json(&mut json);

    let patched = serde_json::to_string(&json)
        .map_err(|e| SynthError::Model(format!("failed to serialize patched tokenizer: {e}")))?;

    tokenizers::Tokenizer::from_bytes(patched)
        .map_err(|e| SynthError::Model(format!("failed to load tokenizer: {e}")))
}

/// Strip the post-processor and complete the `WordLevel` model entry.
fn patch_tokenizer_json(json: &mut serde_json::Value) {
    if let Some(obj) = json.as_object_mut() {
        obj.remove("post_processor");
        if let Some(model) = obj.get_mut("model").and_then(|m| m.as_object_mut()) {
            model
                .entry("type")
                .or_insert_with(|| serde_json::Value::String("WordLevel".to_owned()));
            model
                .entry("unk_token")
                .or_insert_with(|| serde_json::Value::String("$".to_owned()));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn segments_split_on_newline_runs() {
        assert_eq!(
            split_segments("first line\nsecond line\n\n\nthird"),
            vec!["first line", "second line", "third"]
        );
    }

    #[test]
    fn blank_and_whitespace_segments_are_dropped() {
        assert!(split_segments("").is_empty());
        assert!(split_segments("   \n\t\n  ").is_empty());
    }

    #[test]
    fn single_line_is_one_segment() {
        assert_eq!(split_segments("hello there"), vec!["hello there"]);
    }

    #[test]
    fn segments_are_trimmed() {
        assert_eq!(split_segments("  padded  \n"), vec!["padded"]);
    }

    #[test]
    fn tokenizer_patch_strips_post_processor_and_completes_model() {
        let mut json: serde_json::Value = serde_json::from_str(
            r#"{
                "post_processor": {"type": "TemplateProcessing"},
                "model": {"vocab": {"a": 1}}
            }"#,
        )
        .unwrap();
        patch_tokenizer_json(&mut json);

        assert!(json.get("post_processor").is_none());
        assert_eq!(json["model"]["type"], "WordLevel");
        assert_eq!(json["model"]["unk_token"], "$");
    }

    #[test]
    fn tokenizer_patch_keeps_existing_model_type() {
        let mut json: serde_json::Value =
            serde_json::from_str(r#"{"model": {"type": "BPE", "unk_token": "?"}}"#).unwrap();
        patch_tokenizer_json(&mut json);
        assert_eq!(json["model"]["type"], "BPE");
        assert_eq!(json["model"]["unk_token"], "?");
    }
}
