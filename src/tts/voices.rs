//! Voice catalog and style tensors.
//!
//! Each Kokoro voice is a pre-trained style tensor of shape `(N, 1, 256)`
//! shipped as a raw f32 `.bin` file. The style row fed to the model is
//! selected by the token count of the input.

use crate::error::{Result, SynthError};
use std::path::Path;

/// Style vector width expected by the model.
pub const STYLE_DIM: usize = 256;

/// English voices published in the Kokoro-82M v1.0 ONNX repo.
///
/// Prefix encodes accent and speaker: `af`/`am` American female/male,
/// `bf`/`bm` British female/male. The repo also ships non-English voices;
/// those are excluded because the phonemizer only covers English.
pub const VOICE_CATALOG: &[&str] = &[
    "af_alloy", "af_aoede", "af_bella", "af_heart", "af_jessica", "af_kore", "af_nicole",
    "af_nova", "af_river", "af_sarah", "af_sky", "am_adam", "am_echo", "am_eric", "am_fenrir",
    "am_liam", "am_michael", "am_onyx", "am_puck", "am_santa", "bf_alice", "bf_emma",
    "bf_isabella", "bf_lily", "bm_daniel", "bm_fable", "bm_george", "bm_lewis",
];

/// How a requested voice name resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSource {
    /// A published voice, fetched as `voices/<name>.bin` from the model repo.
    Catalog(String),
    /// An absolute path to a custom style `.bin` on disk.
    Custom(std::path::PathBuf),
}

/// Resolve a voice name to its source, rejecting names the server cannot speak.
///
/// # Errors
///
/// Returns `InvalidInput` for names outside the catalog that are not an
/// absolute path to a `.bin` file.
pub fn resolve_voice(name: &str) -> Result<VoiceSource> {
    let path = Path::new(name);
    if path.is_absolute() && path.extension().is_some_and(|ext| ext == "bin") {
        return Ok(VoiceSource::Custom(path.to_path_buf()));
    }
    if VOICE_CATALOG.contains(&name) {
        Ok(VoiceSource::Catalog(name.to_owned()))
    } else {
        Err(SynthError::InvalidInput(format!("unknown voice: {name}")))
    }
}

/// Whether a voice uses British English pronunciation.
pub fn is_british(voice: &str) -> bool {
    voice.starts_with("bf_") || voice.starts_with("bm_")
}

/// A loaded voice style tensor, stored flat.
#[derive(Debug, Clone)]
pub struct VoiceStyle {
    data: Vec<f32>,
}

impl VoiceStyle {
    /// Parse a raw `.bin` style file: little-endian f32, `N * 256` values.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte length is not a whole number of style rows.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return Err(SynthError::Model(format!(
                "voice file size {} is not an f32 array",
                bytes.len()
            )));
        }
        let float_count = bytes.len() / 4;
        if float_count % STYLE_DIM != 0 {
            return Err(SynthError::Model(format!(
                "voice file has {float_count} floats, not a multiple of {STYLE_DIM}"
            )));
        }

        let data = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { data })
    }

    /// Load a style file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            SynthError::Model(format!("failed to read voice file {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Number of style rows.
    pub fn rows(&self) -> usize {
        self.data.len() / STYLE_DIM
    }

    /// Style row for the given content-token count, clamped to the last row.
    pub fn row_for_tokens(&self, content_tokens: usize) -> &[f32] {
        let index = content_tokens.max(1).min(self.rows() - 1);
        &self.data[index * STYLE_DIM..(index + 1) * STYLE_DIM]
    }
}
