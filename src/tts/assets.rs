//! Model asset management.
//!
//! All model files live in one HuggingFace repo and are cached on disk by
//! `hf-hub`; the first `serve` run downloads them, later runs hit the cache.

use crate::error::{Result, SynthError};
use std::path::PathBuf;
use tracing::{info, warn};

/// HuggingFace repo for Kokoro-82M ONNX models.
pub const KOKORO_REPO_ID: &str = "onnx-community/Kokoro-82M-v1.0-ONNX";

/// Map a user-facing variant name to the ONNX filename inside the repo.
pub fn model_filename(variant: &str) -> &'static str {
    match variant {
        "fp32" => "onnx/model.onnx",
        "fp16" => "onnx/model_fp16.onnx",
        "q8" | "quantized" => "onnx/model_quantized.onnx",
        "q8f16" => "onnx/model_q8f16.onnx",
        "q4" => "onnx/model_q4.onnx",
        "q4f16" => "onnx/model_q4f16.onnx",
        _ => {
            warn!("unknown model variant '{variant}', falling back to q8");
            "onnx/model_quantized.onnx"
        }
    }
}

/// Handle to the model repo, used at startup and for lazy voice fetches.
pub struct AssetStore {
    repo: hf_hub::api::sync::ApiRepo,
}

impl AssetStore {
    /// Open the asset store, optionally overriding the cache directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HF Hub API cannot be initialized.
    pub fn open(cache_dir: Option<&std::path::Path>) -> Result<Self> {
        let mut builder = hf_hub::api::sync::ApiBuilder::new();
        if let Some(dir) = cache_dir {
            builder = builder.with_cache_dir(dir.to_path_buf());
        }
        let api = builder
            .build()
            .map_err(|e| SynthError::Model(format!("HF Hub API init failed: {e}")))?;
        Ok(Self {
            repo: api.model(KOKORO_REPO_ID.to_owned()),
        })
    }

    /// Ensure the ONNX model for `variant` is on disk; returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub fn model(&self, variant: &str) -> Result<PathBuf> {
        let filename = model_filename(variant);
        info!("ensuring model: {KOKORO_REPO_ID}/{filename}");
        self.repo
            .get(filename)
            .map_err(|e| SynthError::Model(format!("failed to download {filename}: {e}")))
    }

    /// Ensure `tokenizer.json` is on disk; returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub fn tokenizer(&self) -> Result<PathBuf> {
        info!("ensuring tokenizer.json");
        self.repo
            .get("tokenizer.json")
            .map_err(|e| SynthError::Model(format!("failed to download tokenizer.json: {e}")))
    }

    /// Ensure the style file for a catalog voice is on disk; returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub fn voice(&self, name: &str) -> Result<PathBuf> {
        let filename = format!("voices/{name}.bin");
        info!("ensuring voice: {filename}");
        self.repo
            .get(&filename)
            .map_err(|e| SynthError::Model(format!("failed to download {filename}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_variants_map_to_repo_files() {
        assert_eq!(model_filename("fp32"), "onnx/model.onnx");
        assert_eq!(model_filename("fp16"), "onnx/model_fp16.onnx");
        assert_eq!(model_filename("q8"), "onnx/model_quantized.onnx");
        assert_eq!(model_filename("quantized"), "onnx/model_quantized.onnx");
        assert_eq!(model_filename("q4f16"), "onnx/model_q4f16.onnx");
    }

    #[test]
    fn unknown_variant_falls_back_to_q8() {
        assert_eq!(model_filename("bf16"), "onnx/model_quantized.onnx");
    }
}
