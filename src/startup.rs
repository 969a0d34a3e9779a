//! Startup initialization: downloads model assets and eagerly loads the engine.
//!
//! Call [`initialize_engine`] before binding the listener so the first
//! request never waits on a multi-hundred-megabyte download.

use crate::config::ServerConfig;
use crate::error::{Result, SynthError};
use crate::tts::{KokoroService, KokoroTts, assets::AssetStore};
use std::time::Instant;
use tracing::info;

/// Download any missing assets and load the Kokoro engine.
///
/// Downloads (model, tokenizer, default voice) are cached by the HF Hub,
/// so later runs only pay the load cost.
///
/// # Errors
///
/// Returns an error if a download fails or the model cannot be loaded.
pub async fn initialize_engine(config: &ServerConfig) -> Result<KokoroService> {
    let start = Instant::now();
    info!(
        "initializing Kokoro engine (variant={}, voice={})",
        config.tts.model_variant, config.tts.voice
    );

    let tts_config = config.tts.clone();
    let cache_dir = config.models.cache_dir.clone();

    // Downloads and model load are blocking; keep them off the executor.
    let engine = tokio::task::spawn_blocking(move || -> Result<KokoroTts> {
        let assets = AssetStore::open(cache_dir.as_deref())?;
        KokoroTts::load(&tts_config, assets)
    })
    .await
    .map_err(|e| SynthError::Server(format!("engine init task failed: {e}")))??;

    info!("engine ready in {:.1}s", start.elapsed().as_secs_f32());
    Ok(KokoroService::new(engine))
}
