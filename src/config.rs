//! Configuration types for the synthesis server.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 5001;

/// Top-level configuration for the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings.
    pub http: HttpConfig,
    /// Text-to-speech settings.
    pub tts: TtsConfig,
    /// Model asset management settings.
    pub models: ModelConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind host. Use "0.0.0.0" to accept connections from the LAN.
    pub host: String,
    /// Bind port. Port 0 auto-assigns (useful in tests).
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Default voice name (e.g. "am_echo", "bf_emma") or absolute path to a
    /// custom style `.bin`. Requests may override per call.
    pub voice: String,
    /// ONNX model variant: "fp32", "fp16", "q8", "q8f16", "q4", "q4f16".
    pub model_variant: String,
    /// Default speech speed multiplier (0.5–2.0).
    pub speed: f32,
    /// Output sample rate in Hz (Kokoro always outputs 24 kHz).
    pub sample_rate: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice: "am_echo".to_owned(),
            model_variant: "q8".to_owned(),
            speed: 1.0,
            sample_rate: 24_000,
        }
    }
}

/// Model asset management configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Override for the model cache directory (None = HuggingFace Hub default).
    pub cache_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::SynthError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SynthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/kokorod/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("kokorod")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, DEFAULT_PORT);
        assert_eq!(config.tts.voice, "am_echo");
        assert_eq!(config.tts.model_variant, "q8");
        assert!(config.tts.speed > 0.0);
        assert_eq!(config.tts.sample_rate, 24_000);
        assert!(config.models.cache_dir.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = ServerConfig {
            http: HttpConfig {
                host: "0.0.0.0".to_owned(),
                port: 6001,
            },
            tts: TtsConfig {
                voice: "bf_emma".to_owned(),
                model_variant: "fp16".to_owned(),
                speed: 1.25,
                sample_rate: 24_000,
            },
            models: ModelConfig {
                cache_dir: Some(dir.path().join("cache")),
            },
        };
        config.save_to_file(&path).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.http.host, "0.0.0.0");
        assert_eq!(loaded.http.port, 6001);
        assert_eq!(loaded.tts.voice, "bf_emma");
        assert_eq!(loaded.tts.model_variant, "fp16");
        assert!((loaded.tts.speed - 1.25).abs() < f32::EPSILON);
        assert_eq!(loaded.models.cache_dir, Some(dir.path().join("cache")));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ServerConfig = toml::from_str("[http]\nport = 7777\n").unwrap();
        assert_eq!(config.http.port, 7777);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.tts.voice, "am_echo");
    }

    #[test]
    fn from_file_missing_returns_error() {
        let result = ServerConfig::from_file(std::path::Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(ServerConfig::from_file(&path).is_err());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = ServerConfig::default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
        assert!(path.to_string_lossy().contains("kokorod"));
    }
}
