//! Error types for the synthesis server.

/// Top-level error type for the synthesis server.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// The request itself is unusable (blank text, unknown voice,
    /// out-of-range speed, over-long segment).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Text-to-speech synthesis error.
    #[error("TTS error: {0}")]
    Tts(String),

    /// Model download or loading error.
    #[error("model error: {0}")]
    Model(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP server error.
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Whether the error is the caller's fault rather than the server's.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SynthError>;
