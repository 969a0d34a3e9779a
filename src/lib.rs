//! kokorod: a local Kokoro-82M text-to-speech HTTP server.
//!
//! The server loads the Kokoro-82M ONNX model once at startup and serves
//! synthesis over HTTP on `127.0.0.1:5001`:
//!
//! ```text
//! POST /tts {"text": "..."} → audio/wav (24 kHz, 16-bit PCM mono)
//! ```
//!
//! # Architecture
//!
//! - **tts**: phonemize → tokenize → ONNX inference → f32 samples
//! - **wav**: in-memory WAV encoding of the synthesized samples
//! - **server**: axum routes (`/`, `/tts`, `/health`, `/voices`)
//! - **startup**: asset download + eager engine load before binding

pub mod config;
pub mod error;
pub mod server;
pub mod startup;
pub mod tts;
pub mod wav;

pub use config::ServerConfig;
pub use error::{Result, SynthError};
pub use server::HttpServer;
pub use tts::{KokoroService, KokoroTts, SharedSynthesizer, Synthesizer};
