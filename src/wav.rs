//! In-memory WAV encoding.
//!
//! The `/tts` endpoint returns a complete WAV file in the response body, so
//! audio is encoded to an in-memory buffer rather than a file on disk.

use crate::error::{Result, SynthError};
use std::io::Cursor;

/// Encode f32 mono samples as a 16-bit PCM WAV file in memory.
///
/// Samples are clamped to [-1, 1] before quantization.
///
/// # Errors
///
/// Returns an error if `samples` is empty or the encoder fails.
pub fn encode_wav_pcm16(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(SynthError::Tts("no audio samples to encode".into()));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| SynthError::Tts(format!("failed to create wav writer: {e}")))?;
        for &s in samples {
            let clamped = s.clamp(-1.0, 1.0);
            let v = (clamped * f32::from(i16::MAX)).round() as i16;
            writer
                .write_sample(v)
                .map_err(|e| SynthError::Tts(format!("failed to write wav sample: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| SynthError::Tts(format!("failed to finalize wav: {e}")))?;
    }

    Ok(cursor.into_inner())
}
