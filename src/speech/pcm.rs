//! PCM wire-format conversions for the speech round-trip.
//!
//! The provider speaks base64-encoded signed 16-bit little-endian PCM,
//! mono: 24000 Hz for synthesized playback, 16000 Hz for live-mode
//! microphone upload. Internally audio is f32 in [-1, 1].

use crate::error::{AdvisoryError, Result};
use base64::Engine as _;

/// Decode a base64 audio payload to raw bytes.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AdvisoryError::Speech(format!("audio payload is not base64: {e}")))
}

/// Encode raw bytes as base64 for upload.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Convert little-endian PCM16 bytes to f32 samples.
///
/// A trailing odd byte is ignored.
#[must_use]
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Convert f32 samples to little-endian PCM16 bytes.
///
/// Out-of-range samples saturate.
#[must_use]
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * 32768.0) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}
