//! Envelope codec: ciphertext bytes to and from a text column.
//!
//! Standard base64 alphabet, padded, no line wrapping. Decoding is strict:
//! non-canonical padding and characters outside the alphabet are rejected.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;

/// Errors produced by the envelope codec.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The stored text is not valid standard base64.
    // The decoder message names offending symbols, so it stays out of Display.
    #[error("stored value is not a valid base64 envelope")]
    Malformed(#[from] base64::DecodeError),
}

/// Encode ciphertext bytes for storage.
pub fn encode(ciphertext: &[u8]) -> String {
    STANDARD.encode(ciphertext)
}

/// Decode stored text back into ciphertext bytes.
///
/// # Errors
///
/// Returns [`EnvelopeError::Malformed`] on an invalid symbol, bad length, or bad padding.
pub fn decode(text: &str) -> Result<Bytes, EnvelopeError> {
    Ok(Bytes::from(STANDARD.decode(text)?))
}
