//! Reversible text codec for error payloads
//!
//! The full nmstatectl output is kept next to the short status message as a
//! raw DEFLATE stream encoded with the standard base64 alphabet.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Compress `text` at maximum effort and encode it as printable base64.
pub fn encode(text: &str) -> Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(text.as_bytes())
        .map_err(Error::CompressionError)?;
    let compressed = encoder.finish().map_err(Error::CompressionError)?;

    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`encode`].
///
/// Any malformed token (bad base64, truncated stream, invalid UTF-8) yields an
/// empty string.
pub fn decode(token: &str) -> String {
    let Ok(compressed) = STANDARD.decode(token.trim()) else {
        return String::new();
    };

    let mut decoded = Vec::new();
    if DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut decoded)
        .is_err()
    {
        return String::new();
    }

    String::from_utf8(decoded).unwrap_or_default()
}
